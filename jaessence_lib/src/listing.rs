//! Product discovery on category listing pages.
//!
//! The listing markup has no stable class names for product cards, so a
//! candidate is any anchor whose visible text is long enough and mentions a
//! catalog intent word. Only the initial render is read: the "N itens"
//! counter is logged but never drives further requests.

use std::collections::HashSet;
use std::sync::LazyLock;

use jaessence_api::types::{CatalogRecord, Category};
use jaessence_api::Client;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::CatalogError;
use crate::text::{char_len, element_text, page_text};

/// Anchor text must be longer than this to be a product name.
const MIN_NAME_CHARS: usize = 10;

/// Lowercase words that mark an anchor as a product link.
const INTENT_WORDS: &[&str] = &["inspirado", "perfume", "inspired"];

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

static IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid image selector"));

static ITEM_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(?:itens|item|items)\b").expect("valid item count regex")
});

/// Seeds discovered on one listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    /// Seed records in page order, unique by link.
    pub records: Vec<CatalogRecord>,
    /// Item count the page advertises, for diagnostics only.
    pub advertised_count: Option<u32>,
}

/// Fetches a listing page and extracts its seed records.
///
/// Fails only when the page itself cannot be fetched; a page without
/// products yields an empty listing.
pub async fn collect_listing(
    client: &Client,
    category: Category,
    listing_url: &str,
) -> Result<ListingPage, CatalogError> {
    let page = client.fetch(listing_url).await?;
    let page_url = Url::parse(&page.url)
        .map_err(|e| CatalogError::InvalidInput(format!("listing url {}: {}", page.url, e)))?;
    let listing = parse_listing(&page.html, &page_url, category);

    match listing.advertised_count {
        Some(count) => tracing::info!("Listing for {} advertises {} items", category, count),
        None => tracing::debug!("Listing for {} has no item counter", category),
    }
    tracing::info!(
        "Found {} products for {}",
        listing.records.len(),
        category
    );
    Ok(listing)
}

/// Extracts seed records from listing HTML. Pure; links are resolved
/// against `page_url` and deduplicated within this page.
pub fn parse_listing(html: &str, page_url: &Url, category: Category) -> ListingPage {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let name = element_text(anchor);
        if !is_product_name(&name) {
            continue;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(link) = normalize_link(href, page_url) else {
            continue;
        };
        if !seen.insert(link.clone()) {
            continue;
        }

        let image_url = nearby_image(anchor, page_url);
        records.push(CatalogRecord::seed(name, category, link).with_image(image_url));
    }

    let advertised_count = ITEM_COUNT
        .captures(&page_text(&document))
        .and_then(|cap| cap[1].parse().ok());

    ListingPage {
        records,
        advertised_count,
    }
}

fn is_product_name(text: &str) -> bool {
    if char_len(text) <= MIN_NAME_CHARS {
        return false;
    }
    let lower = text.to_lowercase();
    INTENT_WORDS.iter().any(|word| lower.contains(word))
}

/// Absolute http(s) URL without fragment, or `None` for in-page and
/// non-navigational hrefs.
pub fn normalize_link(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
    {
        return None;
    }
    let mut url = page_url.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

/// First image in the anchor's parent element.
fn nearby_image(anchor: ElementRef<'_>, page_url: &Url) -> Option<String> {
    let parent = anchor.parent().and_then(ElementRef::wrap)?;
    let img = parent.select(&IMAGE).next()?;
    image_source(img, page_url)
}

/// `src`, or `data-src` when `src` is missing or an inline placeholder.
pub(crate) fn image_source(img: ElementRef<'_>, page_url: &Url) -> Option<String> {
    let attrs = img.value();
    let src = attrs
        .attr("src")
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with("data:"))
        .or_else(|| attrs.attr("data-src").map(str::trim).filter(|s| !s.is_empty()))?;
    page_url.join(src).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_url() -> Url {
        Url::parse("https://www.jaessencedelavie.com.br/masculinos/").unwrap()
    }

    #[test]
    fn test_keyword_gate_and_length() {
        let html = r#"
            <nav><a href="/login/">Entrar</a><a href="/femininos/">Perfumes Femininos</a></nav>
            <a href="/carrinho/">Meu carrinho de compras</a>
            <a href="/perfume/">Perfume</a>
            <div class="card"><a href="/perfume-inspirado-em-sauvage/">Perfume Inspirado em Sauvage</a></div>
        "#;
        let listing = parse_listing(html, &listing_url(), Category::Masculine);
        let names: Vec<&str> = listing.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Perfumes Femininos", "Perfume Inspirado em Sauvage"]);
    }

    #[test]
    fn test_relative_and_absolute_duplicates_collapse() {
        let html = r#"
            <a href="/perfume-inspirado-em-aventus/">Perfume Inspirado em Aventus</a>
            <a href="https://www.jaessencedelavie.com.br/perfume-inspirado-em-aventus/">Perfume Inspirado em Aventus 100ml</a>
            <a href="/perfume-inspirado-em-aventus/#avaliacoes">Perfume Inspirado em Aventus avaliações</a>
        "#;
        let listing = parse_listing(html, &listing_url(), Category::Masculine);
        assert_eq!(listing.records.len(), 1);
        let record = &listing.records[0];
        assert_eq!(
            record.link,
            "https://www.jaessencedelavie.com.br/perfume-inspirado-em-aventus/"
        );
        assert_eq!(record.name, "Perfume Inspirado em Aventus");
        assert_eq!(record.category, Category::Masculine);
        assert!(record.is_seed_only());
    }

    #[test]
    fn test_image_from_parent() {
        let html = r#"
            <div class="produto">
              <img data-src="/arquivos/produtos/libre.jpg" src="data:image/gif;base64,R0lGOD">
              <a href="/libre/">Perfume Inspirado em Libre</a>
            </div>
            <div class="produto">
              <a href="/idole/">Perfume Inspirado em Idôle</a>
            </div>
        "#;
        let listing = parse_listing(html, &listing_url(), Category::Feminine);
        assert_eq!(listing.records.len(), 2);
        assert_eq!(
            listing.records[0].image_url.as_deref(),
            Some("https://www.jaessencedelavie.com.br/arquivos/produtos/libre.jpg")
        );
        assert_eq!(listing.records[1].image_url, None);
    }

    #[test]
    fn test_non_navigational_hrefs_ignored() {
        let html = r##"
            <a href="javascript:void(0)">Perfume Inspirado em Nada</a>
            <a href="#topo">Perfume Inspirado em Topo</a>
            <a href="mailto:contato@example.com">Perfume Inspirado por email</a>
        "##;
        let listing = parse_listing(html, &listing_url(), Category::Shareable);
        assert!(listing.records.is_empty());
    }

    #[test]
    fn test_advertised_count() {
        let html = r#"<span>24 itens</span><a href="/a/">Perfume Inspirado em A</a>"#;
        let listing = parse_listing(html, &listing_url(), Category::Shareable);
        assert_eq!(listing.advertised_count, Some(24));
        assert_eq!(listing.records.len(), 1);
    }

    #[test]
    fn test_empty_page() {
        let listing = parse_listing("<html></html>", &listing_url(), Category::Shareable);
        assert!(listing.records.is_empty());
        assert_eq!(listing.advertised_count, None);
    }

    #[test]
    fn test_normalize_link() {
        let base = listing_url();
        assert_eq!(
            normalize_link("../perfume-x/#reviews", &base).as_deref(),
            Some("https://www.jaessencedelavie.com.br/perfume-x/")
        );
        assert_eq!(normalize_link("  ", &base), None);
        assert_eq!(normalize_link("tel:+5511999999999", &base), None);
    }
}
