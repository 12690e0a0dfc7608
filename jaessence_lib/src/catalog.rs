//! Sequential catalog crawl: listing discovery, detail enrichment, run summary.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use jaessence_api::types::{CatalogRecord, Category, Page};
use jaessence_api::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use tokio::time::sleep;
use url::Url;

use crate::config::{CategorySource, ScrapeConfig};
use crate::error::CatalogError;
use crate::fields::extract_fields;
use crate::listing::{collect_listing, image_source};
use crate::reviews::extract_reviews;
use crate::text::page_text;

/// Shared stop flag. Set it from another task to end the crawl at the next
/// category or product boundary.
pub type Interrupt = Arc<AtomicBool>;

static PRODUCT_IMAGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img[src*='produtos']").expect("valid product image selector")
});

/// Fixed pauses between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After every product detail fetch, successful or not.
    pub product_delay: Duration,
    /// Between two categories.
    pub category_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            product_delay: Duration::from_millis(500),
            category_delay: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    /// No pauses at all. Meant for tests against a local mock server.
    pub fn none() -> Self {
        Self {
            product_delay: Duration::ZERO,
            category_delay: Duration::ZERO,
        }
    }
}

/// Why a record kept only its listing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedReason {
    /// The link was already crawled under an earlier category.
    AlreadyVisited,
    /// The detail page could not be fetched within the retry budget.
    FetchFailed(String),
    /// Detail fetching is turned off for this run.
    DetailsDisabled,
}

/// What happened to one discovered product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductOutcome {
    /// The detail page was fetched and extracted, whatever it contained.
    Enriched,
    SeedOnly(SeedReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Complete,
    /// Stopped early by the interrupt flag.
    Interrupted,
    /// Stopped by an unrecoverable error; the message is for display.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Totals for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    /// Every category in enumeration order, zero counts included.
    pub per_category: Vec<CategoryCount>,
    pub enriched: usize,
    pub seed_only: usize,
    pub with_reviews: usize,
    /// Categories whose listing page could not be fetched.
    pub skipped_categories: Vec<Category>,
}

impl CatalogSummary {
    fn new(
        catalog: &[CatalogRecord],
        outcomes: &[ProductOutcome],
        skipped_categories: Vec<Category>,
    ) -> Self {
        let per_category = Category::ALL
            .iter()
            .map(|&category| CategoryCount {
                category,
                count: catalog.iter().filter(|r| r.category == category).count(),
            })
            .collect();
        let enriched = outcomes
            .iter()
            .filter(|o| matches!(o, ProductOutcome::Enriched))
            .count();
        Self {
            total: catalog.len(),
            per_category,
            enriched,
            seed_only: outcomes.len() - enriched,
            with_reviews: catalog.iter().filter(|r| !r.reviews.is_empty()).count(),
            skipped_categories,
        }
    }

    pub fn count_for(&self, category: Category) -> usize {
        self.per_category
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.count)
    }
}

/// Result of [`CatalogBuilder::build`]. Returned for every status, so an
/// interrupted or failed run still hands back what it collected.
#[derive(Debug, Clone)]
pub struct CatalogRun {
    /// Records in discovery order.
    pub catalog: Vec<CatalogRecord>,
    /// One outcome per record, same order as `catalog`.
    pub outcomes: Vec<ProductOutcome>,
    pub summary: CatalogSummary,
    pub status: RunStatus,
}

/// Drives the crawl over a list of categories.
///
/// Strictly sequential: one listing, then one detail page at a time, with
/// the configured pauses in between. The builder owns the session client,
/// the run-wide visited-link set and the growing catalog.
pub struct CatalogBuilder {
    client: Client,
    pacing: Pacing,
    fetch_details: bool,
    interrupt: Interrupt,
    visited: HashSet<String>,
    catalog: Vec<CatalogRecord>,
    outcomes: Vec<ProductOutcome>,
    skipped: Vec<Category>,
}

impl CatalogBuilder {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            pacing: Pacing::default(),
            fetch_details: true,
            interrupt: Arc::new(AtomicBool::new(false)),
            visited: HashSet::new(),
            catalog: Vec::new(),
            outcomes: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Builds the client and crawl settings from a scrape config.
    pub fn from_config(config: &ScrapeConfig) -> Result<Self, CatalogError> {
        let client =
            Client::with_base_url(&config.base_url)?.with_retry_policy(config.retry_policy());
        Ok(Self::new(client)
            .with_pacing(config.pacing())
            .with_fetch_details(config.fetch_details))
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_fetch_details(mut self, fetch_details: bool) -> Self {
        self.fetch_details = fetch_details;
        self
    }

    /// Replaces the stop flag with one owned by the caller.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Handle to the stop flag, for wiring up a signal listener.
    pub fn interrupt_handle(&self) -> Interrupt {
        Arc::clone(&self.interrupt)
    }

    /// Runs the crawl over `sources` in order and consumes the builder.
    pub async fn build(mut self, sources: &[CategorySource]) -> CatalogRun {
        self.client.warm_up().await;

        let status = match self.crawl(sources).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Catalog run failed: {}", e);
                RunStatus::Failed(e.to_string())
            }
        };

        let summary = CatalogSummary::new(&self.catalog, &self.outcomes, self.skipped);
        tracing::info!(
            "Catalog run finished ({:?}): {} products, {} enriched, {} seed-only",
            status,
            summary.total,
            summary.enriched,
            summary.seed_only
        );
        CatalogRun {
            catalog: self.catalog,
            outcomes: self.outcomes,
            summary,
            status,
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    async fn crawl(&mut self, sources: &[CategorySource]) -> Result<RunStatus, CatalogError> {
        for (i, source) in sources.iter().enumerate() {
            if self.interrupted() {
                tracing::warn!("Interrupted before {}", source.category);
                return Ok(RunStatus::Interrupted);
            }

            let listing_url = self.client.resolve(&source.url)?;
            tracing::info!("Collecting {} from {}", source.category, listing_url);

            let listing =
                collect_listing(&self.client, source.category, listing_url.as_str()).await;
            match listing {
                Ok(listing) => {
                    for seed in listing.records {
                        if self.interrupted() {
                            tracing::warn!("Interrupted during {}", source.category);
                            return Ok(RunStatus::Interrupted);
                        }
                        self.add_product(seed).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping category {}: {}", source.category, e);
                    self.skipped.push(source.category);
                }
            }

            let count = self
                .catalog
                .iter()
                .filter(|r| r.category == source.category)
                .count();
            tracing::info!("{}: {} products collected", source.category.label(), count);

            if i + 1 < sources.len() && !self.pacing.category_delay.is_zero() {
                sleep(self.pacing.category_delay).await;
            }
        }
        Ok(RunStatus::Complete)
    }

    async fn add_product(&mut self, seed: CatalogRecord) {
        let (record, outcome) = if !self.visited.insert(seed.link.clone()) {
            tracing::debug!("Already visited {}, keeping seed", seed.link);
            (seed, ProductOutcome::SeedOnly(SeedReason::AlreadyVisited))
        } else if !self.fetch_details {
            (seed, ProductOutcome::SeedOnly(SeedReason::DetailsDisabled))
        } else {
            tracing::debug!("Fetching details for {}", seed.name);
            let result = self.client.fetch(&seed.link).await;
            let fetched = match result {
                Ok(page) => (enrich_from_page(seed, &page), ProductOutcome::Enriched),
                Err(e) => {
                    tracing::warn!("Keeping seed for {}: {}", seed.link, e);
                    let reason = SeedReason::FetchFailed(e.to_string());
                    (seed, ProductOutcome::SeedOnly(reason))
                }
            };
            if !self.pacing.product_delay.is_zero() {
                sleep(self.pacing.product_delay).await;
            }
            fetched
        };
        self.catalog.push(record);
        self.outcomes.push(outcome);
    }
}

/// Merges detail-page data into a seed.
///
/// Name, category and link never change. The image is only filled when the
/// listing had none.
pub fn enrich_from_page(mut record: CatalogRecord, page: &Page) -> CatalogRecord {
    let document = Html::parse_document(&page.html);
    let text = page_text(&document);

    if record.image_url.is_none() {
        record.image_url = Url::parse(&page.url).ok().and_then(|base| {
            document
                .select(&PRODUCT_IMAGE)
                .find_map(|img| image_source(img, &base))
        });
    }

    extract_fields(&text).apply_to(&mut record);
    record.reviews = extract_reviews(&text);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> Page {
        Page {
            url: "https://www.jaessencedelavie.com.br/perfume-x/".to_string(),
            status: 200,
            html: html.to_string(),
        }
    }

    #[test]
    fn test_enrich_keeps_identity_fields() {
        let seed = CatalogRecord::seed(
            "Perfume Inspirado em Sauvage",
            Category::Masculine,
            "https://www.jaessencedelavie.com.br/perfume-x/",
        );
        let html = "<h1>Outro Nome Completo</h1><p>Inspirado em Sauvage Dior - 100ml</p>\
                    <p>R$134,90</p>";
        let record = enrich_from_page(seed, &page(html));
        assert_eq!(record.name, "Perfume Inspirado em Sauvage");
        assert_eq!(record.category, Category::Masculine);
        assert_eq!(record.price.as_deref(), Some("R$134,90"));
        assert_eq!(record.volume.as_deref(), Some("100ml"));
        assert_eq!(record.inspiration.as_deref(), Some("Sauvage Dior"));
    }

    #[test]
    fn test_detail_image_fallback_only_when_missing() {
        let html = r#"<img src="/logo.png"><img src="/arquivos/produtos/x.jpg"><p>R$99,90</p>"#;
        let seed = CatalogRecord::seed("Perfume X inspirado", Category::Feminine, "https://a/");
        let filled = enrich_from_page(seed.clone(), &page(html));
        assert_eq!(
            filled.image_url.as_deref(),
            Some("https://www.jaessencedelavie.com.br/arquivos/produtos/x.jpg")
        );

        let kept = enrich_from_page(
            seed.with_image(Some("https://cdn/listing.jpg".into())),
            &page(html),
        );
        assert_eq!(kept.image_url.as_deref(), Some("https://cdn/listing.jpg"));
    }

    #[test]
    fn test_summary_counts() {
        let mut with_reviews = CatalogRecord::seed("a", Category::Feminine, "https://a/");
        with_reviews.reviews.push(jaessence_api::types::Review {
            date: "01/01/2024".into(),
            author: "Ana".into(),
            body: "Muito bom".into(),
            verified: true,
        });
        let catalog = vec![
            with_reviews,
            CatalogRecord::seed("b", Category::Feminine, "https://b/"),
            CatalogRecord::seed("c", Category::Shareable, "https://c/"),
        ];
        let outcomes = vec![
            ProductOutcome::Enriched,
            ProductOutcome::SeedOnly(SeedReason::FetchFailed("boom".into())),
            ProductOutcome::SeedOnly(SeedReason::AlreadyVisited),
        ];
        let summary = CatalogSummary::new(&catalog, &outcomes, vec![Category::Masculine]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.enriched, 1);
        assert_eq!(summary.seed_only, 2);
        assert_eq!(summary.with_reviews, 1);
        assert_eq!(summary.count_for(Category::Feminine), 2);
        assert_eq!(summary.count_for(Category::Masculine), 0);
        let order: Vec<Category> = summary.per_category.iter().map(|c| c.category).collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert_eq!(summary.skipped_categories, vec![Category::Masculine]);
    }

    #[test]
    fn test_default_pacing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.product_delay, Duration::from_millis(500));
        assert_eq!(pacing.category_delay, Duration::from_secs(1));
        assert!(Pacing::none().product_delay.is_zero());
    }
}
