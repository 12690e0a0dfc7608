//! Heuristic field extraction from the plain text of a product page.
//!
//! Each field has its own short list of patterns and the first one that
//! matches wins. Fields never depend on one another. A miss is a `None`,
//! never an error. Storefront copy is Portuguese; every marker also accepts
//! its English wording.

use std::sync::LazyLock;

use jaessence_api::types::CatalogRecord;
use regex::Regex;

use crate::text::{char_len, collapse_whitespace, truncate_chars};

/// Longest description kept, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 400;

/// Longest notes span kept per pyramid tier, in characters.
pub const NOTES_MAX_CHARS: usize = 300;

/// Longest inspiration kept, in characters.
pub const INSPIRATION_MAX_CHARS: usize = 150;

/// Marker of the "see all" link that leaks into sections on listing widgets.
const BOILERPLATE_MARKERS: &[&str] = &["Ver tudo", "See all"];

/// Currency amount: starts and ends with a digit so trailing sentence
/// punctuation is never captured.
const AMOUNT: &str = r"(\d(?:[\d.,]*\d)?)";

const TOP_LABEL: &str = r"(?:notas?\s+de\s+topo|notas?\s+de\s+sa[íi]da|top\s+notes?)";
const HEART_LABEL: &str =
    r"(?:notas?\s+de\s+cora[çc][ãa]o|notas?\s+de\s+corpo|heart\s+notes?|middle\s+notes?)";
const BASE_LABEL: &str = r"(?:notas?\s+de\s+fundo|base\s+notes?)";
const EXPERIENCE_LABEL: &str = r"(?:a\s+experiência|the\s+experience)";

/// Decorative glyph the storefront uses between page sections.
const SECTION_MARK: &str = "✦";

static PROMO_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?i:de|from)\s*R\$\s*{AMOUNT}\s*(?i:por|to)\s*R\$\s*{AMOUNT}"
    ))
    .expect("valid promo price regex")
});

static BARE_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"R\$\s*{AMOUNT}")).expect("valid price regex")
});

static PIX_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"R\$\s*{AMOUNT}\s*(?i:com|with)\s*(?i:pix)\b"))
        .expect("valid pix regex")
});

static INSTALLMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(\d+)\s*x\s*((?i:de|of))\s*R\$\s*{AMOUNT}"
    ))
    .expect("valid installment regex")
});

static DISCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-–]\s*(\d{1,3})\s*%").expect("valid discount regex"));

static VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*ml\b").expect("valid volume regex"));

static INSPIRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:[Ii]nspirado\s+em|[Ii]nspired\s+by)\s+([^-–\n]+?)(?:\s*[-–]|\s*(?:Compartilhável|Compartilhavel|Masculino|Feminino|Shareable|Masculine|Feminine)|\s*(?i:promoção|promocao|promotion)|$)",
    )
    .expect("valid inspiration regex")
});

/// Trailing fragments stripped from the inspiration capture.
static INSPIRATION_TAILS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)\s*(?:promoção|promocao|promotion).*$").expect("valid promo tail regex"),
        Regex::new(r"(?i)\s*(?:até|ate|up\s+to)\s*\d+\s*x.*$")
            .expect("valid installment tail regex"),
        Regex::new(r"\s*R\$.*$").expect("valid price tail regex"),
    ]
});

static NOTES_TOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is){TOP_LABEL}\s*:?\s*(.*?)\s*(?:{HEART_LABEL}|{BASE_LABEL}|{SECTION_MARK}|$)"
    ))
    .expect("valid top notes regex")
});

static NOTES_HEART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is){HEART_LABEL}\s*:?\s*(.*?)\s*(?:{BASE_LABEL}|{SECTION_MARK}|$)"
    ))
    .expect("valid heart notes regex")
});

static NOTES_BASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is){BASE_LABEL}\s*:?\s*(.*?)\s*(?:{SECTION_MARK}|$)"
    ))
    .expect("valid base notes regex")
});

static EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is){EXPERIENCE_LABEL}\s*:?\s*(.+?)\s*(?:{SECTION_MARK}|dicas\s+de\s+uso|tips\s+for\s+use|disclaimer|$)"
    ))
    .expect("valid experience regex")
});

static EXPERIENCE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i){EXPERIENCE_LABEL}\s*:?")).expect("valid experience header regex")
});

static DESCRIPTIVE_SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:O|A|Os|As|Um|Uma|Este|Esta|Ele|Ela|É|The|This|It|An?)\s[^.!?✦]*?(?i:fragrância|frescor|elegância|intensidade|sofisticação|fragrance|freshness|elegance|intensity|sophistication)[^.!?✦]*[.!?]?",
    )
    .expect("valid descriptive sentence regex")
});

/// The five price-related fields. Each is extracted independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceInfo {
    pub price: Option<String>,
    pub price_original: Option<String>,
    pub price_pix: Option<String>,
    pub installment: Option<String>,
    pub discount: Option<String>,
}

/// Everything the detail page contributes to a record except reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub prices: PriceInfo,
    pub volume: Option<String>,
    pub inspiration: Option<String>,
    pub notes_top: Option<String>,
    pub notes_heart: Option<String>,
    pub notes_base: Option<String>,
    pub description: Option<String>,
}

impl ProductFields {
    /// Copies the extracted fields onto a record. Discovery-time fields
    /// (`name`, `category`, `link`, `image_url`) are left alone.
    pub fn apply_to(self, record: &mut CatalogRecord) {
        record.price = self.prices.price;
        record.price_original = self.prices.price_original;
        record.price_pix = self.prices.price_pix;
        record.installment = self.prices.installment;
        record.discount = self.prices.discount;
        record.volume = self.volume;
        record.inspiration = self.inspiration;
        record.notes_top = self.notes_top;
        record.notes_heart = self.notes_heart;
        record.notes_base = self.notes_base;
        record.description = self.description;
    }
}

/// Extracts every field from the whitespace-joined text of a product page.
pub fn extract_fields(text: &str) -> ProductFields {
    ProductFields {
        prices: extract_prices(text),
        volume: extract_volume(text),
        inspiration: extract_inspiration(text),
        notes_top: extract_notes(&NOTES_TOP, text),
        notes_heart: extract_notes(&NOTES_HEART, text),
        notes_base: extract_notes(&NOTES_BASE, text),
        description: extract_description(text),
    }
}

pub fn extract_prices(text: &str) -> PriceInfo {
    let mut info = PriceInfo::default();

    if let Some(cap) = PROMO_PRICE.captures(text) {
        info.price_original = Some(format!("R${}", &cap[1]));
        info.price = Some(format!("R${}", &cap[2]));
    }

    if info.price.is_none() {
        info.price = BARE_PRICE
            .captures(text)
            .map(|cap| format!("R${}", &cap[1]));
    }

    info.price_pix = PIX_PRICE
        .captures(text)
        .map(|cap| format!("R${}", &cap[1]));

    info.installment = INSTALLMENT
        .captures(text)
        .map(|cap| format!("{}x {} R${}", &cap[1], cap[2].to_lowercase(), &cap[3]));

    info.discount = DISCOUNT
        .captures(text)
        .map(|cap| format!("-{}%", &cap[1]));

    info
}

pub fn extract_volume(text: &str) -> Option<String> {
    VOLUME.captures(text).map(|cap| format!("{}ml", &cap[1]))
}

pub fn extract_inspiration(text: &str) -> Option<String> {
    let cap = INSPIRATION.captures(text)?;
    let mut inspiration = cap[1].trim().to_string();
    for tail in INSPIRATION_TAILS.iter() {
        inspiration = tail.replace(&inspiration, "").into_owned();
    }
    let inspiration = truncate_chars(inspiration.trim(), INSPIRATION_MAX_CHARS);
    (!inspiration.is_empty()).then_some(inspiration)
}

fn extract_notes(pattern: &Regex, text: &str) -> Option<String> {
    let cap = pattern.captures(text)?;
    let notes = collapse_whitespace(&cap[1]);
    let notes = truncate_chars(&notes, NOTES_MAX_CHARS);
    (!notes.is_empty()).then_some(notes)
}

/// Description, preferring the "Experience" section over a keyword sentence.
pub fn extract_description(text: &str) -> Option<String> {
    experience_section(text).or_else(|| descriptive_sentence(text))
}

fn experience_section(text: &str) -> Option<String> {
    let cap = EXPERIENCE.captures(text)?;
    let desc = collapse_whitespace(&cap[1]);
    let len = char_len(&desc);
    if len > 20 && len < 500 && !is_boilerplate(&desc) {
        Some(truncate_chars(&desc, DESCRIPTION_MAX_CHARS))
    } else {
        None
    }
}

fn descriptive_sentence(text: &str) -> Option<String> {
    // The section header would otherwise open a sentence with its article.
    let text = EXPERIENCE_HEADER.replace_all(text, " ");
    let found = DESCRIPTIVE_SENTENCE.find(&text)?;
    let desc = collapse_whitespace(found.as_str());
    if char_len(&desc) > 30 && !is_boilerplate(&desc) {
        Some(truncate_chars(&desc, DESCRIPTION_MAX_CHARS))
    } else {
        None
    }
}

fn is_boilerplate(s: &str) -> bool {
    BOILERPLATE_MARKERS.iter().any(|marker| s.contains(marker))
}
