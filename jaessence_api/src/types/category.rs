//! Storefront categories a product can be discovered under.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Listing a product was discovered from. Fixed at discovery time.
///
/// Serializes as the lowercase English name; deserializes from that name or
/// the storefront slug.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String")]
pub enum Category {
    /// Unisex line ("Compartilháveis").
    #[serde(rename = "shareable")]
    Shareable,

    /// Men's line ("Masculinos").
    #[serde(rename = "masculine")]
    Masculine,

    /// Women's line ("Femininos").
    #[serde(rename = "feminine")]
    Feminine,
}

impl Category {
    /// Crawl order used when no explicit order is configured.
    pub const ALL: [Category; 3] = [Category::Shareable, Category::Masculine, Category::Feminine];

    /// Path segment of the category listing on the storefront.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Shareable => "compartilhaveis",
            Category::Masculine => "masculinos",
            Category::Feminine => "femininos",
        }
    }

    /// Human label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Shareable => "Shareable",
            Category::Masculine => "Masculine",
            Category::Feminine => "Feminine",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Shareable => "shareable",
                Category::Masculine => "masculine",
                Category::Feminine => "feminine",
            }
        )
    }
}

/// Error returned when a string names no known category.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts the English name or the storefront slug, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.to_string() == needle || c.slug() == needle)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
