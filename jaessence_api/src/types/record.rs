//! Catalog record types consumed by the recommendation engine.

use serde::{Deserialize, Serialize};

use super::Category;

/// One product of the catalog.
///
/// Created as a seed at discovery time (`name`, `category`, `link`, maybe
/// `image_url`) and enriched at most once from the product's detail page.
/// Every optional field may be absent; consumers must tolerate that.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CatalogRecord {
    /// Display name as scraped from the listing anchor.
    pub name: String,

    pub category: Category,

    /// Absolute product URL. Unique key of the record.
    pub link: String,

    /// Current selling price, e.g. `R$134,90`.
    pub price: Option<String>,

    /// Price before the promotion, when one is advertised.
    pub price_original: Option<String>,

    /// Price when paying with PIX.
    pub price_pix: Option<String>,

    /// Installment plan as rendered, e.g. `6x de R$29,98`.
    pub installment: Option<String>,

    /// Advertised discount, e.g. `-19%`.
    pub discount: Option<String>,

    /// Bottle size, e.g. `100ml`.
    pub volume: Option<String>,

    /// Reference fragrance the product is inspired by.
    pub inspiration: Option<String>,

    pub notes_top: Option<String>,

    pub notes_heart: Option<String>,

    pub notes_base: Option<String>,

    /// Marketing description, at most 400 characters.
    pub description: Option<String>,

    pub image_url: Option<String>,

    /// Up to three customer reviews in page order.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl CatalogRecord {
    /// Builds a seed record carrying only discovery-time fields.
    pub fn seed(name: impl Into<String>, category: Category, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category,
            link: link.into(),
            price: None,
            price_original: None,
            price_pix: None,
            installment: None,
            discount: None,
            volume: None,
            inspiration: None,
            notes_top: None,
            notes_heart: None,
            notes_base: None,
            description: None,
            image_url: None,
            reviews: Vec::new(),
        }
    }

    /// Sets the listing thumbnail.
    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    /// True when no detail-page field has been populated.
    pub fn is_seed_only(&self) -> bool {
        self.price.is_none()
            && self.price_original.is_none()
            && self.price_pix.is_none()
            && self.installment.is_none()
            && self.discount.is_none()
            && self.volume.is_none()
            && self.inspiration.is_none()
            && self.notes_top.is_none()
            && self.notes_heart.is_none()
            && self.notes_base.is_none()
            && self.description.is_none()
            && self.reviews.is_empty()
    }

    /// Price to show first: the PIX price when known, else the regular one.
    pub fn display_price(&self) -> Option<&str> {
        self.price_pix.as_deref().or(self.price.as_deref())
    }
}

/// A verified customer review from a product page.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Review {
    /// Date as printed on the page (`DD/MM/YYYY`).
    pub date: String,

    pub author: String,

    /// Comment text, at most 300 characters.
    pub body: String,

    pub verified: bool,
}
