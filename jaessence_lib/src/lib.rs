//! Library layer for the JA Essence catalog scraper: listing discovery,
//! heuristic field and review extraction, and the sequential catalog builder.
//!
//! Wraps the `jaessence_api` session client. Extraction functions are pure
//! over page text so they can be tested with literal fixtures.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fields;
pub mod listing;
pub mod reviews;
pub mod text;

pub use jaessence_api;
pub use jaessence_api::types;
pub use jaessence_api::types::{CatalogRecord, Category, Review};

pub use catalog::{
    CatalogBuilder, CatalogRun, CatalogSummary, CategoryCount, Interrupt, Pacing, ProductOutcome,
    RunStatus, SeedReason,
};
pub use config::{CategorySource, ConfigError, ScrapeConfig};
pub use error::CatalogError;
pub use fields::{extract_fields, PriceInfo, ProductFields};
pub use listing::{collect_listing, parse_listing, ListingPage};
pub use reviews::extract_reviews;
