//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping storefront client errors
/// and adding input failures.
#[derive(Debug)]
pub enum CatalogError {
    /// An error from the underlying storefront client.
    Api(jaessence_api::Error),
    /// A caller-provided value (URL, category) is unusable.
    InvalidInput(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "Storefront error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jaessence_api::Error> for CatalogError {
    fn from(e: jaessence_api::Error) -> Self {
        Self::Api(e)
    }
}
