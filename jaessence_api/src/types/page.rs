use serde::{Deserialize, Serialize};

/// A fetched HTML document.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Page {
    /// Final URL after redirects.
    pub url: String,

    pub status: u16,

    pub html: String,
}
