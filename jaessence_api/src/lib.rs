//! Storefront client for the JA Essence de la Vie shop: one cookie-bearing
//! HTTP session with bounded retries, plus the catalog record types shared by
//! the rest of the workspace.

mod client;
mod errors;
mod retry;
pub mod types;
mod user_agent;
pub use self::client::{Client, DEFAULT_BASE_URL};
pub use self::errors::Error;
pub use self::retry::{RetryPolicy, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS};
