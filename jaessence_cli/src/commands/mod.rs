//! CLI subcommand implementations.

pub mod scrape;
