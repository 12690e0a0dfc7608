use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jaessence_lib::{CatalogRecord, CatalogRun, CatalogSummary, Category, RunStatus};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Number of products listed per category in the summary report.
const SUMMARY_PRODUCTS_PER_CATEGORY: usize = 5;

/// Format of the run summary printed to stdout.
#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Markdown,
    Json,
}

/// Files written for the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
    Both,
}

impl FileFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "both" => Ok(Self::Both),
            other => anyhow::bail!("unknown file format '{}', expected json, csv or both", other),
        }
    }
}

/// File stem for the catalog, tagged by how the run ended.
pub fn output_stem(status: &RunStatus) -> &'static str {
    match status {
        RunStatus::Complete => "perfumes",
        RunStatus::Interrupted => "perfumes_partial",
        RunStatus::Failed(_) => "perfumes_error",
    }
}

/// Writes the catalog files into `dir` and returns their paths.
pub fn write_catalog(
    dir: &Path,
    stem: &str,
    format: FileFormat,
    records: &[CatalogRecord],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    if matches!(format, FileFormat::Json | FileFormat::Both) {
        let path = dir.join(format!("{stem}.json"));
        write_json(&path, records)?;
        written.push(path);
    }
    if matches!(format, FileFormat::Csv | FileFormat::Both) {
        let path = dir.join(format!("{stem}.csv"));
        write_csv(&path, records)?;
        written.push(path);
    }
    Ok(written)
}

/// JSON array of records, reviews nested, pretty-printed UTF-8.
pub fn write_json(path: &Path, records: &[CatalogRecord]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// One CSV row per record. Missing fields are empty cells and the reviews
/// column holds the reviews as a JSON array string.
#[derive(Serialize)]
struct CsvRow {
    name: String,
    category: String,
    link: String,
    price: String,
    price_original: String,
    price_pix: String,
    installment: String,
    discount: String,
    volume: String,
    inspiration: String,
    notes_top: String,
    notes_heart: String,
    notes_base: String,
    description: String,
    image_url: String,
    reviews: String,
}

fn build_csv_rows(records: &[CatalogRecord]) -> Result<Vec<CsvRow>> {
    records
        .iter()
        .map(|r| {
            Ok(CsvRow {
                name: r.name.clone(),
                category: r.category.to_string(),
                link: r.link.clone(),
                price: r.price.clone().unwrap_or_default(),
                price_original: r.price_original.clone().unwrap_or_default(),
                price_pix: r.price_pix.clone().unwrap_or_default(),
                installment: r.installment.clone().unwrap_or_default(),
                discount: r.discount.clone().unwrap_or_default(),
                volume: r.volume.clone().unwrap_or_default(),
                inspiration: r.inspiration.clone().unwrap_or_default(),
                notes_top: r.notes_top.clone().unwrap_or_default(),
                notes_heart: r.notes_heart.clone().unwrap_or_default(),
                notes_base: r.notes_base.clone().unwrap_or_default(),
                description: r.description.clone().unwrap_or_default(),
                image_url: r.image_url.clone().unwrap_or_default(),
                reviews: serde_json::to_string(&r.reviews)?,
            })
        })
        .collect()
}

pub fn write_csv(path: &Path, records: &[CatalogRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in build_csv_rows(records)? {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- Summary report --

#[derive(Tabled, Serialize)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Products")]
    products: usize,
}

#[derive(Tabled, Serialize)]
struct ProductRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Inspiration")]
    inspiration: String,
    #[tabled(rename = "Reviews")]
    reviews: usize,
}

fn build_category_rows(run: &CatalogRun) -> Vec<CategoryRow> {
    let mut rows: Vec<CategoryRow> = run
        .summary
        .per_category
        .iter()
        .map(|c| CategoryRow {
            category: c.category.label().to_string(),
            products: c.count,
        })
        .collect();
    rows.push(CategoryRow {
        category: "Total".to_string(),
        products: run.summary.total,
    });
    rows
}

/// First products of each category with their headline fields.
fn build_product_rows(records: &[CatalogRecord]) -> Vec<ProductRow> {
    Category::ALL
        .iter()
        .flat_map(|&category| {
            records
                .iter()
                .filter(move |r| r.category == category)
                .take(SUMMARY_PRODUCTS_PER_CATEGORY)
        })
        .map(|r| ProductRow {
            category: r.category.label().to_string(),
            name: r.name.clone(),
            price: r.display_price().unwrap_or("N/A").to_string(),
            inspiration: r.inspiration.clone().unwrap_or_else(|| "N/A".to_string()),
            reviews: r.reviews.len(),
        })
        .collect()
}

fn status_line(run: &CatalogRun) -> String {
    let status = match &run.status {
        RunStatus::Complete => "complete".to_string(),
        RunStatus::Interrupted => "interrupted".to_string(),
        RunStatus::Failed(msg) => format!("failed ({})", msg),
    };
    format!(
        "Run {}: {} products, {} enriched, {} seed-only, {} with reviews",
        status,
        run.summary.total,
        run.summary.enriched,
        run.summary.seed_only,
        run.summary.with_reviews
    )
}

pub fn print_summary_table(run: &CatalogRun) {
    println!("{}", status_line(run));
    println!("{}", Table::new(build_category_rows(run)));
    println!("{}", Table::new(build_product_rows(&run.catalog)));
}

pub fn print_summary_markdown(run: &CatalogRun) {
    println!("{}", status_line(run));
    println!();
    let mut categories = Table::new(build_category_rows(run));
    categories.with(Style::markdown());
    println!("{}", categories);
    println!();
    let mut products = Table::new(build_product_rows(&run.catalog));
    products.with(Style::markdown());
    println!("{}", products);
}

/// Machine-readable run report.
#[derive(Serialize)]
pub struct RunReport<'a> {
    pub generated_at: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub summary: &'a CatalogSummary,
    pub files: Vec<String>,
}

impl<'a> RunReport<'a> {
    pub fn new(run: &'a CatalogRun, files: &[PathBuf]) -> Self {
        let (status, error) = match &run.status {
            RunStatus::Complete => ("complete", None),
            RunStatus::Interrupted => ("interrupted", None),
            RunStatus::Failed(msg) => ("failed", Some(msg.as_str())),
        };
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            status,
            error,
            summary: &run.summary,
            files: files.iter().map(|p| p.display().to_string()).collect(),
        }
    }
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
