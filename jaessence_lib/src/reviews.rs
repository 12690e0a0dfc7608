//! Customer reviews from the plain text of a product page.

use std::sync::LazyLock;

use jaessence_api::types::Review;
use regex::Regex;

use crate::text::{char_len, collapse_whitespace, truncate_chars};

/// Reviews kept per product.
pub const MAX_REVIEWS: usize = 3;

/// Comments are cut to this many characters.
pub const REVIEW_BODY_MAX_CHARS: usize = 300;

/// Entries outside this window are noise, not reviews.
const ENTRY_MIN_CHARS: usize = 5;
const ENTRY_MAX_CHARS: usize = 500;

const DEFAULT_AUTHOR: &str = "Cliente verificado";

static SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)(?:Avaliações|Reviews)(.*?)(?:Você também pode gostar|You may also like|Carregar mais|Load more|$)",
    )
    .expect("valid review section regex")
});

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{2}/\d{2}/\d{4}\b").expect("valid review date regex"));

static VERIFIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)compra\s+verificada|verified\s+purchase").expect("valid verified marker regex")
});

static AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{Lu}\p{Ll}+(?:\s\p{Lu}\p{Ll}+)*$").expect("valid author regex")
});

/// Extracts up to [`MAX_REVIEWS`] reviews in page order.
///
/// Each date inside the review section opens an entry that runs to the next
/// date, the verified-purchase marker, or the end of the section. A page
/// without the section header has no reviews.
pub fn extract_reviews(text: &str) -> Vec<Review> {
    let Some(section) = SECTION.captures(text).and_then(|cap| cap.get(1)) else {
        return Vec::new();
    };
    let section = section.as_str();
    let dates: Vec<_> = DATE.find_iter(section).collect();

    let mut reviews = Vec::new();
    for (i, date) in dates.iter().enumerate() {
        let end = dates.get(i + 1).map_or(section.len(), |next| next.start());
        let mut entry = &section[date.end()..end];
        if let Some(marker) = VERIFIED.find(entry) {
            entry = &entry[..marker.start()];
        }

        let body = collapse_whitespace(entry);
        let len = char_len(&body);
        if !(ENTRY_MIN_CHARS..=ENTRY_MAX_CHARS).contains(&len) {
            continue;
        }

        let (author, comment) = split_author(&body);
        if char_len(&comment) <= 3 {
            continue;
        }

        reviews.push(Review {
            date: date.as_str().to_string(),
            author,
            body: truncate_chars(&comment, REVIEW_BODY_MAX_CHARS),
            verified: true,
        });
        if reviews.len() == MAX_REVIEWS {
            break;
        }
    }
    reviews
}

/// Splits a trailing capitalized name off the entry, trying two words
/// before one. The comment must stay non-empty.
fn split_author(body: &str) -> (String, String) {
    let words: Vec<&str> = body.split_whitespace().collect();
    for take in [2, 1] {
        if words.len() <= take {
            continue;
        }
        let (comment, name) = words.split_at(words.len() - take);
        let author = name.join(" ");
        if AUTHOR.is_match(&author) {
            return (author, comment.join(" "));
        }
    }
    (DEFAULT_AUTHOR.to_string(), words.join(" "))
}
