//! Plain-text rendering of HTML documents and small string helpers shared by
//! the extractors.

use scraper::{ElementRef, Html};

/// Elements whose text is never visible on the rendered page.
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Renders the visible text of a document as one line.
///
/// Text nodes are split on whitespace and rejoined with single spaces, so the
/// result has no newlines and no runs of blanks. Anything inside `<head>` or
/// a script or style element is skipped.
pub fn page_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        for word in text.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

/// Visible text of a single element, whitespace-collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `s` to at most `max` characters (not bytes) and trims the tail.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_text_joins_and_skips_scripts() {
        let html = Html::parse_document(
            "<html><head><title>Loja</title><style>p { color: red }</style></head>\
             <body><h1>Perfume\n  Inspirado</h1><script>var x = 1;</script>\
             <p>de <b>R$165,90</b> por R$134,90</p></body></html>",
        );
        assert_eq!(
            page_text(&html),
            "Perfume Inspirado de R$165,90 por R$134,90"
        );
    }

    #[test]
    fn test_page_text_decodes_entities() {
        let html = Html::parse_document("<p>Notas de Cora&ccedil;&atilde;o: Rosa &amp; Jasmim</p>");
        assert_eq!(page_text(&html), "Notas de Coração: Rosa & Jasmim");
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("fragrância", 6), "fragrâ");
        assert_eq!(truncate_chars("curto", 10), "curto");
        assert_eq!(truncate_chars("ab cd", 3), "ab");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
    }
}
