//! Link extraction from fetched pages
//!
//! Anchor hrefs are resolved against the page URL, fragment-stripped,
//! and filtered to http(s). Classification of a link as a document
//! candidate is by path suffix, not content type: the crawler never
//! fetches a URL just to find out what it is.

use crate::crawler::frontier::normalize;
use scraper::{Html, Selector};
use url::Url;

/// Extracts all followable links from an HTML page as absolute URLs
///
/// Invalid hrefs and non-http(s) schemes (`mailto:`, `javascript:`,
/// `data:`, ...) are dropped silently; a page full of junk links is
/// normal on the open web.
///
/// # Example
///
/// ```
/// use pdf_harvest::crawler::{extract_links, is_pdf_url};
/// use url::Url;
///
/// let html = r#"<a href="report.pdf">Report</a>"#;
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links[0].as_str(), "https://example.com/docs/report.pdf");
/// assert!(is_pdf_url(&links[0]));
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(resolved) = resolve_link(href, base_url) {
                links.push(resolved);
            }
        }
    }
    links
}

/// Whether a URL points at a PDF document, judged by its path
pub fn is_pdf_url(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = base_url.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    Some(normalize(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/reports/index.html").unwrap()
    }

    #[test]
    fn extracts_and_resolves_relative_links() {
        let html = r#"<html><body>
            <a href="annual.pdf">Annual report</a>
            <a href="/about">About</a>
            <a href="https://other.org/page">External</a>
        </body></html>"#;

        let links = extract_links(html, &base());
        let strings: Vec<String> = links.iter().map(|u| u.to_string()).collect();

        assert_eq!(
            strings,
            vec![
                "https://example.com/reports/annual.pdf",
                "https://example.com/about",
                "https://other.org/page",
            ]
        );
    }

    #[test]
    fn strips_fragments() {
        let html = r#"<a href="/page#section">link</a>"#;
        let links = extract_links(html, &base());
        assert_eq!(links[0].as_str(), "https://example.com/page");
    }

    #[test]
    fn rejects_non_http_schemes() {
        let html = r#"<html><body>
            <a href="mailto:admin@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="tel:+15551234">Call</a>
            <a href="ftp://example.com/file">FTP</a>
            <a href="/real">Real</a>
        </body></html>"#;

        let links = extract_links(html, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].path(), "/real");
    }

    #[test]
    fn ignores_empty_and_malformed_hrefs() {
        let html = r#"<a href="">empty</a><a href="   ">blank</a><a>none</a>"#;
        assert!(extract_links(html, &base()).is_empty());
    }

    #[test]
    fn pdf_classification_is_case_insensitive() {
        assert!(is_pdf_url(&Url::parse("https://example.com/a.pdf").unwrap()));
        assert!(is_pdf_url(&Url::parse("https://example.com/b.PDF").unwrap()));
        assert!(is_pdf_url(&Url::parse("https://example.com/c.Pdf").unwrap()));
        assert!(!is_pdf_url(&Url::parse("https://example.com/page").unwrap()));
        assert!(!is_pdf_url(
            &Url::parse("https://example.com/pdf-guide.html").unwrap()
        ));
    }

    #[test]
    fn query_does_not_affect_pdf_classification() {
        assert!(is_pdf_url(
            &Url::parse("https://example.com/a.pdf?version=2").unwrap()
        ));
        assert!(!is_pdf_url(
            &Url::parse("https://example.com/download?file=a.pdf").unwrap()
        ));
    }
}
