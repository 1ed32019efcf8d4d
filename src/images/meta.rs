//! Image candidates from `<meta>` and `<link>` tags.

use scraper::{Html, Selector};

/// `(selector, attribute)` pairs in priority order.
const META_SOURCES: &[(&str, &str)] = &[
    (r#"meta[property="og:image"]"#, "content"),
    (r#"meta[property="og:image:secure_url"]"#, "content"),
    (r#"meta[property="og:image:url"]"#, "content"),
    (r#"meta[name="og:image"]"#, "content"),
    (r#"meta[name="twitter:image"]"#, "content"),
    (r#"meta[property="twitter:image"]"#, "content"),
    (r#"meta[name="twitter:image:src"]"#, "content"),
    (r#"meta[itemprop="image"]"#, "content"),
    (r#"link[rel="image_src"]"#, "href"),
];

/// All non-empty image URLs declared in the document head, best first.
pub fn candidates(document: &Html) -> Vec<String> {
    let mut found = Vec::new();
    for (css, attr) in META_SOURCES {
        let selector = Selector::parse(css).unwrap();
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                let value = value.trim();
                if !value.is_empty() && !found.iter().any(|f| f == value) {
                    found.push(value.to_string());
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_priority() {
        let html = r#"<html><head>
            <meta name="twitter:image" content="https://cdn.example/tw.jpg">
            <link rel="image_src" href="/img/link.png">
            <meta property="og:image" content=" https://cdn.example/og.jpg ">
            <meta itemprop="image" content="https://cdn.example/og.jpg">
        </head><body></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            candidates(&document),
            vec!["https://cdn.example/og.jpg", "https://cdn.example/tw.jpg", "/img/link.png"]
        );
    }

    #[test]
    fn test_meta_none() {
        let document = Html::parse_document(r#"<html><head><meta property="og:title" content="x"></head></html>"#);
        assert!(candidates(&document).is_empty());
    }
}
