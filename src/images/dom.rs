//! Image candidates from `<img>` elements in the page body.

use scraper::{ElementRef, Html, Selector};

const PREFERRED_HINTS: &[&str] = &[
    "hero", "featured", "lead", "main", "article", "story", "headline", "top", "primary",
];
const REJECTED_HINTS: &[&str] = &["logo", "icon", "avatar", "sprite", "badge", "tracking"];
/// Too short to match as a prefix (`adaptive`, `admin`).
const REJECTED_TOKENS: &[&str] = &["ad", "ads"];

const MIN_SIDE: u64 = 100;

/// The image URL an `<img>` would load, including common lazy-load
/// attributes and the first `srcset` entry.
fn source_of(img: &ElementRef) -> Option<String> {
    let el = img.value();
    ["src", "data-src", "data-lazy-src"]
        .iter()
        .filter_map(|attr| el.attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty() && !v.starts_with("data:"))
        .map(str::to_string)
        .or_else(|| {
            el.attr("srcset")
                .and_then(|s| s.split(',').next())
                .and_then(|first| first.split_whitespace().next())
                .filter(|v| !v.starts_with("data:"))
                .map(str::to_string)
        })
}

fn hints(img: &ElementRef) -> String {
    let el = img.value();
    format!("{} {}", el.attr("class").unwrap_or(""), el.attr("id").unwrap_or("")).to_lowercase()
}

fn is_rejected(haystack: &str) -> bool {
    haystack
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| REJECTED_TOKENS.contains(&token) || REJECTED_HINTS.iter().any(|n| token.starts_with(n)))
}

/// Images whose class or id suggests they illustrate the story.
///
/// Rejected hints are matched per class/id token: `ad-slot` and `logos`
/// are rejected, `headline` and `adaptive-hero` are not.
pub fn class_candidates(document: &Html) -> Vec<String> {
    let selector = Selector::parse("img").unwrap();
    document
        .select(&selector)
        .filter(|img| {
            let h = hints(img);
            PREFERRED_HINTS.iter().any(|p| h.contains(p)) && !is_rejected(&h)
        })
        .filter_map(|img| source_of(&img))
        .collect()
}

fn dimension(img: &ElementRef, attr: &str) -> Option<u64> {
    let raw = img.value().attr(attr)?.trim().trim_end_matches("px");
    raw.parse::<u64>().ok()
}

/// The `<img>` with the largest declared area, ignoring images smaller
/// than 100x100.
pub fn largest_candidate(document: &Html) -> Option<String> {
    let selector = Selector::parse("img").unwrap();
    document
        .select(&selector)
        .filter_map(|img| {
            let width = dimension(&img, "width")?;
            let height = dimension(&img, "height")?;
            if width < MIN_SIDE || height < MIN_SIDE {
                return None;
            }
            // Declared sizes come from the page and can be absurd
            let area = width.checked_mul(height)?;
            Some((area, source_of(&img)?))
        })
        .max_by_key(|(area, _)| *area)
        .map(|(_, src)| src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_candidates() {
        let html = r#"<body>
            <img class="site-logo main" src="/logo.png">
            <img class="ad-slot top" src="/ad.gif">
            <img class="article-hero" data-src="/hero.jpg" src="data:image/gif;base64,R0lGOD">
            <img id="story-image" srcset="/story-640.jpg 640w, /story-1280.jpg 1280w">
            <img class="plain" src="/plain.jpg">
        </body>"#;
        let document = Html::parse_document(html);
        assert_eq!(class_candidates(&document), vec!["/hero.jpg", "/story-640.jpg"]);
    }

    #[test]
    fn test_class_candidates_ad_is_whole_token() {
        let html = r#"<body>
            <img class="adaptive-image hero" src="/adaptive.jpg">
            <img class="admin-hero" src="/admin.jpg">
            <img class="ads featured" src="/ads.jpg">
            <img class="hero-logos" src="/logos.png">
        </body>"#;
        let document = Html::parse_document(html);
        assert_eq!(class_candidates(&document), vec!["/adaptive.jpg", "/admin.jpg"]);
    }

    #[test]
    fn test_largest_candidate_ignores_overflowing_dimensions() {
        let html = r#"<body>
            <img src="/huge.jpg" width="99999999999" height="99999999999">
            <img src="/overflow.jpg" width="18446744073709551615" height="2">
            <img src="/real.jpg" width="1200" height="675">
        </body>"#;
        let document = Html::parse_document(html);
        assert_eq!(largest_candidate(&document).as_deref(), Some("/real.jpg"));
    }

    #[test]
    fn test_largest_candidate() {
        let html = r#"<body>
            <img src="/pixel.gif" width="1" height="1">
            <img src="/wide.jpg" width="800" height="120">
            <img src="/big.jpg" width="640px" height="480">
            <img src="data:image/png;base64,AAAA" width="2000" height="2000">
            <img src="/nosize.jpg">
        </body>"#;
        let document = Html::parse_document(html);
        assert_eq!(largest_candidate(&document).as_deref(), Some("/big.jpg"));
    }

    #[test]
    fn test_largest_none_when_all_small() {
        let document = Html::parse_document(r#"<img src="/a.jpg" width="50" height="400">"#);
        assert!(largest_candidate(&document).is_none());
    }
}
