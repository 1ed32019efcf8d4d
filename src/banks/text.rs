//! Markup stripping for central-bank pages.
//!
//! Block-level boundaries become blank lines before tags are removed, so
//! that paragraph structure survives for the policy extractor. The rate
//! extractor uses the [`flatten`]ed form.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static RE_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static RE_BLOCK_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(p|div|li|h[1-6]|tr|section|article|header|footer|nav|ul|ol|table|blockquote)\s*>|<br\s*/?>").unwrap()
});
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static RE_HSPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static RE_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup from `html`, keeping paragraphs separated by blank lines.
pub fn strip_markup(html: &str) -> String {
    let text = html.strip_prefix('\u{feff}').unwrap_or(html);
    let text = RE_SCRIPT.replace_all(text, "");
    let text = RE_STYLE.replace_all(&text, "");
    let text = RE_COMMENT.replace_all(&text, "");
    let text = RE_BLOCK_END.replace_all(&text, "\n\n");
    let text = RE_TAG.replace_all(&text, " ");
    let text = html_escape::decode_html_entities(&text);
    let text = text.replace('\u{a0}', " ");

    let lines: Vec<String> = text
        .lines()
        .map(|line| RE_HSPACE.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");
    RE_BLANKS.replace_all(&joined, "\n\n").trim().to_string()
}

/// Strip markup and collapse all whitespace to single spaces.
pub fn flatten(html: &str) -> String {
    RE_WS.replace_all(&strip_markup(html), " ").trim().to_string()
}

/// Split stripped text into paragraphs on blank lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| RE_WS.replace_all(p, " ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Split stripped text into paragraphs on every newline.
pub fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Split text into sentences after `.` or `?` followed by whitespace.
///
/// Does not split after abbreviations such as `Mr.`, `Dr.` or `e.g.`.
pub fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for i in 0..chars.len() {
        let (idx, ch) = chars[i];
        if ch != '.' && ch != '?' {
            continue;
        }
        let next_is_space = chars.get(i + 1).is_some_and(|(_, c)| c.is_whitespace());
        if !next_is_space || is_abbreviation(&text[start..idx + 1]) {
            continue;
        }
        let sentence = text[start..idx + 1].trim();
        if !sentence.is_empty() {
            out.push(sentence.to_string());
        }
        start = idx + 1;
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out
}

fn is_abbreviation(fragment: &str) -> bool {
    let last_word = fragment
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    let word: Vec<char> = last_word.chars().collect();
    // "Mr." / "Dr." / "St."
    let title = word.len() == 3 && word[0].is_ascii_uppercase() && word[1].is_ascii_lowercase() && word[2] == '.';
    // "e.g." / "i.e." / "U.S."
    let dotted = word.len() == 4
        && word[0].is_alphanumeric()
        && word[1] == '.'
        && word[2].is_alphanumeric()
        && word[3] == '.';
    title || dotted
}
