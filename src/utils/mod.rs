use once_cell::sync::Lazy;
use regex::Regex;

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.+?\)").expect("parenthetical regex should compile"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("html tag regex should compile"));

pub fn sanitize_filename(filename: &str) -> String {
    // Remove or replace characters that are invalid in filenames
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '-',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Removes parenthesised annotations such as a release year: `Heroes (2006)` -> `Heroes`.
///
/// Only applies when the text does not start with the parenthesis.
pub fn strip_parenthetical(text: &str) -> String {
    match text.find('(') {
        Some(index) if index > 0 => PARENTHETICAL.replace_all(text, "").trim().to_string(),
        _ => text.to_string(),
    }
}

/// Unescapes the entities scraped listing pages leave in plots and titles and
/// folds line breaks into spaces.
pub fn clean_text(text: &str) -> String {
    text.replace("&eacute;", "é")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#x22;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace(|c: char| c == '\n' || c == '\r', " ")
        .trim()
        .to_string()
}

/// Flattens catalog HTML summaries (`<p>A <b>bold</b> plot.</p>`) to plain text.
pub fn html_to_text(html: &str) -> String {
    clean_text(&HTML_TAG.replace_all(html, ""))
}
