//! URL extraction from free-text messages.
//!
//! Users paste whole share messages ("check this https://... out"), so the
//! URL has to be fished out of surrounding text. The grammar is deliberately
//! narrow: an `http`/`https` scheme followed by alphanumerics, the
//! `$`..`_` ASCII range, `@.&+!*(),` and `%XX` escapes. Anything outside that
//! class (whitespace, CJK punctuation, `~`, `{`) terminates the match.

use std::sync::LazyLock;

use regex::Regex;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
        .expect("URL pattern is a valid regex")
});

/// All URL-like substrings of `text`, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<&str> {
    URL_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// The first URL-like substring of `text`, if any.
pub fn first_url(text: &str) -> Option<&str> {
    URL_PATTERN.find(text).map(|m| m.as_str())
}
