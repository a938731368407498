//! Template-facing text helpers.
//!
//! # Responsibility
//! - Derive excerpts, paragraph markup, SEO tag blocks and display dates
//!   from already-loaded content fields.
//!
//! # Invariants
//! - Every function here is pure: no repository access, no I/O.
//! - Lengths are counted in Unicode scalar values, not bytes.
//! - `excerpt` output never exceeds its limit and never contains `<` or `>`.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;

/// Marker separating the teaser from the rest of a body.
pub const READ_MORE_MARKER: &str = "<!--more-->";
pub const DEFAULT_EXCERPT_LIMIT: usize = 120;
/// Excerpt length used for the SEO description fallback.
pub const SEO_EXCERPT_LIMIT: usize = 150;

static HTML_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("valid comment regex"));
static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z/!?][^>]*(?:>|\z)").expect("valid tag regex"));

/// Options for `excerpt_with`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcerptOptions<'a> {
    /// Maximum number of characters before mutators are accounted for.
    pub limit: usize,
    /// Strings the caller will append (e.g. "... Read more"); each one's
    /// length is taken out of the budget in order.
    pub mutators: &'a [&'a str],
    /// Cut the body at `<!--more-->` before stripping markup.
    pub to_read_more: bool,
}

impl Default for ExcerptOptions<'_> {
    fn default() -> Self {
        Self {
            limit: DEFAULT_EXCERPT_LIMIT,
            mutators: &[],
            to_read_more: false,
        }
    }
}

/// Plain-text excerpt of `content` limited to `limit` characters.
pub fn excerpt(content: &str, limit: usize) -> String {
    excerpt_with(
        content,
        &ExcerptOptions {
            limit,
            ..ExcerptOptions::default()
        },
    )
}

/// Plain-text excerpt honoring mutators and the read-more cut.
pub fn excerpt_with(content: &str, options: &ExcerptOptions<'_>) -> String {
    let source = if options.to_read_more {
        before_read_more(content)
    } else {
        content
    };
    let budget = excerpt_budget(options.limit, options.mutators);
    truncate_chars(strip_tags(source).trim_end(), budget)
}

/// Remaining character budget once every mutator is accounted for.
pub fn excerpt_budget(limit: usize, mutators: &[&str]) -> usize {
    mutators
        .iter()
        .fold(limit, |budget, mutator| {
            budget.saturating_sub(mutator.chars().count())
        })
}

/// Part of `content` before the first `<!--more-->`, or all of it.
pub fn before_read_more(content: &str) -> &str {
    content
        .split_once(READ_MORE_MARKER)
        .map_or(content, |(teaser, _)| teaser)
}

/// Removes comments and tags. A tag opens with `<` followed by a letter, `/`,
/// `!` or `?`; unterminated tags run to the end of input. Any other `<` or
/// `>` is dropped on its own.
pub fn strip_tags(content: &str) -> String {
    let without_comments = HTML_COMMENT_RE.replace_all(content, "");
    let without_tags = HTML_TAG_RE.replace_all(&without_comments, "");
    without_tags.replace(&['<', '>'][..], "")
}

/// First `limit` characters of `text` with trailing whitespace trimmed; `text`
/// unchanged when it already fits.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((byte_index, _)) => text[..byte_index].trim_end().to_string(),
    }
}

/// Wraps `content` in paragraphs, turning every line break into a boundary.
///
/// Applying it twice nests the markup; callers must pass raw bodies.
pub fn paragraphs(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    format!("<p>{}</p>", normalized.replace('\n', "</p><p>"))
}

/// Two-line `<title>` + description `<meta>` block.
pub fn seo_meta(title: &str, suffix: Option<&str>, description: &str) -> String {
    let mut meta = String::from("<title>");
    meta.push_str(title);
    if let Some(suffix) = suffix.filter(|value| !value.is_empty()) {
        meta.push_str(" | ");
        meta.push_str(suffix);
    }
    meta.push_str("</title>\n<meta name=\"description\" content=\"");
    meta.push_str(&escape_attribute(description));
    meta.push_str("\">");
    meta
}

/// Escapes characters that would break out of a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `3rd March 2024` style date.
pub fn long_date(value: &NaiveDateTime) -> String {
    format!(
        "{}{} {}",
        value.day(),
        ordinal_suffix(value.day()),
        value.format("%B %Y")
    )
}

/// Formats with a strftime pattern; `None` when the pattern is invalid.
pub fn format_date(value: &NaiveDateTime, pattern: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let mut formatted = String::new();
    write!(formatted, "{}", value.format_with_items(items.into_iter())).ok()?;
    Some(formatted)
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
