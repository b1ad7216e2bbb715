//! Data models for bookmarks
//!
//! Defines the core data structures: `Bookmark` (a stored row with its
//! resolved tags), `NewBookmark` and `BookmarkUpdate` (write requests), and
//! `TagCount` (tag usage). Tag and text normalization lives here too, so
//! every write path applies the same rules.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum length of a tag name, in characters
pub const MAX_TAG_LENGTH: usize = 64;

/// Maximum number of tags on one bookmark
pub const MAX_TAGS_PER_BOOKMARK: usize = 20;

/// Titles are cut to this many characters
pub const MAX_TITLE_LENGTH: usize = 500;

/// Descriptions are cut to this many characters
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Schemes a stored URL may use
pub const ACCEPTED_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Scheme assumed when the input has none
const DEFAULT_SCHEME: &str = "https";

/// A stored bookmark
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    /// Surrogate identifier
    pub id: i64,
    /// The URL
    pub url: String,
    /// Optional display title
    pub title: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Normalized tag names, sorted
    pub tags: Vec<String>,
    /// When this bookmark was created
    pub created_at: DateTime<Utc>,
    /// When this bookmark was last updated
    pub updated_at: DateTime<Utc>,
}

impl Bookmark {
    /// Title if present, otherwise the URL
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }

    /// Check whether the bookmark carries a tag (already normalized)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A bookmark to be inserted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBookmark {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Explicit creation time (imports); `None` means now
    pub created_at: Option<DateTime<Utc>>,
}

impl NewBookmark {
    /// Create a new bookmark request for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// A partial update to an existing bookmark
///
/// Only fields set to `Some` are written. An empty title or description
/// clears the field; `tags: Some(vec![])` removes every tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Replacement tag set
    pub tags: Option<Vec<String>>,
}

impl BookmarkUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

/// A tag with the number of bookmarks currently using it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCount {
    pub name: String,
    pub count: u64,
}

impl std::fmt::Display for TagCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.count)
    }
}

/// Normalize a single tag name: trimmed, lowercased, inner whitespace
/// collapsed to single spaces
///
/// Rejects empty names, names longer than [`MAX_TAG_LENGTH`], and names
/// containing a comma (the tag separator in exported files).
pub fn normalize_tag(raw: &str) -> Result<String> {
    let tag = collapse_whitespace(raw).to_lowercase();
    if tag.is_empty() {
        return Err(Error::validation("tag name must not be empty"));
    }
    if tag.chars().count() > MAX_TAG_LENGTH {
        return Err(Error::validation(format!(
            "tag '{}' is longer than {} characters",
            tag, MAX_TAG_LENGTH
        )));
    }
    if tag.contains(',') {
        return Err(Error::validation(format!(
            "tag '{}' must not contain a comma",
            tag
        )));
    }
    Ok(tag)
}

/// Normalize a list of tag names into a sorted, duplicate-free set
///
/// At most [`MAX_TAGS_PER_BOOKMARK`] distinct tags are accepted.
pub fn normalize_tags<I, S>(raw: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tags = raw
        .into_iter()
        .map(|t| normalize_tag(t.as_ref()))
        .collect::<Result<BTreeSet<_>>>()?;
    if tags.len() > MAX_TAGS_PER_BOOKMARK {
        return Err(Error::validation(format!(
            "a bookmark can carry at most {} tags, got {}",
            MAX_TAGS_PER_BOOKMARK,
            tags.len()
        )));
    }
    Ok(tags.into_iter().collect())
}

/// Title on a single line, cut to [`MAX_TITLE_LENGTH`]; blank means `None`
pub fn normalize_title(raw: Option<&str>) -> Option<String> {
    let title = collapse_whitespace(raw?);
    (!title.is_empty()).then(|| truncate_chars(&title, MAX_TITLE_LENGTH).trim_end().to_string())
}

/// Trimmed description, cut to [`MAX_DESCRIPTION_LENGTH`]; blank means `None`
pub fn normalize_description(raw: Option<&str>) -> Option<String> {
    let description = raw?.trim();
    (!description.is_empty())
        .then(|| truncate_chars(description, MAX_DESCRIPTION_LENGTH).trim_end().to_string())
}

/// Validate and canonicalize a URL
///
/// A missing scheme becomes `https://`. The scheme must be one of
/// [`ACCEPTED_SCHEMES`] and a host is required. Scheme and authority are
/// lowercased and a bare root path (`https://a.com/`) loses its slash.
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("URL must not be empty"));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(Error::validation(format!(
            "URL '{}' must not contain whitespace",
            trimmed
        )));
    }

    let with_scheme;
    let (scheme, rest) = match split_scheme(trimmed) {
        Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
        None => {
            with_scheme = format!("//{}", trimmed);
            (DEFAULT_SCHEME.to_string(), with_scheme.as_str())
        }
    };
    if !ACCEPTED_SCHEMES.contains(&scheme.as_str()) {
        return Err(Error::validation(format!(
            "URL scheme '{}' is not allowed (use one of: {})",
            scheme,
            ACCEPTED_SCHEMES.join(", ")
        )));
    }

    let Some(rest) = rest.strip_prefix("//") else {
        return Err(Error::validation(format!("URL '{}' has no host", trimmed)));
    };
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);

    let host = authority.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    if host.is_empty() {
        return Err(Error::validation(format!("URL '{}' has no host", trimmed)));
    }

    let tail = match tail.strip_prefix('/') {
        Some(after) if after.is_empty() || after.starts_with(['?', '#']) => after,
        _ => tail,
    };

    Ok(format!("{}://{}{}", scheme, authority.to_lowercase(), tail))
}

/// Split `scheme:rest` when the input starts with a scheme
///
/// `example.com:8080/x` is a host with a port, not a scheme, so a colon
/// followed by a digit does not count unless `//` comes right after it.
fn split_scheme(url: &str) -> Option<(&str, &str)> {
    let colon = url.find(':')?;
    let (scheme, rest) = (&url[..colon], &url[colon + 1..]);

    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return None;
    }
    if rest.starts_with("//") || !rest.starts_with(|c: char| c.is_ascii_digit()) {
        Some((scheme, rest))
    } else {
        None
    }
}

/// Trim and squeeze runs of whitespace into one space
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
