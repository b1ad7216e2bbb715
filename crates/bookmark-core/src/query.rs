//! Query building for bookmark listings
//!
//! Filters are turned into SQL fragments with positional (`?`) parameters
//! and bound values, which the repository concatenates into one SELECT:
//!
//! - `TagFilter`: bookmark must carry every requested tag (AND)
//! - `KeywordFilter`: case-insensitive substring on url, title or description
//! - `Page`: limit/offset, newest first

use rusqlite::types::Value;

use crate::error::{Error, Result};
use crate::models::normalize_tag;

/// Default number of bookmarks per page
pub const DEFAULT_LIMIT: u32 = 50;

/// Columns selected for every bookmark row, in `BookmarkRow` order
pub(crate) const BOOKMARK_COLUMNS: &str =
    "b.id, b.url, b.title, b.description, b.created_at, b.updated_at";

/// A piece of SQL and the values bound to its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Superset filter over tag names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    tags: Vec<String>,
}

impl TagFilter {
    /// Build a filter from raw tag names
    ///
    /// Names are normalized and deduplicated. A blank or otherwise invalid
    /// name makes the whole filter invalid.
    pub fn new<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags = Vec::new();
        for name in raw {
            let tag = normalize_tag(name.as_ref()).map_err(|e| match e {
                Error::Validation(msg) => {
                    Error::Validation(format!("malformed tag filter: {}", msg))
                }
                other => other,
            })?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags.sort();
        Ok(Self { tags })
    }

    /// A filter that matches every bookmark
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The normalized tag names
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// WHERE condition, or `None` when the filter is empty
    pub fn clause(&self) -> Option<SqlFragment> {
        if self.tags.is_empty() {
            return None;
        }

        let placeholders = vec!["?"; self.tags.len()].join(", ");
        let sql = format!(
            "b.id IN (\
             SELECT bt.bookmark_id FROM bookmark_tags bt \
             JOIN tags t ON t.id = bt.tag_id \
             WHERE t.name IN ({}) \
             GROUP BY bt.bookmark_id \
             HAVING COUNT(DISTINCT bt.tag_id) = ?)",
            placeholders
        );

        let mut params: Vec<Value> = self.tags.iter().cloned().map(Value::Text).collect();
        params.push(Value::Integer(self.tags.len() as i64));

        Some(SqlFragment { sql, params })
    }
}

/// Substring search over url, title and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    keyword: String,
}

impl KeywordFilter {
    pub fn new(keyword: &str) -> Result<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(Error::validation("search keyword must not be empty"));
        }
        Ok(Self {
            keyword: keyword.to_string(),
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// LIKE pattern with `%`, `_` and `\` escaped
    fn pattern(&self) -> String {
        let mut escaped = String::with_capacity(self.keyword.len() + 2);
        escaped.push('%');
        for c in self.keyword.chars() {
            if matches!(c, '\\' | '%' | '_') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        escaped
    }

    pub fn clause(&self) -> SqlFragment {
        let pattern = self.pattern();
        SqlFragment {
            sql: "(b.url LIKE ? ESCAPE '\\' \
                  OR b.title LIKE ? ESCAPE '\\' \
                  OR b.description LIKE ? ESCAPE '\\')"
                .to_string(),
            params: vec![
                Value::Text(pattern.clone()),
                Value::Text(pattern.clone()),
                Value::Text(pattern),
            ],
        }
    }
}

/// Pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum rows; `None` returns everything
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    /// Every row from the start
    pub fn unbounded() -> Self {
        Self {
            limit: None,
            offset: 0,
        }
    }

    fn clause(&self) -> SqlFragment {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = self.limit.map(i64::from).unwrap_or(-1);
        SqlFragment {
            sql: "LIMIT ? OFFSET ?".to_string(),
            params: vec![Value::Integer(limit), Value::Integer(i64::from(self.offset))],
        }
    }
}

/// Assemble the bookmark SELECT from AND-ed conditions and a page
pub(crate) fn select_bookmarks(conditions: Vec<SqlFragment>, page: &Page) -> SqlFragment {
    let mut sql = format!("SELECT {} FROM bookmarks b", BOOKMARK_COLUMNS);
    let mut params = Vec::new();

    if !conditions.is_empty() {
        let parts: Vec<&str> = conditions.iter().map(|c| c.sql.as_str()).collect();
        sql.push_str(" WHERE ");
        sql.push_str(&parts.join(" AND "));
    }
    for condition in conditions {
        params.extend(condition.params);
    }

    let page = page.clause();
    sql.push_str(" ORDER BY b.created_at DESC, b.id DESC ");
    sql.push_str(&page.sql);
    params.extend(page.params);

    SqlFragment { sql, params }
}
