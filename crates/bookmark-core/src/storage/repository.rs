//! Bookmark repository
//!
//! Translates bookmark operations into SQL against the schema in
//! `storage::schema`. Every multi-row mutation (add with tags, update that
//! replaces tags) runs inside a single transaction; returning early with an
//! error drops the `Transaction` uncommitted, which rolls it back.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    normalize_description, normalize_tags, normalize_title, normalize_url, Bookmark,
    BookmarkUpdate, NewBookmark, TagCount,
};
use crate::query::{select_bookmarks, KeywordFilter, Page, SqlFragment, TagFilter, BOOKMARK_COLUMNS};
use crate::storage::schema::{init_schema, needs_init};

/// SQLite-backed bookmark repository
pub struct Repository {
    conn: Connection,
}

impl Repository {
    /// Open or create the database configured in `config`
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_path(&config.database_path())
    }

    /// Open or create the database at `path`
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened database");
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if needs_init(&conn) {
            init_schema(&conn)?;
            debug!("initialized database schema");
        }

        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    // ==================== Writes ====================

    /// Insert a bookmark and its tags
    ///
    /// Tags are looked up by name and created when absent, in the same
    /// transaction as the bookmark row. If any step fails nothing persists.
    pub fn add(&mut self, new: &NewBookmark) -> Result<Bookmark> {
        let url = normalize_url(&new.url)?;
        let tags = normalize_tags(&new.tags)?;
        let now = Utc::now();
        let created_at = new.created_at.unwrap_or(now);
        let updated_at = now.max(created_at);

        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO bookmarks (url, title, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                url,
                normalize_title(new.title.as_deref()),
                normalize_description(new.description.as_deref()),
                created_at.timestamp_millis(),
                updated_at.timestamp_millis(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        attach_tags(&tx, id, &tags)?;

        let bookmark = load_bookmark(&tx, id)?;
        tx.commit()?;

        debug!(id, url = %bookmark.url, tags = bookmark.tags.len(), "added bookmark");
        Ok(bookmark)
    }

    /// Apply a partial update
    ///
    /// Fields left as `None` in `changes` are untouched. A supplied tag list
    /// replaces the whole tag set. `updated_at` is always bumped.
    pub fn update(&mut self, id: i64, changes: &BookmarkUpdate) -> Result<Bookmark> {
        let tags = changes
            .tags
            .as_ref()
            .map(|tags| normalize_tags(tags.iter()))
            .transpose()?;

        let tx = self.conn.transaction()?;

        let exists = tx
            .query_row("SELECT 1 FROM bookmarks WHERE id = ?", [id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(Error::NotFound(id));
        }

        if let Some(title) = &changes.title {
            tx.execute(
                "UPDATE bookmarks SET title = ? WHERE id = ?",
                params![normalize_title(Some(title)), id],
            )?;
        }

        if let Some(description) = &changes.description {
            tx.execute(
                "UPDATE bookmarks SET description = ? WHERE id = ?",
                params![normalize_description(Some(description)), id],
            )?;
        }

        if let Some(tags) = &tags {
            tx.execute("DELETE FROM bookmark_tags WHERE bookmark_id = ?", [id])?;
            attach_tags(&tx, id, tags)?;
        }

        tx.execute(
            "UPDATE bookmarks SET updated_at = MAX(?, created_at) WHERE id = ?",
            params![Utc::now().timestamp_millis(), id],
        )?;

        let bookmark = load_bookmark(&tx, id)?;
        tx.commit()?;

        debug!(id, replaced_tags = tags.is_some(), "updated bookmark");
        Ok(bookmark)
    }

    /// Delete a bookmark and its tag associations
    ///
    /// Returns `false` when no bookmark had that ID. Tag rows are kept.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?", [id])?;
        debug!(id, deleted, "deleted bookmark");
        Ok(deleted > 0)
    }

    // ==================== Queries ====================

    /// Get a bookmark by ID
    pub fn get(&self, id: i64) -> Result<Bookmark> {
        load_bookmark(&self.conn, id)
    }

    /// List bookmarks, newest first
    ///
    /// A non-empty `tags` filter keeps only bookmarks carrying every tag in it.
    pub fn list(&self, tags: &TagFilter, page: Page) -> Result<Vec<Bookmark>> {
        let conditions = tags.clause().into_iter().collect();
        self.query_bookmarks(select_bookmarks(conditions, &page))
    }

    /// Case-insensitive substring search over url, title and description
    pub fn search(&self, keyword: &str, page: Page) -> Result<Vec<Bookmark>> {
        let keyword = KeywordFilter::new(keyword)?;
        self.query_bookmarks(select_bookmarks(vec![keyword.clause()], &page))
    }

    /// Tags with usage counts, most used first, then by name
    ///
    /// Tags no longer attached to any bookmark are included with a count of 0.
    pub fn list_tags(&self, limit: Option<u32>) -> Result<Vec<TagCount>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.name, COUNT(DISTINCT bt.bookmark_id) AS count
            FROM tags t
            LEFT JOIN bookmark_tags bt ON t.id = bt.tag_id
            GROUP BY t.id
            ORDER BY count DESC, t.name ASC
            LIMIT ?
            "#,
        )?;

        let limit = limit.map(i64::from).unwrap_or(-1);
        let tags = stmt
            .query_map([limit], |row| {
                let count: i64 = row.get(1)?;
                Ok(TagCount {
                    name: row.get(0)?,
                    count: count.max(0) as u64,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Number of stored bookmarks
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    fn query_bookmarks(&self, query: SqlFragment) -> Result<Vec<Bookmark>> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), BookmarkRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|row| hydrate_bookmark(&self.conn, row))
            .collect()
    }
}

// ==================== Internal structs ====================

struct BookmarkRow {
    id: i64,
    url: String,
    title: Option<String>,
    description: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl BookmarkRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

// ==================== Helpers ====================

fn load_bookmark(conn: &Connection, id: i64) -> Result<Bookmark> {
    let sql = format!("SELECT {} FROM bookmarks b WHERE b.id = ?", BOOKMARK_COLUMNS);
    let row = conn
        .query_row(&sql, [id], BookmarkRow::from_row)
        .optional()?
        .ok_or(Error::NotFound(id))?;
    hydrate_bookmark(conn, row)
}

/// Attach resolved tag names to a bookmark row
fn hydrate_bookmark(conn: &Connection, row: BookmarkRow) -> Result<Bookmark> {
    let tags = tags_for_bookmark(conn, row.id)?;

    Ok(Bookmark {
        id: row.id,
        url: row.url,
        title: row.title,
        description: row.description,
        tags,
        created_at: from_millis(row.created_at),
        updated_at: from_millis(row.updated_at),
    })
}

fn tags_for_bookmark(conn: &Connection, bookmark_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT t.name FROM tags t
        JOIN bookmark_tags bt ON t.id = bt.tag_id
        WHERE bt.bookmark_id = ?
        ORDER BY t.name
        "#,
    )?;

    let tags = stmt
        .query_map([bookmark_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(tags)
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

/// Associate already-normalized tags with a bookmark
fn attach_tags(tx: &Transaction, bookmark_id: i64, tags: &[String]) -> Result<()> {
    for tag in tags {
        let tag_id = get_or_create_tag(tx, tag)?;
        tx.execute(
            "INSERT INTO bookmark_tags (bookmark_id, tag_id) VALUES (?, ?)",
            params![bookmark_id, tag_id],
        )?;
    }
    Ok(())
}

/// Get or create a tag, returning its ID
fn get_or_create_tag(tx: &Transaction, name: &str) -> Result<i64> {
    let existing: Option<i64> = tx
        .query_row("SELECT id FROM tags WHERE name = ?", [name], |row| row.get(0))
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    tx.execute("INSERT INTO tags (name) VALUES (?)", [name])?;
    let id = tx.last_insert_rowid();
    debug!(tag = name, id, "created tag");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_TAGS_PER_BOOKMARK;
    use chrono::TimeZone;

    fn repo() -> Repository {
        Repository::open_in_memory().unwrap()
    }

    fn add(repo: &mut Repository, url: &str, tags: &[&str]) -> Bookmark {
        repo.add(&NewBookmark::new(url).with_tags(tags.iter().copied()))
            .unwrap()
    }

    fn urls(bookmarks: &[Bookmark]) -> Vec<&str> {
        bookmarks.iter().map(|b| b.url.as_str()).collect()
    }

    fn tag_row_count(repo: &Repository) -> i64 {
        repo.connection()
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .unwrap()
    }

    /// Make any insert of the tag "boom" fail inside SQLite
    fn install_failing_tag(repo: &Repository) {
        repo.connection()
            .execute_batch(
                r#"
                CREATE TRIGGER fail_boom BEFORE INSERT ON tags
                WHEN NEW.name = 'boom'
                BEGIN
                    SELECT RAISE(ABORT, 'boom');
                END;
                "#,
            )
            .unwrap();
    }

    #[test]
    fn test_add_and_get() {
        let mut repo = repo();
        let added = repo
            .add(
                &NewBookmark::new("https://a.com")
                    .with_title("A")
                    .with_tags(["x", "y"]),
            )
            .unwrap();

        let found = repo.get(added.id).unwrap();
        assert_eq!(found.url, "https://a.com");
        assert_eq!(found.title.as_deref(), Some("A"));
        assert_eq!(found.tags, vec!["x", "y"]);
        assert_eq!(found.created_at, found.updated_at);

        assert!(repo.delete(added.id).unwrap());
        assert!(matches!(repo.get(added.id), Err(Error::NotFound(id)) if id == added.id));
    }

    #[test]
    fn test_add_rejects_empty_url() {
        let mut repo = repo();
        let err = repo.add(&NewBookmark::new("   ")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_add_canonicalizes_url() {
        let mut repo = repo();
        let bookmark = add(&mut repo, "Example.COM/", &[]);
        assert_eq!(bookmark.url, "https://example.com");
        assert_eq!(repo.get(bookmark.id).unwrap().url, "https://example.com");
    }

    #[test]
    fn test_add_rejects_disallowed_urls() {
        let mut repo = repo();
        for url in ["javascript:void(0)", "place:sort=8", "https://"] {
            let err = repo.add(&NewBookmark::new(url)).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{url} accepted");
        }
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_add_rejects_too_many_tags() {
        let mut repo = repo();
        let tags: Vec<String> = (0..=MAX_TAGS_PER_BOOKMARK).map(|i| format!("tag{i}")).collect();

        let err = repo
            .add(&NewBookmark::new("https://a.com").with_tags(tags))
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(repo.count().unwrap(), 0);
        assert_eq!(tag_row_count(&repo), 0);
    }

    #[test]
    fn test_add_squeezes_title_whitespace() {
        let mut repo = repo();
        let bookmark = repo
            .add(
                &NewBookmark::new("https://a.com")
                    .with_title("  A \n  B ")
                    .with_tags(["web  dev"]),
            )
            .unwrap();
        assert_eq!(bookmark.title.as_deref(), Some("A B"));
        assert_eq!(bookmark.tags, vec!["web dev"]);
    }

    #[test]
    fn test_add_allows_duplicate_urls() {
        let mut repo = repo();
        let first = add(&mut repo, "https://dup.com", &[]);
        let second = add(&mut repo, "https://dup.com", &[]);
        assert_ne!(first.id, second.id);
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_add_blank_title_is_none() {
        let mut repo = repo();
        let bookmark = repo
            .add(&NewBookmark::new("https://a.com").with_title("  "))
            .unwrap();
        assert!(bookmark.title.is_none());
        assert!(bookmark.description.is_none());
    }

    #[test]
    fn test_add_is_atomic_when_tag_insert_fails() {
        let mut repo = repo();
        install_failing_tag(&repo);

        let err = repo
            .add(&NewBookmark::new("https://a.com").with_tags(["alpha", "boom"]))
            .unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(repo.count().unwrap(), 0);
        assert_eq!(tag_row_count(&repo), 0);
    }

    #[test]
    fn test_add_with_explicit_created_at() {
        let mut repo = repo();
        let created = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let bookmark = repo
            .add(&NewBookmark::new("https://old.com").with_created_at(created))
            .unwrap();

        assert_eq!(bookmark.created_at, created);
        assert!(bookmark.updated_at > created);
    }

    #[test]
    fn test_tags_shared_case_insensitively() {
        let mut repo = repo();
        let a = add(&mut repo, "https://a.com", &["Python"]);
        let b = add(&mut repo, "https://b.com", &["python"]);

        assert_eq!(a.tags, vec!["python"]);
        assert_eq!(b.tags, vec!["python"]);
        assert_eq!(tag_row_count(&repo), 1);
    }

    #[test]
    fn test_duplicate_tags_in_one_add_collapse() {
        let mut repo = repo();
        let bookmark = add(&mut repo, "https://a.com", &["Docs", "docs", " DOCS "]);
        assert_eq!(bookmark.tags, vec!["docs"]);
    }

    #[test]
    fn test_list_newest_first_with_id_tie_break() {
        let mut repo = repo();
        let same = Utc.with_ymd_and_hms(2022, 5, 1, 12, 0, 0).unwrap();
        let older = Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap();

        repo.add(&NewBookmark::new("https://first.com").with_created_at(same))
            .unwrap();
        repo.add(&NewBookmark::new("https://second.com").with_created_at(same))
            .unwrap();
        repo.add(&NewBookmark::new("https://oldest.com").with_created_at(older))
            .unwrap();

        let all = repo.list(&TagFilter::none(), Page::default()).unwrap();
        assert_eq!(
            urls(&all),
            vec!["https://second.com", "https://first.com", "https://oldest.com"]
        );
    }

    #[test]
    fn test_list_tag_filter_is_superset_match() {
        let mut repo = repo();
        add(&mut repo, "https://all.com", &["python", "docs", "web"]);
        add(&mut repo, "https://python-only.com", &["python"]);
        add(&mut repo, "https://docs-only.com", &["docs"]);
        add(&mut repo, "https://both.com", &["docs", "python"]);

        let filter = TagFilter::new(["python", "docs"]).unwrap();
        let found = repo.list(&filter, Page::default()).unwrap();

        assert_eq!(urls(&found), vec!["https://both.com", "https://all.com"]);
        for bookmark in &found {
            assert!(bookmark.has_tag("python") && bookmark.has_tag("docs"));
        }
    }

    #[test]
    fn test_list_filter_is_case_insensitive() {
        let mut repo = repo();
        add(&mut repo, "https://a.com", &["rust"]);

        let filter = TagFilter::new(["RUST"]).unwrap();
        assert_eq!(repo.list(&filter, Page::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_list_unknown_tag_returns_nothing() {
        let mut repo = repo();
        add(&mut repo, "https://a.com", &["rust"]);

        let filter = TagFilter::new(["rust", "missing"]).unwrap();
        assert!(repo.list(&filter, Page::default()).unwrap().is_empty());
    }

    #[test]
    fn test_list_pagination() {
        let mut repo = repo();
        for i in 0..5 {
            add(&mut repo, &format!("https://{}.com", i), &[]);
        }

        let first = repo.list(&TagFilter::none(), Page::new(2, 0)).unwrap();
        let second = repo.list(&TagFilter::none(), Page::new(2, 2)).unwrap();
        let rest = repo.list(&TagFilter::none(), Page::new(2, 4)).unwrap();
        let all = repo.list(&TagFilter::none(), Page::unbounded()).unwrap();

        assert_eq!(urls(&first), vec!["https://4.com", "https://3.com"]);
        assert_eq!(urls(&second), vec!["https://2.com", "https://1.com"]);
        assert_eq!(urls(&rest), vec!["https://0.com"]);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_list_default_limit_is_fifty() {
        let mut repo = repo();
        for i in 0..55 {
            add(&mut repo, &format!("https://{}.example", i), &[]);
        }
        assert_eq!(repo.list(&TagFilter::none(), Page::default()).unwrap().len(), 50);
    }

    #[test]
    fn test_search_matches_any_field_case_insensitively() {
        let mut repo = repo();
        repo.add(&NewBookmark::new("https://rust-lang.org").with_title("Rust"))
            .unwrap();
        repo.add(&NewBookmark::new("https://example.com").with_title("Example Site"))
            .unwrap();
        repo.add(
            &NewBookmark::new("https://blog.dev")
                .with_title("Blog")
                .with_description("Notes on RUSTACEAN life"),
        )
        .unwrap();

        let found = repo.search("rust", Page::default()).unwrap();
        assert_eq!(urls(&found), vec!["https://blog.dev", "https://rust-lang.org"]);

        let found = repo.search("EXAMPLE", Page::default()).unwrap();
        assert_eq!(urls(&found), vec!["https://example.com"]);

        assert!(repo.search("nothing-here", Page::default()).unwrap().is_empty());
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let mut repo = repo();
        repo.add(&NewBookmark::new("https://a.com").with_title("100% done"))
            .unwrap();
        repo.add(&NewBookmark::new("https://b.com").with_title("100 things"))
            .unwrap();

        let found = repo.search("100%", Page::default()).unwrap();
        assert_eq!(urls(&found), vec!["https://a.com"]);

        assert!(repo.search("a_com", Page::default()).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_empty_keyword() {
        let repo = repo();
        assert!(matches!(
            repo.search(" ", Page::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_update_partial_fields() {
        let mut repo = repo();
        let original = repo
            .add(
                &NewBookmark::new("https://a.com")
                    .with_title("Old")
                    .with_description("Keep me")
                    .with_tags(["a", "b"]),
            )
            .unwrap();

        let updated = repo
            .update(
                original.id,
                &BookmarkUpdate {
                    title: Some("New".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title.as_deref(), Some("New"));
        assert_eq!(updated.description.as_deref(), Some("Keep me"));
        assert_eq!(updated.tags, vec!["a", "b"]);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);
    }

    #[test]
    fn test_update_replaces_and_clears_tags() {
        let mut repo = repo();
        let bookmark = add(&mut repo, "https://a.com", &["a", "b"]);

        let replaced = repo
            .update(
                bookmark.id,
                &BookmarkUpdate {
                    tags: Some(vec!["C".to_string(), "a".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(replaced.tags, vec!["a", "c"]);

        let cleared = repo
            .update(
                bookmark.id,
                &BookmarkUpdate {
                    tags: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(cleared.tags.is_empty());

        // "b" is no longer used but stays in the vocabulary
        let tags = repo.list_tags(None).unwrap();
        assert!(tags.iter().any(|t| t.name == "b" && t.count == 0));
    }

    #[test]
    fn test_update_empty_text_clears_field() {
        let mut repo = repo();
        let bookmark = repo
            .add(
                &NewBookmark::new("https://a.com")
                    .with_title("Title")
                    .with_description("Desc"),
            )
            .unwrap();

        let updated = repo
            .update(
                bookmark.id,
                &BookmarkUpdate {
                    description: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title.as_deref(), Some("Title"));
        assert!(updated.description.is_none());
    }

    #[test]
    fn test_update_missing_bookmark() {
        let mut repo = repo();
        let err = repo
            .update(
                99,
                &BookmarkUpdate {
                    title: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(99)));
    }

    #[test]
    fn test_update_is_atomic_when_tag_insert_fails() {
        let mut repo = repo();
        let bookmark = repo
            .add(
                &NewBookmark::new("https://a.com")
                    .with_title("Before")
                    .with_tags(["keep"]),
            )
            .unwrap();
        install_failing_tag(&repo);

        let result = repo.update(
            bookmark.id,
            &BookmarkUpdate {
                title: Some("After".to_string()),
                tags: Some(vec!["boom".to_string()]),
                ..Default::default()
            },
        );
        assert!(result.is_err());

        let unchanged = repo.get(bookmark.id).unwrap();
        assert_eq!(unchanged.title.as_deref(), Some("Before"));
        assert_eq!(unchanged.tags, vec!["keep"]);
        assert_eq!(unchanged.updated_at, bookmark.updated_at);
    }

    #[test]
    fn test_created_at_stable_across_updates() {
        let mut repo = repo();
        let bookmark = add(&mut repo, "https://a.com", &["x"]);

        for i in 0..3 {
            let updated = repo
                .update(
                    bookmark.id,
                    &BookmarkUpdate {
                        title: Some(format!("Title {}", i)),
                        tags: Some(vec![format!("t{}", i)]),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(updated.created_at, bookmark.created_at);
        }
    }

    #[test]
    fn test_delete_keeps_shared_tags() {
        let mut repo = repo();
        let a = add(&mut repo, "https://a.com", &["shared", "solo"]);
        let b = add(&mut repo, "https://b.com", &["shared"]);

        assert!(repo.delete(a.id).unwrap());
        assert!(!repo.delete(a.id).unwrap());

        let associations: i64 = repo
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM bookmark_tags WHERE bookmark_id = ?",
                [a.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(associations, 0);
        assert_eq!(tag_row_count(&repo), 2);
        assert_eq!(repo.get(b.id).unwrap().tags, vec!["shared"]);
    }

    #[test]
    fn test_delete_missing_returns_false() {
        let mut repo = repo();
        assert!(!repo.delete(12345).unwrap());
    }

    #[test]
    fn test_list_tags_ordering() {
        let mut repo = repo();
        add(&mut repo, "https://1.com", &["python", "docs"]);
        add(&mut repo, "https://2.com", &["python"]);
        add(&mut repo, "https://3.com", &["python"]);

        let tags = repo.list_tags(None).unwrap();
        assert_eq!(
            tags,
            vec![
                TagCount {
                    name: "python".to_string(),
                    count: 3
                },
                TagCount {
                    name: "docs".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_list_tags_ties_by_name_and_limit() {
        let mut repo = repo();
        add(&mut repo, "https://1.com", &["zeta", "alpha", "mid"]);
        add(&mut repo, "https://2.com", &["mid"]);

        let tags = repo.list_tags(Some(2)).unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["mid", "alpha"]);
    }

    #[test]
    fn test_open_path_creates_parent_directories() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("bookmarks.db");

        {
            let mut repo = Repository::open_path(&path).unwrap();
            add(&mut repo, "https://persisted.com", &["kept"]);
        }

        let repo = Repository::open_path(&path).unwrap();
        let all = repo.list(&TagFilter::none(), Page::default()).unwrap();
        assert_eq!(urls(&all), vec!["https://persisted.com"]);
        assert_eq!(all[0].tags, vec!["kept"]);
    }
}
