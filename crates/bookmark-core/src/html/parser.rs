//! Netscape bookmark file parser
//!
//! Browser exports nest folders as `<DT><H3>Name</H3><DL>...</DL>`, with one
//! `<DT><A HREF=...>Title</A>` per bookmark and an optional `<DD>` holding
//! its description. The parser walks the DOM once, keeping a stack of
//! enclosing folder names; every folder on the stack becomes a tag of the
//! bookmarks beneath it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::models::{collapse_whitespace, normalize_tag, NewBookmark, MAX_TAG_LENGTH};

/// A bookmark read from an HTML file, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBookmark {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Folder-derived and `TAGS` attribute tags, normalized and sorted
    pub tags: Vec<String>,
    /// From `ADD_DATE`; `None` when absent or unparsable
    pub created_at: Option<DateTime<Utc>>,
}

impl ParsedBookmark {
    /// Convert into an insert request for the repository
    pub fn to_new_bookmark(&self) -> NewBookmark {
        NewBookmark {
            url: self.url.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
        }
    }
}

/// Result of parsing a bookmark file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub bookmarks: Vec<ParsedBookmark>,
    /// Anchors dropped for a missing or unusable `HREF`
    pub skipped: usize,
}

/// Parse a Netscape bookmark file
///
/// Never fails: malformed anchors are counted in `skipped` and the rest of
/// the document is still read.
pub fn parse(html: &str) -> ParsedDocument {
    let document = Html::parse_document(html);
    let mut walker = Walker::default();
    walker.walk(document.root_element());

    debug!(
        parsed = walker.document.bookmarks.len(),
        skipped = walker.document.skipped,
        "parsed bookmark file"
    );
    walker.document
}

#[derive(Default)]
struct Walker {
    /// Normalized names of the folders enclosing the current node
    folders: Vec<String>,
    /// Index of the bookmark a following `<DD>` describes
    last_bookmark: Option<usize>,
    document: ParsedDocument,
}

impl Walker {
    /// Visit the children of `node`
    ///
    /// Returns a folder name announced by an `<H3>` whose `<DL>` has not
    /// been seen yet, so the caller can apply it to a sibling `<DL>`.
    fn walk(&mut self, node: ElementRef<'_>) -> Option<String> {
        self.walk_with(node, None)
    }

    /// Like [`Walker::walk`], with a folder name still waiting for its `<DL>`
    fn walk_with(
        &mut self,
        node: ElementRef<'_>,
        mut pending: Option<String>,
    ) -> Option<String> {

        for child in node.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "h3" => {
                    pending = Some(collapse_whitespace(&child.text().collect::<String>()));
                    self.last_bookmark = None;
                }
                "dl" => {
                    let folder = pending.take().and_then(|name| folder_tag(&name));
                    let pushed = folder.is_some();
                    if let Some(tag) = folder {
                        self.folders.push(tag);
                    }
                    self.walk(child);
                    if pushed {
                        self.folders.pop();
                    }
                    self.last_bookmark = None;
                }
                "a" => self.visit_anchor(child),
                "dd" => {
                    self.visit_description(child);
                    // A folder's own <DD> swallows the <DL> that follows it
                    pending = self.walk_with(child, pending.take());
                }
                "dt" => pending = self.walk(child),
                _ => {
                    if let Some(name) = self.walk(child) {
                        pending = Some(name);
                    }
                }
            }
        }

        pending
    }

    fn visit_anchor(&mut self, anchor: ElementRef<'_>) {
        let element = anchor.value();

        let Some(url) = element.attr("href").map(str::trim).filter(|u| is_bookmark_url(u)) else {
            debug!(href = ?element.attr("href"), "skipping anchor without usable href");
            self.document.skipped += 1;
            self.last_bookmark = None;
            return;
        };

        let title = collapse_whitespace(&anchor.text().collect::<String>());

        let mut tags: BTreeSet<String> = self.folders.iter().cloned().collect();
        if let Some(attr) = element.attr("tags") {
            tags.extend(attr.split(',').filter_map(folder_tag));
        }

        let created_at = element
            .attr("add_date")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        self.document.bookmarks.push(ParsedBookmark {
            url: url.to_string(),
            title: (!title.is_empty()).then_some(title),
            description: None,
            tags: tags.into_iter().collect(),
            created_at,
        });
        self.last_bookmark = Some(self.document.bookmarks.len() - 1);
    }

    fn visit_description(&mut self, dd: ElementRef<'_>) {
        let Some(index) = self.last_bookmark.take() else {
            return;
        };

        // Only the DD's own text; a nested list is not part of the description
        let text: String = dd
            .children()
            .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
            .collect();
        let text = text.trim();

        if !text.is_empty() {
            self.document.bookmarks[index].description = Some(text.to_string());
        }
    }
}

/// Reject empty hrefs and browser-internal pseudo URLs
fn is_bookmark_url(href: &str) -> bool {
    if href.is_empty() {
        return false;
    }
    let lower = href.to_ascii_lowercase();
    !(lower.starts_with("javascript:") || lower.starts_with("place:"))
}

/// Turn a folder name or `TAGS` entry into a tag, if anything is left
fn folder_tag(name: &str) -> Option<String> {
    let cleaned = collapse_whitespace(&name.replace(',', " ")).to_lowercase();
    let truncated: String = cleaned.chars().take(MAX_TAG_LENGTH).collect();
    normalize_tag(&truncated).ok()
}
