//! Netscape bookmark file writer
//!
//! Output is a single flat list. Tags travel in the `TAGS` attribute rather
//! than as folders, so a file written here reads back with the same tags.

use crate::models::Bookmark;

const HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
";

const FOOTER: &str = "</DL><p>\n";

/// Render bookmarks as a Netscape bookmark file, in the given order
pub fn serialize(bookmarks: &[Bookmark]) -> String {
    let mut out = String::from(HEADER);
    for bookmark in bookmarks {
        write_entry(&mut out, bookmark);
    }
    out.push_str(FOOTER);
    out
}

fn write_entry(out: &mut String, bookmark: &Bookmark) {
    out.push_str(&format!(
        "    <DT><A HREF=\"{}\" ADD_DATE=\"{}\" LAST_MODIFIED=\"{}\"",
        escape(&bookmark.url),
        bookmark.created_at.timestamp(),
        bookmark.updated_at.timestamp()
    ));
    if !bookmark.tags.is_empty() {
        out.push_str(&format!(" TAGS=\"{}\"", escape(&bookmark.tags.join(","))));
    }
    out.push_str(&format!(
        ">{}</A>\n",
        escape(bookmark.title.as_deref().unwrap_or(""))
    ));

    if let Some(description) = &bookmark.description {
        out.push_str(&format!("    <DD>{}\n", escape(description)));
    }
}

/// Escape text for use in element content and double-quoted attributes
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
