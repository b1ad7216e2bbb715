//! Import and export of Netscape bookmark files
//!
//! `parser` and `writer` deal only in text. The functions here connect them
//! to the repository and the filesystem: importing stores each parsed entry
//! on its own, so one bad entry never aborts the batch; exporting writes the
//! whole file atomically.

pub mod parser;
pub mod writer;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::query::{Page, TagFilter};
use crate::storage::Repository;

pub use parser::{parse, ParsedBookmark, ParsedDocument};
pub use writer::serialize;

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Entries with a usable URL
    pub parsed: usize,
    /// Entries stored
    pub imported: usize,
    /// Anchors dropped while parsing
    pub skipped: usize,
    /// Parsed entries the repository rejected
    pub failed: usize,
    /// One message per failed entry
    pub errors: Vec<String>,
}

/// Import a bookmark file into the repository
///
/// Invalid UTF-8 is replaced rather than rejected; browsers occasionally
/// write mixed encodings into titles.
pub fn import_file(repo: &mut Repository, path: &Path) -> Result<ImportReport> {
    let html = read_bookmark_file(path)?;
    let report = import_str(repo, &html);

    info!(
        path = %path.display(),
        imported = report.imported,
        skipped = report.skipped,
        failed = report.failed,
        "imported bookmark file"
    );
    Ok(report)
}

/// Import bookmark HTML that is already in memory
pub fn import_str(repo: &mut Repository, html: &str) -> ImportReport {
    let document = parse(html);
    let mut report = ImportReport {
        parsed: document.bookmarks.len(),
        skipped: document.skipped,
        ..ImportReport::default()
    };

    for entry in &document.bookmarks {
        match repo.add(&entry.to_new_bookmark()) {
            Ok(_) => report.imported += 1,
            Err(err) => {
                warn!(url = %entry.url, error = %err, "failed to import bookmark");
                report.failed += 1;
                report.errors.push(format!("{}: {}", entry.url, err));
            }
        }
    }

    report
}

/// Render bookmarks matching `tags` (all of them when empty)
///
/// Returns the document and the number of bookmarks in it.
pub fn export_string(repo: &Repository, tags: &TagFilter) -> Result<(String, usize)> {
    let bookmarks = repo.list(tags, Page::unbounded())?;
    Ok((serialize(&bookmarks), bookmarks.len()))
}

/// Export bookmarks matching `tags` to `path`, replacing any existing file
pub fn export_file(repo: &Repository, path: &Path, tags: &TagFilter) -> Result<usize> {
    let (html, count) = export_string(repo, tags)?;
    atomic_write(path, html.as_bytes())?;

    info!(path = %path.display(), count, "exported bookmarks");
    Ok(count)
}

fn read_bookmark_file(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| Error::reading(e, path))?;
    if !metadata.is_file() {
        return Err(Error::ImportParse {
            path: path.to_path_buf(),
            details: "not a regular file".to_string(),
        });
    }

    let bytes = fs::read(path).map_err(|e| Error::reading(e, path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write to a sibling temp file, sync, then rename over `path`
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = temp_path_for(path)?;

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::writing(e, &temp_path));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::writing(e, path)
    })
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let Some(name) = path.file_name() else {
        return Err(Error::WriteError {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        });
    };
    let mut temp_name = name.to_os_string();
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}
