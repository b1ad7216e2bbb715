//! Bookmark file import/export handlers

use anyhow::{Context, Result};

use bookmark_core::{html, Repository, TagFilter};

use crate::output::Output;
use crate::{ExportArgs, ImportArgs};

/// Import a Netscape bookmark file
pub fn import(repo: &mut Repository, args: ImportArgs, output: &Output) -> Result<()> {
    let report = html::import_file(repo, &args.path)
        .with_context(|| format!("Failed to import {:?}", args.path))?;

    output.print_import_report(&report)
}

/// Export bookmarks to a Netscape bookmark file
pub fn export(repo: &Repository, args: ExportArgs, output: &Output) -> Result<()> {
    let filter = TagFilter::new(&args.tag)?;
    let count = html::export_file(repo, &args.path, &filter)
        .with_context(|| format!("Failed to export to {:?}", args.path))?;

    output.success(&format!(
        "Exported {} bookmark(s) to {}",
        count,
        args.path.display()
    ));
    Ok(())
}
