//! Tag command handlers

use anyhow::{Context, Result};

use bookmark_core::Repository;

use crate::output::Output;

/// List tags with usage counts
pub fn list(repo: &Repository, limit: u32, output: &Output) -> Result<()> {
    let tags = repo
        .list_tags(Some(limit))
        .context("Failed to list tags")?;
    output.print_tags(&tags)
}
