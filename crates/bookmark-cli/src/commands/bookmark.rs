//! Bookmark command handlers

use anyhow::{Context, Result};

use bookmark_core::{BookmarkUpdate, Config, Error, NewBookmark, Page, Repository, TagFilter};

use crate::output::Output;
use crate::prompt::confirm;
use crate::{AddArgs, DeleteArgs, ListArgs, SearchArgs, UpdateArgs};

/// Add a bookmark
pub fn add(repo: &mut Repository, args: AddArgs, output: &Output) -> Result<()> {
    let new = NewBookmark {
        title: args.title,
        description: args.description,
        ..NewBookmark::new(args.url).with_tags(args.tag)
    };

    let bookmark = repo.add(&new).context("Failed to add bookmark")?;

    if output.is_human() {
        output.success(&format!("Added bookmark {}", bookmark.id));
    }
    output.print_bookmark(&bookmark)
}

/// List bookmarks, optionally restricted to those carrying every given tag
pub fn list(repo: &Repository, config: &Config, args: ListArgs, output: &Output) -> Result<()> {
    let filter = TagFilter::new(&args.tag)?;
    let bookmarks = repo
        .list(&filter, page(config, args.limit, args.offset))
        .context("Failed to list bookmarks")?;

    output.print_bookmarks(&bookmarks)?;

    if output.is_human() && filter.is_empty() && !bookmarks.is_empty() {
        let total = repo.count().context("Failed to count bookmarks")?;
        if total > bookmarks.len() {
            output.message(&format!(
                "{} stored in total; use --limit and --offset to page",
                total
            ));
        }
    }
    Ok(())
}

/// Search bookmarks by keyword
pub fn search(repo: &Repository, config: &Config, args: SearchArgs, output: &Output) -> Result<()> {
    let bookmarks = repo
        .search(&args.keyword, page(config, args.limit, args.offset))
        .with_context(|| format!("Failed to search for '{}'", args.keyword))?;

    output.print_bookmarks(&bookmarks)
}

/// Show a single bookmark
pub fn show(repo: &Repository, id: i64, output: &Output) -> Result<()> {
    let bookmark = repo
        .get(id)
        .with_context(|| format!("Failed to load bookmark {}", id))?;

    output.print_bookmark(&bookmark)
}

/// Update title, description or tags
pub fn update(repo: &mut Repository, args: UpdateArgs, output: &Output) -> Result<()> {
    let tags = if args.clear_tags {
        Some(Vec::new())
    } else if args.tag.is_empty() {
        None
    } else {
        Some(args.tag)
    };

    let changes = BookmarkUpdate {
        title: args.title,
        description: args.description,
        tags,
    };
    if changes.is_empty() {
        return Err(Error::validation(
            "nothing to update: pass --title, --description, --tag or --clear-tags",
        )
        .into());
    }

    let bookmark = repo
        .update(args.id, &changes)
        .with_context(|| format!("Failed to update bookmark {}", args.id))?;

    if output.is_human() {
        output.success(&format!("Updated bookmark {}", bookmark.id));
    }
    output.print_bookmark(&bookmark)
}

/// Delete a bookmark, asking first unless `--yes` was given
pub fn delete(repo: &mut Repository, args: DeleteArgs, output: &Output) -> Result<()> {
    let bookmark = repo
        .get(args.id)
        .with_context(|| format!("Failed to load bookmark {}", args.id))?;

    if !args.yes {
        if output.is_human() {
            println!("Delete bookmark: {} - {}", bookmark.id, bookmark.display_title());
        }
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    if !repo.delete(args.id).context("Failed to delete bookmark")? {
        return Err(Error::NotFound(args.id).into());
    }

    output.success(&format!("Deleted bookmark {}", args.id));
    Ok(())
}

fn page(config: &Config, limit: Option<u32>, offset: u32) -> Page {
    Page::new(limit.unwrap_or(config.default_limit), offset)
}
