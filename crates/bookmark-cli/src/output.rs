//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;
use serde::Serialize;

use bookmark_core::{Bookmark, ImportReport, TagCount};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is meant for a person rather than a script
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print a single bookmark
    pub fn print_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", bookmark.id);
                println!("Title:       {}", bookmark.title.as_deref().unwrap_or("(none)"));
                println!("URL:         {}", bookmark.url);
                if let Some(ref desc) = bookmark.description {
                    println!("Description: {}", desc);
                }
                if !bookmark.tags.is_empty() {
                    println!("Tags:        {}", bookmark.tags.join(", "));
                }
                println!("Created:     {}", bookmark.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:     {}", bookmark.updated_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(bookmark)?,
            OutputFormat::Quiet => {
                println!("{}", bookmark.id);
            }
        }
        Ok(())
    }

    /// Print a list of bookmarks
    pub fn print_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if bookmarks.is_empty() {
                    println!("No bookmarks found.");
                    return Ok(());
                }
                for bookmark in bookmarks {
                    let tags = if bookmark.tags.is_empty() {
                        String::new()
                    } else {
                        format!(" | {}", bookmark.tags.join(", "))
                    };
                    println!(
                        "{:>5} | {} | {}{}",
                        bookmark.id,
                        truncate(bookmark.display_title(), 35),
                        truncate(&bookmark.url, 45),
                        tags
                    );
                }
                println!("\n{} bookmark(s)", bookmarks.len());
            }
            OutputFormat::Json => print_json(bookmarks)?,
            OutputFormat::Quiet => {
                for bookmark in bookmarks {
                    println!("{}", bookmark.id);
                }
            }
        }
        Ok(())
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[TagCount]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return Ok(());
                }
                for tag in tags {
                    println!("{}", tag);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => print_json(tags)?,
            OutputFormat::Quiet => {
                for tag in tags {
                    println!("{}", tag.name);
                }
            }
        }
        Ok(())
    }

    /// Print the outcome of an import
    pub fn print_import_report(&self, report: &ImportReport) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Imported {} bookmark(s), skipped {}, failed {}",
                    report.imported, report.skipped, report.failed
                );
                for error in &report.errors {
                    println!("  ✗ {}", error);
                }
            }
            OutputFormat::Json => print_json(report)?,
            OutputFormat::Quiet => {
                println!("{}", report.imported);
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
