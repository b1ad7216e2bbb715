//! Bookmarks CLI
//!
//! Command-line interface for a personal bookmark catalog.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookmark_core::{Config, Repository};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0  success
  1  storage or unexpected failure
  2  invalid input
  3  bookmark not found
  4  file missing, unreadable, not importable or not writable";

#[derive(Parser)]
#[command(name = "bookmarks")]
#[command(about = "Personal bookmark catalog")]
#[command(version)]
#[command(propagate_version = true)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a bookmark
    Add(AddArgs),
    /// List bookmarks, newest first
    #[command(alias = "ls")]
    List(ListArgs),
    /// Search url, title and description
    Search(SearchArgs),
    /// Show a bookmark
    Show(IdArgs),
    /// Change title, description or tags
    Update(UpdateArgs),
    /// Delete a bookmark
    #[command(alias = "rm")]
    Delete(DeleteArgs),
    /// List tags with usage counts
    Tags(TagsArgs),
    /// Import a Netscape bookmark file (browser export)
    ImportHtml(ImportArgs),
    /// Export bookmarks as a Netscape bookmark file
    ExportHtml(ExportArgs),
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// URL to save
    pub url: String,
    /// Title
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Tag (repeatable)
    #[arg(short, long)]
    pub tag: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only bookmarks carrying every given tag (repeatable)
    #[arg(short, long)]
    pub tag: Vec<String>,
    /// Maximum number of results (default from config)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
    /// Number of results to skip
    #[arg(short, long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for
    pub keyword: String,
    /// Maximum number of results (default from config)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
    /// Number of results to skip
    #[arg(short, long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Args)]
pub struct IdArgs {
    /// Bookmark ID
    pub id: i64,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Bookmark ID
    pub id: i64,
    /// New title (empty to clear)
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// New description (empty to clear)
    #[arg(short, long)]
    pub description: Option<String>,
    /// Replace all tags (repeatable)
    #[arg(short, long, conflicts_with = "clear_tags")]
    pub tag: Vec<String>,
    /// Remove all tags
    #[arg(long)]
    pub clear_tags: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Bookmark ID
    pub id: i64,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct TagsArgs {
    /// Maximum number of tags
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Bookmark file to read
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    /// File to write (replaced if it exists)
    pub path: PathBuf,
    /// Only bookmarks carrying every given tag (repeatable)
    #[arg(short, long)]
    pub tag: Vec<String>,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, database, default_limit, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    // Config commands must work even when the database can't be opened
    let command = match cli.command {
        Commands::Config { command } => return handle_config_command(command, output),
        command => command,
    };

    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config);

    let mut repo = Repository::open(&config)
        .with_context(|| format!("Failed to open database {:?}", config.database_path()))?;

    match command {
        Commands::Add(args) => commands::bookmark::add(&mut repo, args, output),
        Commands::List(args) => commands::bookmark::list(&repo, &config, args, output),
        Commands::Search(args) => commands::bookmark::search(&repo, &config, args, output),
        Commands::Show(args) => commands::bookmark::show(&repo, args.id, output),
        Commands::Update(args) => commands::bookmark::update(&mut repo, args, output),
        Commands::Delete(args) => commands::bookmark::delete(&mut repo, args, output),
        Commands::Tags(args) => commands::tag::list(&repo, args.limit, output),
        Commands::ImportHtml(args) => commands::html::import(&mut repo, args, output),
        Commands::ExportHtml(args) => commands::html::export(&repo, args, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Install a tracing subscriber when BOOKMARKS_LOG is set
///
/// The variable's value is the level (e.g. `debug`). Logs go to
/// `config.log_file` when configured, otherwise to stderr.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("BOOKMARKS_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "bookmark_core={},bookmark_cli={}",
        log_level, log_level
    ));

    match &config.log_file {
        Some(path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                    return;
                }
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_file)
                .try_init();
            info!("Logging initialized to {:?}", path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

/// Find the first core error in the chain
fn core_error(err: &anyhow::Error) -> Option<&bookmark_core::Error> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<bookmark_core::Error>())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    use bookmark_core::Error;

    match core_error(err) {
        Some(Error::Validation(_)) => 2,
        Some(Error::NotFound(_)) => 3,
        Some(
            Error::FileNotFound { .. }
            | Error::PermissionDenied { .. }
            | Error::ReadError { .. }
            | Error::ImportParse { .. }
            | Error::WriteError { .. }
            | Error::DiskFull { .. }
            | Error::CreateDirectory { .. },
        ) => 4,
        Some(Error::Storage(_)) | None => 1,
    }
}

fn report_error(err: &anyhow::Error) {
    use bookmark_core::Error;

    let core = core_error(err);
    match core {
        // The core message says everything for these
        Some(e @ (Error::Validation(_) | Error::NotFound(_))) => eprintln!("Error: {}", e),
        _ => eprintln!("Error: {:#}", err),
    }

    if let Some(hint) = core.and_then(Error::recovery_suggestion) {
        eprintln!("Hint: {}", hint);
    }
}
