//! Main CLI application structure

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use super::editor::Editor;
use super::output::{Output, OutputFormat};
use super::{commands, interactive};
use crate::domain::RuleDescriptor;
use crate::storage::{Config, Workspace};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "CRUMB_CONFIG";

#[derive(Parser)]
#[command(name = "crumb")]
#[command(author, version, about = "Leave a trail of notes and tasks in plain-text files next to your work")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ~/.crumbrc.toml)
    #[arg(long, global = true, env = "CRUMB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Add a filter, e.g. `isMarked` or `is=x,w`
    #[arg(long = "filter", global = true, value_name = "NAME[=ARGS]")]
    pub filters: Vec<RuleDescriptor>,

    /// Add a sort pass, e.g. `sortMarkedOrder=w,x`
    #[arg(long = "sort", global = true, value_name = "NAME[=ARGS]")]
    pub sorts: Vec<RuleDescriptor>,

    /// Drop the configured filters
    #[arg(long, global = true)]
    pub no_filter: bool,

    /// Drop the configured sorts
    #[arg(long, global = true)]
    pub no_sort: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the crumbs of a directory
    Ls {
        /// Directory (defaults to the current one)
        dir: Option<PathBuf>,
    },

    /// List crumbs from a directory and its parents
    Ba {
        /// Directory (defaults to the current one)
        dir: Option<PathBuf>,
    },

    /// List crumbs from a directory and its subdirectories
    Wa {
        /// Directory (defaults to the current one)
        dir: Option<PathBuf>,
    },

    /// Add a crumb: [DIR] TEXT... (no text opens the editor)
    Ad {
        #[arg(num_args = 1.., trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Edit crumbs: [DIR] SELECTION [TEXT...] (no text opens the editor)
    Ed {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Mark crumbs: [DIR] MARKER SELECTION...
    Ma {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Unmark crumbs: [DIR] SELECTION...
    Um {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Remove crumbs: [DIR] SELECTION...
    Rm {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Interactive session
    I {
        /// Directory (defaults to the current one)
        dir: Option<PathBuf>,
    },
}

/// Finds the configuration path before argument parsing, so aliases can
/// be expanded
fn config_path(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }

    std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn names(descs: &[RuleDescriptor]) -> Vec<String> {
    descs.iter().map(|d| d.to_string()).collect()
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args_os()
        .map(OsString::into_string)
        .collect::<Result<_, _>>()
        .map_err(|arg| anyhow::anyhow!("Argument is not valid UTF-8: {:?}", arg))?;

    let config = Config::load(config_path(&args).as_deref())?;
    let cli = Cli::parse_from(config.expand_aliases(args));
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("crumb starting");

    let mut ws = Workspace::new(config)?;
    for desc in ws.unknown_rules() {
        output.verbose_ctx("config", &format!("Skipping unknown rule '{}'", desc));
    }

    if cli.no_filter {
        ws.clear_filters();
    }
    if cli.no_sort {
        ws.clear_sorts();
    }
    for desc in cli.filters {
        ws.push_filter(desc).context("Invalid --filter")?;
    }
    for desc in cli.sorts {
        ws.push_sort(desc).context("Invalid --sort")?;
    }

    output.verbose_ctx(
        "rules",
        &format!("filters: {:?}, sorts: {:?}", names(ws.filters()), names(ws.sorts())),
    );

    let editor = Editor::resolve(ws.config().editor.as_deref());

    match cli.command {
        Commands::Ls { dir } => commands::ls(&ws, &output, &commands::target_dir(dir.as_deref())?)?,
        Commands::Ba { dir } => commands::ba(&ws, &output, &commands::target_dir(dir.as_deref())?)?,
        Commands::Wa { dir } => commands::wa(&ws, &output, &commands::target_dir(dir.as_deref())?)?,

        Commands::Ad { args } => {
            let (dir, words) = commands::split_dir(args)?;
            commands::ad(&ws, &output, &editor, &dir, &words.join(" "))?
        }

        Commands::Ed { args } => {
            let (dir, words) = commands::split_dir(args)?;
            let Some((selection, text)) = words.split_first() else {
                bail!("Missing selection");
            };
            commands::ed(&ws, &output, &editor, &dir, selection, &text.join(" "))?
        }

        Commands::Ma { args } => {
            let (dir, words) = commands::split_dir(args)?;
            let Some((marker, selection)) = words.split_first() else {
                bail!("Missing marker");
            };
            if selection.is_empty() {
                bail!("Missing selection");
            }
            commands::ma(&ws, &output, &dir, marker, &selection.join(" "))?
        }

        Commands::Um { args } => {
            let (dir, words) = commands::split_dir(args)?;
            commands::um(&ws, &output, &dir, &words.join(" "))?
        }

        Commands::Rm { args } => {
            let (dir, words) = commands::split_dir(args)?;
            commands::rm(&ws, &output, &dir, &words.join(" "))?
        }

        Commands::I { dir } => {
            let dir = commands::target_dir(dir.as_deref())?;
            output.verbose_ctx("i", &format!("Interactive session in {}", dir.display()));
            interactive::run(&mut ws, &output, &editor, &dir)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
