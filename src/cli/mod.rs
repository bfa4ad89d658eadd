//! # Command-Line Interface
//!
//! User-facing commands, listings and the interactive session.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `ls`, `ba`, `wa` | List one directory, its parents, or its subdirectories |
//! | `ad` | Add a crumb |
//! | `ed`, `ma`, `um`, `rm` | Change selected crumbs |
//! | `i` | Interactive session |
//!
//! Selections are display positions: `2`, `1 3 5` or `2-4`.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! crumb --verbose ba
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod commands;
mod display;
mod editor;
mod interactive;
mod output;

pub use app::{run, Cli, Commands, CONFIG_ENV};
pub use editor::Editor;
pub use output::{Output, OutputFormat};
