//! # Storage Layer
//!
//! Crumb files, configuration and directory discovery.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Crumbs | Plain text, one per line | `{dir}/.crumb` |
//! | Config | TOML | `~/.crumbrc.toml` |
//!
//! ## Write Semantics
//!
//! - Adding a crumb appends one line
//! - Every other change rewrites the whole file (temp file + rename)
//! - No locking: concurrent writers race and the last one wins
//!
//! ## Key Types
//!
//! - [`Workspace`] - Configuration context handed to every command
//! - [`CrumbFile`] - Read/write one crumb file
//! - [`Config`] - User configuration

mod config;
mod crumbfile;
mod discovery;
mod workspace;

pub use config::{unquote, Affix, Alias, Config, ConfigError, CONFIG_FILE_NAME};
pub use crumbfile::CrumbFile;
pub use discovery::{bubble_up, walk_down};
pub use workspace::{Snapshot, Workspace};
