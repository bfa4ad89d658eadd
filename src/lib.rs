//! crumb - notes and tasks kept in plain-text files next to your work
//!
//! Each directory may hold a crumb file with one record per line: optional
//! timestamps, an optional marker and free text. Listings are filtered and
//! sorted by configurable rules, and records are selected by their display
//! position for editing, marking or removal.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Crumb, CrumbParser, MarkerVocabulary, RuleRegistry, View};
pub use storage::{Config, Workspace};
