//! Configuration handling for crumb
//!
//! Configuration is stored in `~/.crumbrc.toml`, or wherever `--config` /
//! `CRUMB_CONFIG` points. Every key is optional.
//!
//! ```toml
//! stop_at = "/home/me"
//! crumb_file_name = ".crumb"
//! filters = [{ name = "isNot", args = ["x"] }]
//! sorts = [{ name = "sortMarked" }]
//! alias = [{ name = "--recent", args = ["--filter", "isCreatedSinceH=24"] }]
//!
//! [markers.x]
//! prefix = "[x] "
//!
//! [unmarked]
//! prefix = "[ ] "
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{MarkerVocabulary, RuleDescriptor, VocabularyError};

/// File name of the user configuration in the home directory
pub const CONFIG_FILE_NAME: &str = ".crumbrc.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Text placed around a displayed value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Affix {
    pub prefix: String,
    pub suffix: String,
}

impl Affix {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Surrounds `value` with the prefix and suffix
    pub fn wrap(&self, value: &str) -> String {
        format!("{}{}{}", unquote(&self.prefix), value, unquote(&self.suffix))
    }
}

/// Interprets a double-quoted literal with its escapes, e.g. `"\u001b[1m"`
///
/// Anything that is not a valid quoted literal is returned as is.
pub fn unquote(value: &str) -> Cow<'_, str> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        if let Ok(unquoted) = serde_json::from_str::<String>(value) {
            return Cow::Owned(unquoted);
        }
    }
    Cow::Borrowed(value)
}

/// A command-line shortcut expanding to other arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,

    #[serde(default)]
    pub args: Vec<String>,
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upward bubbling stops before reaching this directory
    pub stop_at: PathBuf,

    /// Name of the crumb file in each directory
    pub crumb_file_name: String,

    /// How many directory levels `wa` descends
    pub walk_depth: usize,

    /// Editor command (falls back to $EDITOR, then vi)
    pub editor: Option<String>,

    /// Command-line aliases
    pub alias: Vec<Alias>,

    /// Filters applied to every listing and selection
    pub filters: Vec<RuleDescriptor>,

    /// Sort passes applied to every listing and selection
    pub sorts: Vec<RuleDescriptor>,

    /// Marker vocabulary with display affixes
    pub markers: BTreeMap<String, Affix>,

    /// Display affixes for unmarked crumbs
    pub unmarked: Affix,

    /// Display affixes around the directory header
    pub header: Affix,

    /// Display affixes around the selector number
    pub selector: Affix,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stop_at: PathBuf::from("/"),
            crumb_file_name: ".crumb".to_string(),
            walk_depth: 3,
            editor: None,
            alias: vec![],
            filters: vec![],
            sorts: vec![],
            markers: BTreeMap::from([("m".to_string(), Affix::default())]),
            unmarked: Affix::default(),
            header: Affix::default(),
            selector: Affix::new("", " "),
        }
    }
}

impl Config {
    /// Path of the default configuration file
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads configuration
    ///
    /// An explicit path must exist. Without one, the default file is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Invalid {}", path.display()))
    }

    /// Parses configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        if config.crumb_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("crumb_file_name cannot be empty".to_string()));
        }

        Ok(config)
    }

    /// Builds the marker vocabulary from the configured markers
    pub fn vocabulary(&self) -> Result<MarkerVocabulary, VocabularyError> {
        MarkerVocabulary::new(self.markers.keys().cloned())
    }

    /// Display affixes for a marker, the unmarked ones for an empty marker
    pub fn marker_affix(&self, marker: &str) -> &Affix {
        if marker.is_empty() {
            &self.unmarked
        } else {
            self.markers.get(marker).unwrap_or(&self.unmarked)
        }
    }

    /// Replaces each argument naming an alias with the alias arguments
    pub fn expand_aliases(&self, args: impl IntoIterator<Item = String>) -> Vec<String> {
        args.into_iter()
            .flat_map(|arg| match self.alias.iter().find(|a| a.name == arg) {
                Some(alias) => alias.args.clone(),
                None => vec![arg],
            })
            .collect()
    }
}
