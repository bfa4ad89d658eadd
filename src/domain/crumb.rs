//! Crumb record model
//!
//! A crumb is one line of a crumb file:
//!
//! ```text
//! [modified ][created ][marker ]text
//! 2024-03-01 09:12:44 2024-02-27 17:03:10 x call the plumber
//! ```
//!
//! A line carrying a single timestamp has only been created, never touched.
//! Formatting a crumb for writing always stamps the modified time with "now".

use std::collections::{BTreeSet, HashMap};

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// On-disk timestamp format
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_PATTERN: &str = r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}";

#[derive(Debug, Error, PartialEq)]
pub enum VocabularyError {
    #[error("Marker names cannot be empty")]
    EmptyMarker,

    #[error("Invalid marker '{0}': markers cannot contain whitespace")]
    InvalidMarker(String),

    #[error("Unable to compile crumb pattern for markers [{markers}]: {reason}")]
    Pattern { markers: String, reason: String },
}

/// Formats a timestamp the way crumb files store it
pub fn format_date(date: NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a stored timestamp, `None` for impossible dates like month 13
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).ok()
}

/// Current local time truncated to the stored precision
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    parse_date(&format_date(now)).unwrap_or(now)
}

/// A single tracked note or task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Crumb {
    /// Marker token, empty when unmarked
    pub marker: String,

    /// Free-form body
    pub text: String,

    /// Creation time, absent for lines written by other tools
    pub created_at: Option<NaiveDateTime>,

    /// Last modification time, only ever present together with `created_at`
    pub modified_at: Option<NaiveDateTime>,
}

impl Crumb {
    /// Creates an unmarked crumb with no timestamps
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns true if the crumb carries a marker
    pub fn is_marked(&self) -> bool {
        !self.marker.is_empty()
    }

    /// Time of the last write: modification if any, else creation
    pub fn last_touched(&self) -> Option<NaiveDateTime> {
        self.modified_at.or(self.created_at)
    }

    /// Formats the crumb for writing at `now`
    ///
    /// The modified field is always `now`; a missing creation time is
    /// filled with `now` as well.
    pub fn to_line(&self, now: NaiveDateTime) -> String {
        let created = self.created_at.unwrap_or(now);
        let mut line = format!("{} {} ", format_date(now), format_date(created));
        if self.is_marked() {
            line.push_str(&self.marker);
            line.push(' ');
        }
        line.push_str(&self.text);
        line
    }

    /// Line for a freshly added crumb: a single creation stamp and the text
    pub fn entry_line(text: &str, now: NaiveDateTime) -> String {
        format!("{} {}", format_date(now), one_line(text))
    }
}

/// Joins multi-line text into a single record body
///
/// Each crumb is one line of its file, so line breaks become spaces and
/// blank lines are dropped. Text without line breaks is returned as is.
pub fn one_line(text: &str) -> String {
    if !text.contains(['\n', '\r']) {
        return text.to_string();
    }
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The configured set of markers and their shorthands
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerVocabulary {
    markers: BTreeSet<String>,
    shorthands: HashMap<String, String>,
}

impl MarkerVocabulary {
    /// Builds a vocabulary, rejecting names that could not round-trip
    pub fn new<I, S>(markers: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for marker in markers {
            let marker = marker.into();
            if marker.is_empty() {
                return Err(VocabularyError::EmptyMarker);
            }
            if marker.chars().any(char::is_whitespace) {
                return Err(VocabularyError::InvalidMarker(marker));
            }
            set.insert(marker);
        }

        let mut shorthands: HashMap<String, String> =
            set.iter().map(|m| (m.clone(), m.clone())).collect();

        for marker in &set {
            let mut partial = String::new();
            let mut chars = marker.chars().peekable();
            while let Some(c) = chars.next() {
                if chars.peek().is_none() {
                    break;
                }
                partial.push(c);
                shorthands
                    .entry(partial.clone())
                    .or_insert_with(|| marker.clone());
            }
        }

        Ok(Self {
            markers: set,
            shorthands,
        })
    }

    /// Iterates over the markers in sorted order
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Resolves a marker or an unambiguous-enough prefix of one
    pub fn resolve(&self, shorthand: &str) -> Option<&str> {
        self.shorthands.get(shorthand).map(String::as_str)
    }
}

/// Line parser compiled for one marker vocabulary
#[derive(Debug, Clone)]
pub struct CrumbParser {
    pattern: Regex,
}

impl CrumbParser {
    pub fn new(vocabulary: &MarkerVocabulary) -> Result<Self, VocabularyError> {
        let alternatives: Vec<String> = vocabulary.markers().map(regex::escape).collect();

        let marker_group = if alternatives.is_empty() {
            String::new()
        } else {
            format!("(?:(?P<marker>{}) )?", alternatives.join("|"))
        };

        let source = format!(
            "^(?:(?P<first>{date}) )?(?:(?P<second>{date}) )?{marker_group}(?P<text>.*)$",
            date = DATE_PATTERN,
        );

        let pattern = Regex::new(&source).map_err(|e| VocabularyError::Pattern {
            markers: alternatives.join(", "),
            reason: e.to_string(),
        })?;

        Ok(Self { pattern })
    }

    /// Parses a line into a crumb
    ///
    /// A stamp that looks like a date but names an impossible one, such as
    /// `2023-02-30`, is not a stamp: the line from there on is the body.
    pub fn parse(&self, line: &str) -> Option<Crumb> {
        let caps = self.pattern.captures(line)?;

        let mut dates = Vec::with_capacity(2);
        let mut body_start = None;
        for stamp in [caps.name("first"), caps.name("second")].into_iter().flatten() {
            match parse_date(stamp.as_str()) {
                Some(date) => dates.push(date),
                None => {
                    body_start = Some(stamp.start());
                    break;
                }
            }
        }

        let (modified_at, created_at) = match dates[..] {
            [modified, created] => (Some(modified), Some(created)),
            [created] => (None, Some(created)),
            _ => (None, None),
        };

        let (marker, text) = match body_start {
            Some(start) => (String::new(), line[start..].to_string()),
            None => (
                caps.name("marker").map(|m| m.as_str().to_string()).unwrap_or_default(),
                caps.name("text").map(|m| m.as_str().to_string()).unwrap_or_default(),
            ),
        };

        Some(Crumb {
            marker,
            text,
            created_at,
            modified_at,
        })
    }
}
