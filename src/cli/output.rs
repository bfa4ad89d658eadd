//! Output formatting for CLI commands
//!
//! Listings and command summaries go to stdout in the selected format;
//! verbose diagnostics always go to stderr.

use std::io::{self, Write};
use std::path::Path;

use super::display::{write_listing, FileListing};
use crate::domain::View;
use crate::storage::Config;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints the summary of a finished command
    pub fn success(&self, message: &str) {
        // A closed stdout is not worth failing a write that already happened
        let _ = self.write_success(&mut io::stdout().lock(), message);
    }

    fn write_success<W: Write>(&self, w: &mut W, message: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(w, "{}", message),
            OutputFormat::Json => writeln!(
                w,
                "{}",
                serde_json::json!({
                    "success": true,
                    "message": message
                })
            ),
        }
    }

    /// Writes the listing of one crumb file: affixed lines in text mode,
    /// one JSON object per file otherwise
    pub fn listing<W: Write>(&self, w: &mut W, config: &Config, dir: &Path, view: &View) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => write_listing(w, config, dir, view),
            OutputFormat::Json => {
                serde_json::to_writer(&mut *w, &FileListing::new(dir, view))?;
                writeln!(w)
            }
        }
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Crumb;

    fn view() -> View {
        View {
            crumbs: vec![Crumb::new("water the plants")],
            line_numbers: vec![4],
        }
    }

    fn render(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        Output::new(format, false)
            .listing(&mut buf, &Config::default(), Path::new("/tmp/garden"), &view())
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_listing_uses_the_display_affixes() {
        let text = render(OutputFormat::Text);
        assert!(text.contains("/tmp/garden"));
        assert!(text.contains("water the plants"));
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_err());
    }

    #[test]
    fn json_listing_is_one_line_per_file() {
        let json = render(OutputFormat::Json);
        assert_eq!(json.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["dir"], "/tmp/garden");
        assert_eq!(value["crumbs"][0]["line"], 5);
    }

    #[test]
    fn success_message_per_format() {
        let mut buf = Vec::new();
        Output::new(OutputFormat::Text, false).write_success(&mut buf, "Removed 2 crumbs").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Removed 2 crumbs\n");

        let mut buf = Vec::new();
        Output::new(OutputFormat::Json, false).write_success(&mut buf, "Removed 2 crumbs").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Removed 2 crumbs");
    }
}
