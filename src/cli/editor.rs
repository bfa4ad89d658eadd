//! External editor for free-form crumb text

use std::fs;
use std::io::Write;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Editor command: program followed by whitespace-separated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: String,
    args: Vec<String>,
}

impl Editor {
    /// Resolves the editor from the configured command, then `$EDITOR`, then vi
    pub fn resolve(configured: Option<&str>) -> Self {
        let command = configured
            .map(str::to_string)
            .filter(|c| !c.trim().is_empty())
            .or_else(|| std::env::var("EDITOR").ok().filter(|c| !c.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string());

        Self::from_command(&command)
    }

    fn from_command(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_else(|| "vi".to_string());
        Self {
            program,
            args: words.collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Lets the user edit `original` and returns the result
    ///
    /// Trailing line breaks are stripped. A failed spawn or a non-zero exit
    /// is an error.
    pub fn edit(&self, original: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("crumb-")
            .suffix(".txt")
            .tempfile()
            .context("Could not create temp file")?;
        file.write_all(original.as_bytes())
            .context("Could not write to temp file")?;
        file.flush().context("Could not write to temp file")?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .status()
            .with_context(|| format!("Could not start {}", self.program))?;

        if !status.success() {
            bail!("Editor {} exited with a non-zero status", self.program);
        }

        let text = fs::read_to_string(file.path())
            .with_context(|| format!("Unable to read {}", file.path().display()))?;

        Ok(text.trim_end_matches(['\n', '\r']).to_string())
    }
}
