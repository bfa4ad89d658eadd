//! Plain-text crumb files
//!
//! One crumb per line, `\n`-terminated. Reads return the raw lines so that
//! physical line numbers stay meaningful; writes replace the whole file.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A crumb file inside one directory
pub struct CrumbFile {
    path: PathBuf,
}

impl CrumbFile {
    /// Creates a handle for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the handle for `file_name` inside `dir`
    pub fn in_dir(dir: &Path, file_name: &str) -> Self {
        Self::new(dir.join(file_name))
    }

    /// Returns the path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the file
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    /// Returns true if the file exists and is not a directory
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the raw lines; line `i` is physical line number `i`
    pub fn read_lines(&self) -> Result<Vec<String>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to open file {}", self.path.display()))?;

        Ok(content.split('\n').map(str::to_string).collect())
    }

    /// Like [`read_lines`](Self::read_lines), but a missing file is empty
    pub fn read_lines_if_exists(&self) -> Result<Vec<String>> {
        if self.exists() {
            self.read_lines()
        } else {
            Ok(Vec::new())
        }
    }

    /// Replaces the file content
    ///
    /// The content goes to a sibling temp file which is then renamed over
    /// the original, so readers never see a half-written file.
    pub fn write(&self, content: &str) -> Result<()> {
        let temp_path = self.temp_path();

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Unable to access {} for writing", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(content.as_bytes())
                .with_context(|| format!("Unable to write {}", temp_path.display()))?;
            writer.flush().context("Failed to flush crumb file")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends one line, creating the file if needed
    pub fn append(&self, line: &str) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Unable to access {} for writing", self.path.display()))?;

        let mut writer = BufWriter::new(&file);
        writeln!(writer, "{}", line).context("Failed to write crumb")?;
        writer.flush().context("Failed to flush crumb file")?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
