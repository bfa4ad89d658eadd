//! Interactive session (`crumb i`)
//!
//! Shows the listing, then reads one command per line until an empty line
//! or end of input. Selection commands ask for the selection and for any
//! extra input (marker, text) before the file is rewritten, so a transform
//! never prompts.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::commands::commit;
use super::display::write_listing;
use super::editor::Editor;
use super::output::Output;
use crate::domain::{resolve, Transform};
use crate::storage::{CrumbFile, Workspace};

const HELP: &str = "\n*** Commands ***\n  [l]s  [a]d  [m]a  [u]m  [r]m  [b]a  [w]a  [e]d  [f]i\n> ";

/// Selection commands of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pick {
    Edit,
    Mark,
    Unmark,
    Remove,
}

impl Pick {
    fn name(self) -> &'static str {
        match self {
            Pick::Edit => "ed",
            Pick::Mark => "ma",
            Pick::Unmark => "um",
            Pick::Remove => "rm",
        }
    }
}

pub struct Session<'a, R, W> {
    ws: &'a mut Workspace,
    output: &'a Output,
    editor: &'a Editor,
    dir: PathBuf,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(
        ws: &'a mut Workspace,
        output: &'a Output,
        editor: &'a Editor,
        dir: PathBuf,
        input: R,
        out: W,
    ) -> Self {
        Self {
            ws,
            output,
            editor,
            dir,
            input,
            out,
        }
    }

    /// Runs until an empty command or end of input
    pub fn run(&mut self) -> Result<()> {
        self.list_dir()?;

        loop {
            let Some(command) = self.prompt(HELP)? else {
                break;
            };

            match command.as_str() {
                "" => break,
                "l" | "ls" => self.list_dir()?,
                "b" | "ba" => {
                    let files = self.ws.bubble_up(&self.dir);
                    self.list_files(files)?;
                }
                "w" | "wa" => {
                    let files = self.ws.walk_down(&self.dir);
                    self.list_files(files)?;
                }
                "a" | "ad" => self.add()?,
                "e" | "ed" => self.pick(Pick::Edit)?,
                "m" | "ma" => self.pick(Pick::Mark)?,
                "u" | "um" => self.pick(Pick::Unmark)?,
                "r" | "rm" => self.pick(Pick::Remove)?,
                "f" | "fi" => self.filter()?,
                other => self.output.verbose_ctx("i", &format!("Ignoring unknown command '{}'", other)),
            }
        }

        self.out.flush()?;
        Ok(())
    }

    /// Writes `text` and reads one line; `None` at end of input
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Unable to read from standard input")?;
        if read == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn list_dir(&mut self) -> Result<()> {
        let path = self.ws.crumb_file(&self.dir).path().to_path_buf();
        self.list_files([path])
    }

    fn list_files(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> Result<()> {
        for path in paths {
            let file = CrumbFile::new(path);
            if file.exists() {
                let snapshot = self.ws.snapshot(&file)?;
                write_listing(&mut self.out, self.ws.config(), file.dir(), &snapshot.view)?;
            }
        }
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let Some(mut text) = self.prompt("ad>> ")? else {
            return Ok(());
        };
        if text.is_empty() {
            text = self.editor.edit("")?;
        }
        self.ws.add(&self.dir, &text)
    }

    fn filter(&mut self) -> Result<()> {
        let Some(words) = self.prompt("fi>> ")? else {
            return Ok(());
        };
        if let Err(e) = self.ws.edit_filters(&words) {
            writeln!(self.out, "{}", e)?;
        }
        self.output.verbose_ctx(
            "fi",
            &format!(
                "Active filters: {}",
                self.ws.filters().iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" ")
            ),
        );
        Ok(())
    }

    fn pick(&mut self, pick: Pick) -> Result<()> {
        let file = self.ws.crumb_file(&self.dir);
        if !file.exists() {
            return Ok(());
        }

        let snapshot = self.ws.snapshot(&file)?;
        write_listing(&mut self.out, self.ws.config(), file.dir(), &snapshot.view)?;

        let Some(selection) = self.prompt(&format!("{}>> ", pick.name()))? else {
            return Ok(());
        };
        let lines = resolve(&selection, &snapshot.view.line_numbers);

        let transform = match pick {
            Pick::Unmark => Transform::Unmark,
            Pick::Remove => Transform::Delete,
            Pick::Mark => match self.ask_marker()? {
                Some(marker) => Transform::Mark(marker),
                None => return Ok(()),
            },
            Pick::Edit => {
                let Some(mut text) = self.prompt("text>> ")? else {
                    return Ok(());
                };
                if text.is_empty() {
                    if let Some(first) = snapshot.crumbs_on(&lines).next() {
                        text = self.editor.edit(&first.text)?;
                    }
                }
                Transform::Edit(text)
            }
        };

        commit(&*self.ws, self.output, &file, &snapshot, &lines, &transform)?;
        Ok(())
    }

    /// Asks for a marker; `None` leaves the crumbs as they are
    fn ask_marker(&mut self) -> Result<Option<String>> {
        let markers = self.ws.markers().markers().collect::<Vec<_>>().join("  ");
        let Some(answer) = self.prompt(&format!("\n*** Marks ***\n  {}\nma>> ", markers))? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(None);
        }

        match self.ws.resolve_marker(&answer) {
            Some(marker) => Ok(Some(marker.to_string())),
            None => {
                writeln!(self.out, "Could not evaluate marker {}", answer)?;
                Ok(None)
            }
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }
}

/// Runs a session on standard input and output
pub fn run(ws: &mut Workspace, output: &Output, editor: &Editor, dir: &Path) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Session::new(ws, output, editor, dir.to_path_buf(), stdin.lock(), stdout.lock()).run()
}
