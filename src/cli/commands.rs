//! Crumb commands (ls, ba, wa, ad, ed, ma, um, rm)

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::editor::Editor;
use super::output::Output;
use crate::domain::{resolve, Rewrite, Transform};
use crate::storage::{CrumbFile, Snapshot, Workspace};

/// Resolves an optional directory argument, defaulting to the current one
pub fn target_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) if dir.is_dir() => dir
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", dir.display())),
        Some(dir) => bail!("Not a directory: {}", dir.display()),
        None => std::env::current_dir().context("Unable to determine the current directory"),
    }
}

/// Splits a leading directory off the arguments
///
/// The first argument names the directory only when more arguments follow
/// and it is an existing directory.
pub fn split_dir(mut args: Vec<String>) -> Result<(PathBuf, Vec<String>)> {
    if args.len() > 1 && Path::new(&args[0]).is_dir() {
        let dir = args.remove(0);
        Ok((target_dir(Some(Path::new(&dir)))?, args))
    } else {
        Ok((target_dir(None)?, args))
    }
}

/// Lists the crumb file of `dir`
pub fn ls(ws: &Workspace, output: &Output, dir: &Path) -> Result<()> {
    let file = ws.crumb_file(dir);
    output.verbose_ctx("ls", &format!("Crumb file: {}", file.path().display()));
    list(ws, output, [file.path().to_path_buf()])
}

/// Lists crumb files from `dir` up to `stop_at`
pub fn ba(ws: &Workspace, output: &Output, dir: &Path) -> Result<()> {
    let files = ws.bubble_up(dir);
    output.verbose_ctx(
        "ba",
        &format!("Found {} crumb files up to {}", files.len(), ws.config().stop_at.display()),
    );
    list(ws, output, files)
}

/// Lists crumb files below `dir`
pub fn wa(ws: &Workspace, output: &Output, dir: &Path) -> Result<()> {
    let files = ws.walk_down(dir);
    output.verbose_ctx(
        "wa",
        &format!("Found {} crumb files within depth {}", files.len(), ws.config().walk_depth),
    );
    list(ws, output, files)
}

fn list(ws: &Workspace, output: &Output, paths: impl IntoIterator<Item = PathBuf>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in paths {
        let file = CrumbFile::new(path);
        if !file.exists() {
            output.verbose_ctx("list", &format!("No crumb file at {}", file.path().display()));
            continue;
        }

        let snapshot = ws.snapshot(&file)?;
        output.listing(&mut out, ws.config(), file.dir(), &snapshot.view)?;
    }

    out.flush()?;
    Ok(())
}

/// Adds a crumb; empty text opens the editor
pub fn ad(ws: &Workspace, output: &Output, editor: &Editor, dir: &Path, text: &str) -> Result<()> {
    let text = if text.is_empty() {
        output.verbose_ctx("ad", &format!("Opening {}", editor.program()));
        editor.edit("")?
    } else {
        text.to_string()
    };

    ws.add(dir, &text)?;
    output.success(&format!("Added crumb to {}", ws.crumb_file(dir).path().display()));
    Ok(())
}

/// Replaces the text of the selected crumbs
///
/// Without text the editor opens on the first selected crumb and its
/// result is used for the whole selection.
pub fn ed(
    ws: &Workspace,
    output: &Output,
    editor: &Editor,
    dir: &Path,
    selection: &str,
    text: &str,
) -> Result<()> {
    apply(ws, output, dir, selection, |snapshot, lines| {
        if !text.is_empty() {
            return Ok(Transform::Edit(text.to_string()));
        }
        let Some(first) = snapshot.crumbs_on(lines).next() else {
            return Ok(Transform::Edit(String::new()));
        };
        output.verbose_ctx("ed", &format!("Opening {}", editor.program()));
        Ok(Transform::Edit(editor.edit(&first.text)?))
    })
}

/// Sets the marker of the selected crumbs
pub fn ma(ws: &Workspace, output: &Output, dir: &Path, marker: &str, selection: &str) -> Result<()> {
    let Some(resolved) = ws.resolve_marker(marker) else {
        bail!(
            "Unknown marker '{}' (known: {})",
            marker,
            ws.markers().markers().collect::<Vec<_>>().join(", ")
        );
    };
    output.verbose_ctx("ma", &format!("Marker '{}' resolved to '{}'", marker, resolved));

    let transform = Transform::Mark(resolved.to_string());
    apply(ws, output, dir, selection, |_, _| Ok(transform))
}

/// Clears the marker of the selected crumbs
pub fn um(ws: &Workspace, output: &Output, dir: &Path, selection: &str) -> Result<()> {
    apply(ws, output, dir, selection, |_, _| Ok(Transform::Unmark))
}

/// Deletes the selected crumbs
pub fn rm(ws: &Workspace, output: &Output, dir: &Path, selection: &str) -> Result<()> {
    apply(ws, output, dir, selection, |_, _| Ok(Transform::Delete))
}

fn apply(
    ws: &Workspace,
    output: &Output,
    dir: &Path,
    selection: &str,
    transform: impl FnOnce(&Snapshot, &[usize]) -> Result<Transform>,
) -> Result<()> {
    let file = ws.crumb_file(dir);
    if !file.exists() {
        output.verbose(&format!("No crumb file at {}, nothing to do", file.path().display()));
        return Ok(());
    }

    let snapshot = ws.snapshot(&file)?;
    let lines = resolve(selection, &snapshot.view.line_numbers);
    let transform = transform(&snapshot, &lines)?;
    let result = commit(ws, output, &file, &snapshot, &lines, &transform)?;

    output.success(&summary(&transform, &result));
    Ok(())
}

/// Rewrites the selected lines of `file`, logging what happened
pub(super) fn commit(
    ws: &Workspace,
    output: &Output,
    file: &CrumbFile,
    snapshot: &Snapshot,
    lines: &[usize],
    transform: &Transform,
) -> Result<Rewrite> {
    let name = transform.name();
    output.verbose_ctx(name, &format!("Selected lines {:?} of {}", lines, file.path().display()));

    let result = ws.commit(file, snapshot, lines, transform)?;
    output.verbose_ctx(
        name,
        &format!("{} lines rewritten, {} deleted", result.changed, result.deleted),
    );
    Ok(result)
}

fn summary(transform: &Transform, result: &Rewrite) -> String {
    let (verb, count) = match transform {
        Transform::Edit(_) => ("Edited", result.changed),
        Transform::Mark(_) => ("Marked", result.changed),
        Transform::Unmark => ("Unmarked", result.changed),
        Transform::Delete => ("Removed", result.deleted),
    };
    format!("{} {} crumb{}", verb, count, if count == 1 { "" } else { "s" })
}
