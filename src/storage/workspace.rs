//! Configuration context for one invocation
//!
//! A [`Workspace`] owns the loaded configuration together with what is
//! derived from it once per process: the marker vocabulary, the compiled
//! line parser, the rule registry and the active filter and sort lists.
//! Commands borrow it to read, query and rewrite crumb files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{bubble_up, walk_down, Config, CrumbFile};
use crate::domain::{
    self, query, rewrite, Crumb, CrumbParser, FilterEdit, MarkerVocabulary, Rewrite,
    RuleContext, RuleDescriptor, RuleError, RuleRegistry, Transform, View,
};

/// Lines of a crumb file and the view computed over them
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub lines: Vec<String>,
    pub view: View,
}

impl Snapshot {
    /// Crumbs on the given physical lines, in the given order
    pub fn crumbs_on<'a>(&'a self, line_numbers: &'a [usize]) -> impl Iterator<Item = &'a Crumb> {
        line_numbers.iter().filter_map(|&l| self.view.on_line(l))
    }
}

pub struct Workspace {
    config: Config,
    markers: MarkerVocabulary,
    parser: CrumbParser,
    registry: RuleRegistry,
    filters: Vec<RuleDescriptor>,
    sorts: Vec<RuleDescriptor>,
}

impl Workspace {
    /// Prepares a workspace, failing on an unusable marker vocabulary
    pub fn new(config: Config) -> Result<Self> {
        let markers = config.vocabulary().context("Bad `markers` configuration")?;
        let parser = CrumbParser::new(&markers).context("Bad `markers` configuration")?;
        let filters = config.filters.clone();
        let sorts = config.sorts.clone();

        Ok(Self {
            config,
            markers,
            parser,
            registry: RuleRegistry::new(),
            filters,
            sorts,
        })
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn markers(&self) -> &MarkerVocabulary {
        &self.markers
    }

    /// Active filter descriptors
    pub fn filters(&self) -> &[RuleDescriptor] {
        &self.filters
    }

    /// Active sort descriptors
    pub fn sorts(&self) -> &[RuleDescriptor] {
        &self.sorts
    }

    /// Configured descriptors the registry does not know; they are ignored
    pub fn unknown_rules(&self) -> Vec<&RuleDescriptor> {
        self.filters
            .iter()
            .filter(|d| !self.registry.has_filter(&d.name))
            .chain(self.sorts.iter().filter(|d| !self.registry.has_sort(&d.name)))
            .collect()
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn clear_sorts(&mut self) {
        self.sorts.clear();
    }

    /// Appends a filter given on the command line or interactively
    pub fn push_filter(&mut self, desc: RuleDescriptor) -> Result<(), RuleError> {
        if !self.registry.has_filter(&desc.name) {
            return Err(RuleError::UnknownRule(desc.name));
        }
        self.filters.push(desc);
        Ok(())
    }

    /// Appends a sort pass given on the command line
    pub fn push_sort(&mut self, desc: RuleDescriptor) -> Result<(), RuleError> {
        if !self.registry.has_sort(&desc.name) {
            return Err(RuleError::UnknownRule(desc.name));
        }
        self.sorts.push(desc);
        Ok(())
    }

    /// Applies an interactive filter line such as `noFilter isMarked`
    pub fn edit_filters(&mut self, input: &str) -> Result<(), RuleError> {
        for edit in self.registry.parse_filter_words(input)? {
            match edit {
                FilterEdit::Clear => self.clear_filters(),
                FilterEdit::Push(desc) => self.push_filter(desc)?,
            }
        }
        Ok(())
    }

    /// Resolves a marker shorthand against the vocabulary
    pub fn resolve_marker(&self, shorthand: &str) -> Option<&str> {
        self.markers.resolve(shorthand)
    }

    /// The crumb file of a directory
    pub fn crumb_file(&self, dir: &Path) -> CrumbFile {
        CrumbFile::in_dir(dir, &self.config.crumb_file_name)
    }

    /// Crumb files from `dir` up to the configured stop directory
    pub fn bubble_up(&self, dir: &Path) -> Vec<PathBuf> {
        bubble_up(dir, &self.config.stop_at, &self.config.crumb_file_name)
    }

    /// Crumb files below `dir`, down to the configured depth
    pub fn walk_down(&self, dir: &Path) -> Vec<PathBuf> {
        walk_down(dir, &self.config.crumb_file_name, self.config.walk_depth)
    }

    /// Filters and sorts `lines` with the active rules
    pub fn view<S: AsRef<str>>(&self, lines: &[S]) -> Result<View> {
        let ctx = RuleContext {
            markers: &self.markers,
            now: domain::now(),
        };
        let filter = self
            .registry
            .build_filter(&self.filters, &ctx)
            .context("Invalid filter")?;
        let sorts = self
            .registry
            .build_sorts(&self.sorts, &ctx)
            .context("Invalid sort")?;

        Ok(query(lines, &self.parser, filter, &sorts))
    }

    /// Reads a crumb file and computes its view; a missing file is empty
    pub fn snapshot(&self, file: &CrumbFile) -> Result<Snapshot> {
        let lines = file.read_lines_if_exists()?;
        let view = self.view(&lines)?;
        Ok(Snapshot { lines, view })
    }

    /// Applies `transform` to the selected lines and rewrites the file
    pub fn commit(
        &self,
        file: &CrumbFile,
        snapshot: &Snapshot,
        selection: &[usize],
        transform: &Transform,
    ) -> Result<Rewrite> {
        let result = rewrite(
            &snapshot.lines,
            selection,
            &self.parser,
            |crumb| transform.apply(crumb),
            domain::now(),
        );
        file.write(&result.content)?;
        Ok(result)
    }

    /// Appends a new crumb to the crumb file of `dir`
    pub fn add(&self, dir: &Path, text: &str) -> Result<()> {
        self.crumb_file(dir)
            .append(&Crumb::entry_line(text, domain::now()))
    }
}
