//! Filter and sort rules
//!
//! Rules are looked up by name and turned into a predicate or an ordering
//! step. Some take no arguments (`isMarked`), others need a list
//! (`is m,x`, `isCreatedSinceH 24`).
//!
//! | Filter | Args | Keeps |
//! |--------|------|-------|
//! | `isMarked` | - | crumbs with a marker |
//! | `isNotMarked` | - | crumbs without a marker |
//! | `isCreatedSinceH` | hours | crumbs created within the last N hours |
//! | `isModifiedSinceH` | hours | crumbs touched within the last N hours |
//! | `is` | markers | crumbs carrying one of the markers |
//! | `isNot` | markers | crumbs carrying none of the markers |
//!
//! | Sort | Args | Order |
//! |------|------|-------|
//! | `sortNone` | - | file order |
//! | `sortReverse` | - | reversed |
//! | `sortMarked` | - | unmarked first |
//! | `sortMarkedOrder` | markers | by position of the marker in the list, others last |

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::crumb::{Crumb, MarkerVocabulary};

/// Predicate over a crumb
pub type Filter = Box<dyn Fn(&Crumb) -> bool>;

/// Ordering between two crumbs
pub type Comparator = Box<dyn Fn(&Crumb, &Crumb) -> Ordering>;

#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("Unknown rule '{0}'")]
    UnknownRule(String),

    #[error("Rule {0} needs at least one argument")]
    MissingArgs(String),

    #[error("Rule {name} accepts {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Could not parse argument '{value}' of {name} as an integer")]
    NotAnInteger { name: String, value: String },
}

/// A rule reference as stored in configuration or given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl RuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Creates a descriptor with comma-separated arguments, blank pieces
    /// dropped
    pub fn with_args(name: impl Into<String>, args: &str) -> Self {
        Self {
            name: name.into(),
            args: args
                .split(',')
                .map(str::trim)
                .filter(|arg| !arg.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl fmt::Display for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}={}", self.name, self.args.join(","))
        }
    }
}

/// Parses `name` or `name=arg1,arg2`
impl FromStr for RuleDescriptor {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, args)) => Ok(Self::with_args(name.trim(), args)),
            None if s.trim().is_empty() => Err(RuleError::UnknownRule(s.to_string())),
            None => Ok(Self::new(s.trim())),
        }
    }
}

/// One ordering pass over a list of crumbs
pub enum Sort {
    /// Leave the order untouched
    Keep,
    /// Reverse the current order
    Reverse,
    /// Stable sort by a comparator
    By(Comparator),
}

impl Sort {
    /// Applies the pass to `items`, reading each item's crumb through `crumb`
    pub fn apply<T>(&self, items: &mut [T], crumb: impl Fn(&T) -> &Crumb) {
        match self {
            Sort::Keep => {}
            Sort::Reverse => items.reverse(),
            Sort::By(compare) => items.sort_by(|a, b| compare(crumb(a), crumb(b))),
        }
    }
}

impl fmt::Debug for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Keep => write!(f, "Keep"),
            Sort::Reverse => write!(f, "Reverse"),
            Sort::By(_) => write!(f, "By(..)"),
        }
    }
}

/// What rules may depend on when they are built
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub markers: &'a MarkerVocabulary,
    pub now: NaiveDateTime,
}

enum FilterRule {
    Plain(fn(&RuleContext) -> Filter),
    WithArgs(fn(&RuleContext, &str, &[String]) -> Result<Filter, RuleError>),
}

enum SortRule {
    Plain(fn(&RuleContext) -> Sort),
    WithArgs(fn(&RuleContext, &str, &[String]) -> Result<Sort, RuleError>),
}

/// A change to the active filter list requested interactively
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEdit {
    /// Drop every active filter
    Clear,
    /// Append a filter
    Push(RuleDescriptor),
}

/// Name to rule lookup table, built once per process
pub struct RuleRegistry {
    filters: HashMap<&'static str, FilterRule>,
    sorts: HashMap<&'static str, SortRule>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    pub fn new() -> Self {
        let mut filters = HashMap::new();
        filters.insert("isMarked", FilterRule::Plain(is_marked));
        filters.insert("isNotMarked", FilterRule::Plain(is_not_marked));
        filters.insert("isCreatedSinceH", FilterRule::WithArgs(is_created_since_hours));
        filters.insert("isModifiedSinceH", FilterRule::WithArgs(is_modified_since_hours));
        filters.insert("is", FilterRule::WithArgs(is_one_of));
        filters.insert("isNot", FilterRule::WithArgs(is_none_of));

        let mut sorts = HashMap::new();
        sorts.insert("sortNone", SortRule::Plain(sort_none));
        sorts.insert("sortReverse", SortRule::Plain(sort_reverse));
        sorts.insert("sortMarked", SortRule::Plain(sort_marked));
        sorts.insert("sortMarkedOrder", SortRule::WithArgs(sort_marked_order));

        Self { filters, sorts }
    }

    /// Filter names in alphabetical order
    pub fn filter_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.filters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Sort names in alphabetical order
    pub fn sort_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.sorts.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn has_sort(&self, name: &str) -> bool {
        self.sorts.contains_key(name)
    }

    /// Builds one filter, failing on unknown names
    pub fn filter(&self, desc: &RuleDescriptor, ctx: &RuleContext) -> Result<Filter, RuleError> {
        match self.filters.get(desc.name.as_str()) {
            Some(FilterRule::Plain(build)) => Ok(build(ctx)),
            Some(FilterRule::WithArgs(build)) => {
                require_args(&desc.name, &desc.args)?;
                build(ctx, &desc.name, &desc.args)
            }
            None => Err(RuleError::UnknownRule(desc.name.clone())),
        }
    }

    /// Builds one sort pass, failing on unknown names
    pub fn sort(&self, desc: &RuleDescriptor, ctx: &RuleContext) -> Result<Sort, RuleError> {
        match self.sorts.get(desc.name.as_str()) {
            Some(SortRule::Plain(build)) => Ok(build(ctx)),
            Some(SortRule::WithArgs(build)) => {
                require_args(&desc.name, &desc.args)?;
                build(ctx, &desc.name, &desc.args)
            }
            None => Err(RuleError::UnknownRule(desc.name.clone())),
        }
    }

    /// Combines descriptors into a single AND-ed filter
    ///
    /// Unknown names are skipped; a known rule with bad arguments is an error.
    pub fn build_filter(
        &self,
        descs: &[RuleDescriptor],
        ctx: &RuleContext,
    ) -> Result<Filter, RuleError> {
        let filters = descs
            .iter()
            .filter(|d| self.has_filter(&d.name))
            .map(|d| self.filter(d, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Box::new(move |crumb: &Crumb| filters.iter().all(|f| f(crumb))))
    }

    /// Builds the sort passes in the order given, skipping unknown names
    pub fn build_sorts(
        &self,
        descs: &[RuleDescriptor],
        ctx: &RuleContext,
    ) -> Result<Vec<Sort>, RuleError> {
        descs
            .iter()
            .filter(|d| self.has_sort(&d.name))
            .map(|d| self.sort(d, ctx))
            .collect()
    }

    /// Parses an interactive filter line such as `isMarked is m,x`
    ///
    /// Rules taking arguments consume the following word as a
    /// comma-separated list. `noFilter` clears the active filters.
    pub fn parse_filter_words(&self, input: &str) -> Result<Vec<FilterEdit>, RuleError> {
        let mut words = input.split_whitespace();
        let mut edits = Vec::new();

        while let Some(word) = words.next() {
            if word == "noFilter" {
                edits.push(FilterEdit::Clear);
                continue;
            }

            match self.filters.get(word) {
                Some(FilterRule::Plain(_)) => edits.push(FilterEdit::Push(RuleDescriptor::new(word))),
                Some(FilterRule::WithArgs(_)) => {
                    let desc = words
                        .next()
                        .map(|args| RuleDescriptor::with_args(word, args))
                        .filter(|desc| !desc.args.is_empty())
                        .ok_or_else(|| RuleError::MissingArgs(word.to_string()))?;
                    edits.push(FilterEdit::Push(desc));
                }
                None => return Err(RuleError::UnknownRule(word.to_string())),
            }
        }

        Ok(edits)
    }
}

fn require_args(name: &str, args: &[String]) -> Result<(), RuleError> {
    if args.iter().all(|arg| arg.trim().is_empty()) {
        Err(RuleError::MissingArgs(name.to_string()))
    } else {
        Ok(())
    }
}

fn parse_hours(name: &str, args: &[String]) -> Result<i64, RuleError> {
    if args.len() != 1 {
        return Err(RuleError::Arity {
            name: name.to_string(),
            expected: 1,
            got: args.len(),
        });
    }

    args[0].trim().parse().map_err(|_| RuleError::NotAnInteger {
        name: name.to_string(),
        value: args[0].clone(),
    })
}

/// Resolves shorthands, keeping unresolvable names as they are
fn resolve_markers(ctx: &RuleContext, args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| ctx.markers.resolve(arg).unwrap_or(arg).to_string())
        .collect()
}

fn within_hours(now: NaiveDateTime, then: NaiveDateTime, hours: i64) -> bool {
    let elapsed = now.signed_duration_since(then);
    elapsed.num_seconds() as f64 / 3600.0 <= hours as f64
}

fn is_marked(_: &RuleContext) -> Filter {
    Box::new(|crumb: &Crumb| crumb.is_marked())
}

fn is_not_marked(_: &RuleContext) -> Filter {
    Box::new(|crumb: &Crumb| !crumb.is_marked())
}

fn is_created_since_hours(ctx: &RuleContext, name: &str, args: &[String]) -> Result<Filter, RuleError> {
    let hours = parse_hours(name, args)?;
    let now = ctx.now;
    Ok(Box::new(move |crumb: &Crumb| {
        crumb
            .created_at
            .is_some_and(|created| within_hours(now, created, hours))
    }))
}

fn is_modified_since_hours(ctx: &RuleContext, name: &str, args: &[String]) -> Result<Filter, RuleError> {
    let hours = parse_hours(name, args)?;
    let now = ctx.now;
    Ok(Box::new(move |crumb: &Crumb| {
        crumb
            .last_touched()
            .is_some_and(|touched| within_hours(now, touched, hours))
    }))
}

fn is_one_of(ctx: &RuleContext, _: &str, args: &[String]) -> Result<Filter, RuleError> {
    let markers: Vec<String> = args.iter().filter_map(|a| ctx.markers.resolve(a)).map(str::to_string).collect();
    Ok(Box::new(move |crumb: &Crumb| markers.iter().any(|m| *m == crumb.marker)))
}

fn is_none_of(ctx: &RuleContext, _: &str, args: &[String]) -> Result<Filter, RuleError> {
    let markers: Vec<String> = args.iter().filter_map(|a| ctx.markers.resolve(a)).map(str::to_string).collect();
    Ok(Box::new(move |crumb: &Crumb| markers.iter().all(|m| *m != crumb.marker)))
}

fn sort_none(_: &RuleContext) -> Sort {
    Sort::Keep
}

fn sort_reverse(_: &RuleContext) -> Sort {
    Sort::Reverse
}

fn sort_marked(_: &RuleContext) -> Sort {
    Sort::By(Box::new(|a: &Crumb, b: &Crumb| a.is_marked().cmp(&b.is_marked())))
}

fn sort_marked_order(ctx: &RuleContext, _: &str, args: &[String]) -> Result<Sort, RuleError> {
    let order = resolve_markers(ctx, args);
    let rank = move |crumb: &Crumb| {
        order
            .iter()
            .position(|m| *m == crumb.marker)
            .unwrap_or(order.len())
    };
    Ok(Sort::By(Box::new(move |a: &Crumb, b: &Crumb| rank(a).cmp(&rank(b)))))
}
