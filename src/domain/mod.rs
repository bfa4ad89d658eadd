//! Domain models for crumb
//!
//! Record parsing, filter/sort rules, views, selections and rewrites.
//! Nothing in here touches the filesystem or the terminal.

mod crumb;
mod query;
mod rules;
mod selection;
mod transaction;

pub use crumb::{
    format_date, now, parse_date, Crumb, CrumbParser, MarkerVocabulary, VocabularyError,
    DATE_FORMAT,
};
pub use query::{query, View};
pub use rules::{
    Comparator, Filter, FilterEdit, RuleContext, RuleDescriptor, RuleError, RuleRegistry, Sort,
};
pub use selection::resolve;
pub use transaction::{rewrite, Rewrite, Transform};
