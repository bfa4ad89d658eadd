//! Filtered and sorted views over the lines of a crumb file
//!
//! Every non-blank line that parses becomes a crumb paired with its
//! physical line number. The sort passes run over the full set first and
//! the filter runs afterwards, so ordering rules always see every crumb.

use super::crumb::{Crumb, CrumbParser};
use super::rules::Sort;

/// The display-ordered result of a query
///
/// `crumbs[i]` was read from physical line `line_numbers[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    pub crumbs: Vec<Crumb>,
    pub line_numbers: Vec<usize>,
}

impl View {
    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }

    /// Iterates over `(selector, line number, crumb)`, selectors starting at 1
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, &Crumb)> {
        self.crumbs
            .iter()
            .zip(&self.line_numbers)
            .enumerate()
            .map(|(i, (crumb, &line))| (i + 1, line, crumb))
    }

    /// Crumb shown at a 1-based display position
    pub fn at(&self, selector: usize) -> Option<&Crumb> {
        selector.checked_sub(1).and_then(|i| self.crumbs.get(i))
    }

    /// Crumb read from a physical line
    pub fn on_line(&self, line_number: usize) -> Option<&Crumb> {
        self.line_numbers
            .iter()
            .position(|&l| l == line_number)
            .map(|i| &self.crumbs[i])
    }
}

/// Runs the sort passes then the filter over `lines`
pub fn query<S: AsRef<str>>(
    lines: &[S],
    parser: &CrumbParser,
    filter: impl Fn(&Crumb) -> bool,
    sorts: &[Sort],
) -> View {
    let mut entries: Vec<(Crumb, usize)> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.as_ref().is_empty())
        .filter_map(|(number, line)| parser.parse(line.as_ref()).map(|crumb| (crumb, number)))
        .collect();

    for sort in sorts {
        sort.apply(&mut entries, |(crumb, _)| crumb);
    }

    let (crumbs, line_numbers): (Vec<_>, Vec<_>) = entries.into_iter().filter(|(crumb, _)| filter(crumb)).unzip();

    View {
        crumbs,
        line_numbers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crumb::{parse_date, MarkerVocabulary};
    use crate::domain::rules::{RuleContext, RuleDescriptor, RuleRegistry};

    struct Fixture {
        markers: MarkerVocabulary,
        parser: CrumbParser,
        registry: RuleRegistry,
    }

    impl Fixture {
        fn new(markers: &[&str]) -> Self {
            let markers = MarkerVocabulary::new(markers.iter().copied()).unwrap();
            let parser = CrumbParser::new(&markers).unwrap();
            Self {
                markers,
                parser,
                registry: RuleRegistry::new(),
            }
        }

        fn run(&self, lines: &[&str], filters: &[RuleDescriptor], sorts: &[RuleDescriptor]) -> View {
            let ctx = RuleContext {
                markers: &self.markers,
                now: parse_date("2024-01-01 00:00:00").unwrap(),
            };
            let filter = self.registry.build_filter(filters, &ctx).unwrap();
            let sorts = self.registry.build_sorts(sorts, &ctx).unwrap();
            query(lines, &self.parser, filter, &sorts)
        }
    }

    fn texts(view: &View) -> Vec<&str> {
        view.crumbs.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn blank_lines_keep_their_numbers() {
        let f = Fixture::new(&["m"]);
        let view = f.run(&["2023-01-01 10:00:00 a", "", "2023-01-01 10:00:00 b", ""], &[], &[]);

        assert_eq!(texts(&view), vec!["a", "b"]);
        assert_eq!(view.line_numbers, vec![0, 2]);
    }

    #[test]
    fn impossible_dates_are_listed_as_text() {
        let f = Fixture::new(&["m"]);
        let view = f.run(&["2023-99-01 10:00:00 broken", "2023-01-01 10:00:00 fine"], &[], &[]);

        assert_eq!(texts(&view), vec!["2023-99-01 10:00:00 broken", "fine"]);
        assert_eq!(view.line_numbers, vec![0, 1]);
        assert_eq!(view.crumbs[0].created_at, None);
    }

    #[test]
    fn filter_keeps_sorted_order() {
        let f = Fixture::new(&["m"]);
        let lines = ["m a", "b", "m c", "d"];
        let view = f.run(
            &lines,
            &[RuleDescriptor::new("isMarked")],
            &[RuleDescriptor::new("sortReverse")],
        );

        assert_eq!(texts(&view), vec!["c", "a"]);
        assert_eq!(view.line_numbers, vec![2, 0]);
    }

    #[test]
    fn later_sort_passes_dominate() {
        let f = Fixture::new(&["m", "x"]);
        let lines = ["m a", "b", "x c", "m d"];
        let view = f.run(
            &lines,
            &[],
            &[RuleDescriptor::new("sortReverse"), RuleDescriptor::new("sortMarked")],
        );

        // Unmarked first, ties keep the reversed order
        assert_eq!(texts(&view), vec!["b", "d", "c", "a"]);
        assert_eq!(view.line_numbers, vec![1, 3, 2, 0]);
    }

    #[test]
    fn sorting_sees_the_whole_file_before_filtering() {
        let f = Fixture::new(&["x", "y"]);
        let lines = ["x A", "y B", "x C"];
        let view = f.run(
            &lines,
            &[RuleDescriptor::with_args("is", "y")],
            &[RuleDescriptor::with_args("sortMarkedOrder", "x")],
        );

        assert_eq!(texts(&view), vec!["B"]);
        assert_eq!(view.line_numbers, vec![1]);

        let unfiltered = f.run(&lines, &[], &[RuleDescriptor::with_args("sortMarkedOrder", "x")]);
        assert_eq!(texts(&unfiltered), vec!["A", "C", "B"]);
        assert_eq!(unfiltered.line_numbers, vec![0, 2, 1]);
    }

    #[test]
    fn entries_and_lookups() {
        let f = Fixture::new(&["m"]);
        let view = f.run(&["", "a", "m b"], &[], &[RuleDescriptor::new("sortReverse")]);

        let entries: Vec<_> = view.entries().map(|(s, l, c)| (s, l, c.text.as_str())).collect();
        assert_eq!(entries, vec![(1, 2, "b"), (2, 1, "a")]);

        assert_eq!(view.at(1).map(|c| c.text.as_str()), Some("b"));
        assert!(view.at(0).is_none());
        assert!(view.at(3).is_none());
        assert_eq!(view.on_line(1).map(|c| c.text.as_str()), Some("a"));
        assert!(view.on_line(0).is_none());
    }
}
