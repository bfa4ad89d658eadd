//! Read-modify-write over selected lines
//!
//! A transform maps a crumb to its replacement, or to `None` to delete it.
//! Only selected lines are touched; everything else, including lines that
//! are not crumbs, is written back byte for byte. A crumb whose transform
//! leaves it equal is not reformatted, so its modified stamp stays put.

use chrono::NaiveDateTime;

use super::crumb::{one_line, Crumb, CrumbParser};

/// Built-in transforms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Replace the body
    Edit(String),
    /// Set the marker
    Mark(String),
    /// Clear the marker
    Unmark,
    /// Drop the crumb
    Delete,
}

impl Transform {
    pub fn apply(&self, mut crumb: Crumb) -> Option<Crumb> {
        match self {
            Transform::Edit(text) => crumb.text = one_line(text),
            Transform::Mark(marker) => crumb.marker = marker.clone(),
            Transform::Unmark => crumb.marker.clear(),
            Transform::Delete => return None,
        }
        Some(crumb)
    }

    /// Short command name, as shown in prompts
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Edit(_) => "ed",
            Transform::Mark(_) => "ma",
            Transform::Unmark => "um",
            Transform::Delete => "rm",
        }
    }
}

/// Result of a rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    /// New file content, one crumb per `\n`-terminated line
    pub content: String,
    /// Lines reformatted
    pub changed: usize,
    /// Lines removed
    pub deleted: usize,
}

impl Rewrite {
    pub fn is_noop(&self) -> bool {
        self.changed == 0 && self.deleted == 0
    }
}

/// Applies `transform` to the selected physical lines and renders the file
///
/// Blank lines, including those left behind by deletions, are dropped.
pub fn rewrite<S: AsRef<str>>(
    lines: &[S],
    selection: &[usize],
    parser: &CrumbParser,
    mut transform: impl FnMut(Crumb) -> Option<Crumb>,
    now: NaiveDateTime,
) -> Rewrite {
    let mut lines: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
    let mut changed = 0;
    let mut deleted = 0;

    for &number in selection {
        let Some(line) = lines.get(number).filter(|l| !l.is_empty()) else {
            continue;
        };
        let Some(crumb) = parser.parse(line) else {
            continue;
        };

        match transform(crumb.clone()) {
            None => {
                lines[number].clear();
                deleted += 1;
            }
            Some(updated) if updated != crumb => {
                lines[number] = updated.to_line(now);
                changed += 1;
            }
            Some(_) => {}
        }
    }

    let content = lines
        .iter()
        .filter(|l| !l.is_empty())
        .fold(String::new(), |mut out, line| {
            out.push_str(line);
            out.push('\n');
            out
        });

    Rewrite {
        content,
        changed,
        deleted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crumb::{parse_date, MarkerVocabulary};
    use crate::domain::query::query;
    use crate::domain::rules::{RuleContext, RuleDescriptor, RuleRegistry};
    use crate::domain::selection::resolve;

    fn parser() -> CrumbParser {
        CrumbParser::new(&MarkerVocabulary::new(["m", "x"]).unwrap()).unwrap()
    }

    fn now() -> NaiveDateTime {
        parse_date("2024-05-05 05:05:05").unwrap()
    }

    fn split(content: &str) -> Vec<&str> {
        content.split('\n').collect()
    }

    #[test]
    fn transforms() {
        let crumb = Crumb::new("text");

        assert_eq!(Transform::Edit("new".into()).apply(crumb.clone()).unwrap().text, "new");
        assert_eq!(Transform::Mark("m".into()).apply(crumb.clone()).unwrap().marker, "m");
        assert_eq!(Transform::Unmark.apply(Transform::Mark("m".into()).apply(crumb.clone()).unwrap()).unwrap().marker, "");
        assert!(Transform::Delete.apply(crumb).is_none());
    }

    #[test]
    fn edit_keeps_the_crumb_on_one_line() {
        let lines = split("2023-01-01 10:00:00 a\n2023-01-01 10:00:00 b\n");
        let edit = Transform::Edit("first\nsecond".into());
        let result = rewrite(&lines, &[0], &parser(), |c| edit.apply(c), now());

        assert_eq!(
            result.content,
            "2024-05-05 05:05:05 2023-01-01 10:00:00 first second\n2023-01-01 10:00:00 b\n"
        );
    }

    #[test]
    fn unchanged_crumb_is_left_byte_identical() {
        let mark = Transform::Mark("m".into());
        let lines = split("2023-01-01 10:00:00 m already\n");
        let result = rewrite(&lines, &[0], &parser(), |c| mark.apply(c), now());
        assert!(result.is_noop());
        assert_eq!(result.content, "2023-01-01 10:00:00 m already\n");
    }

    #[test]
    fn changed_crumb_is_restamped() {
        let lines = split("2023-01-01 10:00:00 hello\n");
        let result = rewrite(&lines, &[0], &parser(), |c| Transform::Mark("x".into()).apply(c), now());

        assert_eq!(result.changed, 1);
        assert_eq!(result.content, "2024-05-05 05:05:05 2023-01-01 10:00:00 x hello\n");
    }

    #[test]
    fn deletion_compacts_the_file() {
        let lines = split("2023-01-01 10:00:00 a\n2023-01-01 10:00:00 b\n2023-01-01 10:00:00 c\n");
        let result = rewrite(&lines, &[1], &parser(), |c| Transform::Delete.apply(c), now());

        assert_eq!(result.deleted, 1);
        assert_eq!(result.content, "2023-01-01 10:00:00 a\n2023-01-01 10:00:00 c\n");
        assert_eq!(result.content.lines().count(), 2);
    }

    #[test]
    fn unselected_lines_survive_verbatim() {
        let lines = split("2023-13-99 99:99:99 not a crumb\n\n2023-01-01 10:00:00 a\n  odd spacing\n");
        let result = rewrite(&lines, &[2], &parser(), |c| Transform::Delete.apply(c), now());

        assert_eq!(result.content, "2023-13-99 99:99:99 not a crumb\n  odd spacing\n");
    }

    #[test]
    fn stale_selections_are_skipped() {
        let lines = split("2023-01-01 10:00:00 a\n\n2023-13-99 99:99:99 bad\n");
        let result = rewrite(&lines, &[1, 42], &parser(), |c| Transform::Delete.apply(c), now());

        assert!(result.is_noop());
        assert_eq!(result.content, "2023-01-01 10:00:00 a\n2023-13-99 99:99:99 bad\n");
    }

    #[test]
    fn impossible_date_survives_marking_as_text() {
        let lines = split("2023-02-30 10:00:00 was not a real day\n");
        let result = rewrite(&lines, &[0], &parser(), |c| Transform::Mark("m".into()).apply(c), now());

        assert_eq!(
            result.content,
            "2024-05-05 05:05:05 2024-05-05 05:05:05 m 2023-02-30 10:00:00 was not a real day\n"
        );
    }

    #[test]
    fn unmark_without_vocabulary_keeps_text() {
        let parser = CrumbParser::new(&MarkerVocabulary::new(Vec::<String>::new()).unwrap()).unwrap();
        let lines = split("2023-01-01 10:00:00 m call the plumber\n");
        let unmarked = rewrite(&lines, &[0], &parser, |c| Transform::Unmark.apply(c), now());

        assert!(unmarked.is_noop());
        assert_eq!(unmarked.content, "2023-01-01 10:00:00 m call the plumber\n");

        let edited = rewrite(&lines, &[0], &parser, |c| Transform::Edit("call the roofer".into()).apply(c), now());
        assert_eq!(edited.content, "2024-05-05 05:05:05 2023-01-01 10:00:00 call the roofer\n");
    }

    #[test]
    fn legacy_line_is_not_rewritten_when_unchanged() {
        let lines = split("no dates here\n");
        let result = rewrite(&lines, &[0], &parser(), |c| Transform::Unmark.apply(c), now());

        assert!(result.is_noop());
        assert_eq!(result.content, "no dates here\n");
    }

    #[test]
    fn legacy_line_gains_creation_when_changed() {
        let lines = split("no dates here\n");
        let result = rewrite(&lines, &[0], &parser(), |c| Transform::Mark("m".into()).apply(c), now());

        assert_eq!(result.content, "2024-05-05 05:05:05 2024-05-05 05:05:05 m no dates here\n");
    }

    #[test]
    fn mark_then_unmark_through_a_filtered_view() {
        let markers = MarkerVocabulary::new(["m"]).unwrap();
        let parser = CrumbParser::new(&markers).unwrap();
        let registry = RuleRegistry::new();
        let ctx = RuleContext {
            markers: &markers,
            now: now(),
        };
        let filter = registry.build_filter(&[RuleDescriptor::new("isMarked")], &ctx).unwrap();

        let content = "2023-01-01 10:00:00 hello\n2023-01-01 10:00:00 m world\n";
        let lines = split(content);
        let view = query(&lines, &parser, &filter, &[]);

        assert_eq!(view.len(), 1);
        assert_eq!(view.crumbs[0].text, "world");

        let selection = resolve("1", &view.line_numbers);
        assert_eq!(selection, vec![1]);

        let marked = rewrite(&lines, &selection, &parser, |c| Transform::Mark("m".into()).apply(c), now());
        assert_eq!(marked.content, content);

        let unmarked = rewrite(&lines, &selection, &parser, |c| Transform::Unmark.apply(c), now());
        assert_eq!(
            unmarked.content,
            "2023-01-01 10:00:00 hello\n2024-05-05 05:05:05 2023-01-01 10:00:00 world\n"
        );
    }
}
