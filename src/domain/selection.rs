//! Selection expressions
//!
//! Users pick crumbs by their 1-based position in the displayed list:
//!
//! - `3` - a single crumb
//! - `1 4 5` - several crumbs
//! - `2-6` - an inclusive, ascending range
//!
//! Positions are translated to physical line numbers through the view.
//! Anything out of range or malformed is dropped without complaint.

/// Resolves `input` against the view's line numbers
///
/// The result is in selection order with duplicates removed.
pub fn resolve(input: &str, line_numbers: &[usize]) -> Vec<usize> {
    if let Some(line) = input.parse().ok().and_then(|p| to_line(p, line_numbers)) {
        return vec![line];
    }

    let positions: Vec<i64> = if input.contains(' ') {
        input.split(' ').filter_map(|token| token.parse().ok()).collect()
    } else if let Some((start, end)) = input.split_once('-') {
        match (start.parse::<i64>(), end.parse::<i64>()) {
            // Positions past the view select nothing, so the range is clamped
            (Ok(start), Ok(end)) => (start.max(1)..=end.min(line_numbers.len() as i64)).collect(),
            _ => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let mut selected = Vec::new();
    for line in positions.into_iter().filter_map(|p| to_line(p, line_numbers)) {
        if !selected.contains(&line) {
            selected.push(line);
        }
    }
    selected
}

fn to_line(position: i64, line_numbers: &[usize]) -> Option<usize> {
    let index = usize::try_from(position).ok()?.checked_sub(1)?;
    line_numbers.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LINES: [usize; 4] = [7, 2, 5, 0];

    #[test]
    fn single_position() {
        assert_eq!(resolve("1", &LINES), vec![7]);
        assert_eq!(resolve("4", &LINES), vec![0]);
    }

    #[test]
    fn single_position_out_of_range() {
        assert!(resolve("0", &LINES).is_empty());
        assert!(resolve("5", &LINES).is_empty());
        assert!(resolve("-1", &LINES).is_empty());
    }

    #[test]
    fn space_separated_list_skips_bad_tokens() {
        assert_eq!(resolve("3 1 x 9", &LINES), vec![5, 7]);
        assert_eq!(resolve("2 ", &LINES), vec![2]);
    }

    #[test]
    fn list_is_a_union() {
        assert_eq!(resolve("2 2 3", &LINES), vec![2, 5]);
    }

    #[test]
    fn ascending_range() {
        assert_eq!(resolve("2-4", &LINES), vec![2, 5, 0]);
        assert_eq!(resolve("3-9", &LINES), vec![5, 0]);
        assert_eq!(resolve("0-1", &LINES), vec![7]);
    }

    #[test]
    fn descending_range_is_empty() {
        assert!(resolve("3-1", &LINES).is_empty());
    }

    #[test]
    fn malformed_input_selects_nothing() {
        assert!(resolve("", &LINES).is_empty());
        assert!(resolve("a-b", &LINES).is_empty());
        assert!(resolve("1-2-3", &LINES).is_empty());
        assert!(resolve("1,2", &LINES).is_empty());
        assert!(resolve("1-", &LINES).is_empty());
    }

    #[test]
    fn empty_view_selects_nothing() {
        assert!(resolve("1", &[]).is_empty());
        assert!(resolve("1-3", &[]).is_empty());
    }

    proptest! {
        #[test]
        fn range_matches_list(
            lines in proptest::collection::vec(0usize..1000, 3..20),
            start in 1usize..25,
            len in 0usize..10,
        ) {
            let end = start + len;
            let list: Vec<String> = (start..=end).map(|i| i.to_string()).collect();

            let by_range = resolve(&format!("{}-{}", start, end), &lines);
            let by_list = if list.len() > 1 {
                resolve(&list.join(" "), &lines)
            } else {
                resolve(&list[0], &lines)
            };

            prop_assert_eq!(by_range, by_list);
        }

        #[test]
        fn first_three_by_range_or_list(lines in proptest::collection::vec(0usize..1000, 3..20)) {
            prop_assert_eq!(resolve("1-3", &lines), resolve("1 2 3", &lines));
        }
    }
}
