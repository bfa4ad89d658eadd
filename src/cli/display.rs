//! Rendering of crumb listings
//!
//! Text listings print a header (the directory) followed by one line per
//! crumb, each prefixed with its selector. The selector is the 1-based
//! display position, which is what selections refer to.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{Crumb, View};
use crate::storage::Config;

/// One crumb in a JSON listing
#[derive(Debug, Serialize)]
pub struct ListedCrumb<'a> {
    pub selector: usize,
    /// 1-based line in the crumb file
    pub line: usize,
    #[serde(flatten)]
    pub crumb: &'a Crumb,
}

/// JSON listing of one crumb file
#[derive(Debug, Serialize)]
pub struct FileListing<'a> {
    pub dir: String,
    pub crumbs: Vec<ListedCrumb<'a>>,
}

impl<'a> FileListing<'a> {
    pub fn new(dir: &Path, view: &'a View) -> Self {
        Self {
            dir: dir.display().to_string(),
            crumbs: view
                .entries()
                .map(|(selector, line, crumb)| ListedCrumb {
                    selector,
                    line: line + 1,
                    crumb,
                })
                .collect(),
        }
    }
}

/// Crumb text wrapped in its marker affixes
pub fn format_crumb(config: &Config, crumb: &Crumb) -> String {
    config.marker_affix(&crumb.marker).wrap(&crumb.text)
}

/// Directory header wrapped in the header affixes
pub fn format_header(config: &Config, dir: &Path) -> String {
    config.header.wrap(&dir.display().to_string())
}

/// Writes the header and every crumb of `view` with its selector
pub fn write_listing<W: Write>(w: &mut W, config: &Config, dir: &Path, view: &View) -> io::Result<()> {
    writeln!(w, "{}", format_header(config, dir))?;
    for (selector, _, crumb) in view.entries() {
        writeln!(
            w,
            "{}{}",
            config.selector.wrap(&selector.to_string()),
            format_crumb(config, crumb)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_date;
    use crate::storage::Affix;

    fn config() -> Config {
        let mut config = Config::default();
        config.markers.insert("x".to_string(), Affix::new("[x] ", ""));
        config.unmarked = Affix::new("[ ] ", "");
        config.header = Affix::new("== ", " ==");
        config.selector = Affix::new("", ". ");
        config
    }

    fn view() -> View {
        let mut done = Crumb::new("done");
        done.marker = "x".to_string();
        done.created_at = parse_date("2023-01-01 10:00:00");
        View {
            crumbs: vec![Crumb::new("open"), done],
            line_numbers: vec![2, 0],
        }
    }

    #[test]
    fn listing_uses_affixes_and_selectors() {
        let mut buf = Vec::new();
        write_listing(&mut buf, &config(), Path::new("/tmp/work"), &view()).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "== /tmp/work ==\n1. [ ] open\n2. [x] done\n"
        );
    }

    #[test]
    fn unknown_marker_falls_back_to_unmarked_affix() {
        let mut crumb = Crumb::new("odd");
        crumb.marker = "zz".to_string();
        assert_eq!(format_crumb(&config(), &crumb), "[ ] odd");
    }

    #[test]
    fn json_listing_carries_selector_and_line() {
        let view = view();
        let listing = FileListing::new(Path::new("/tmp/work"), &view);
        let json = serde_json::to_value(&listing).unwrap();

        assert_eq!(json["dir"], "/tmp/work");
        assert_eq!(json["crumbs"][0]["selector"], 1);
        assert_eq!(json["crumbs"][0]["line"], 3);
        assert_eq!(json["crumbs"][0]["text"], "open");
        assert_eq!(json["crumbs"][1]["marker"], "x");
        assert_eq!(json["crumbs"][1]["created_at"], "2023-01-01T10:00:00");
        assert!(json["crumbs"][1]["modified_at"].is_null());
    }
}
