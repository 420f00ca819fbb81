//! Console report scanning.
//!
//! This module extracts size report lines from free-form build console output.
//! A [`ReportScanner`] wraps one pattern with named capture groups and yields
//! [`RawMatch`] values lazily, left to right, without overlap. Anything that is
//! not a report line is skipped silently: the surrounding console output is
//! noisy by nature, so a non-matching line is never an error.
//!
//! A typical report looks like:
//!
//! ```text
//! Page                              Size     First Load JS
//! ┌ ○ /                             2.3 kB         80 kB
//! ├ ○ /about                        1.1 kB         79 kB
//! └ ● /blog/[slug]                  512 B          78 kB
//! + First Load JS shared by all     78 kB
//!   ├ chunks/framework.4a1c2b.js    42 kB
//!   └ runtime/main.9f8e7d.js        7 kB
//! ```

use regex::{Captures, Regex};

use crate::error::{Result, SnapshotError};
use crate::utils::invert_size;

/// Default pattern for one page report line.
///
/// Whitespace is horizontal only so that a match never spans two lines.
pub const PAGE_REPORT_PATTERN: &str = concat!(
    r"(?P<treeViewPresentation>[┌├└▲●])[ \t]+",
    r"(?:(?P<fileType>[λ○●ƒ])[ \t]+)?",
    r"(?P<pageUrl>\S+)[ \t]+",
    r"(?P<sizeFormatted>[0-9.]+)[ \t]+",
    r"(?P<sizeUnit>\w+)",
);

/// Capture groups every report pattern must define.
const REQUIRED_GROUPS: [&str; 4] = [
    "treeViewPresentation",
    "pageUrl",
    "sizeFormatted",
    "sizeUnit",
];

/// Glyph at the start of a report line. Only used to recognize the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeGlyph {
    /// `┌`
    First,
    /// `├`
    Branch,
    /// `└`
    Last,
    /// `▲`
    Marker,
    /// `●`
    Bullet,
}

impl TreeGlyph {
    /// Parse a glyph, returning `None` for anything outside the known set.
    #[must_use]
    pub fn from_glyph(glyph: &str) -> Option<Self> {
        match glyph {
            "┌" => Some(Self::First),
            "├" => Some(Self::Branch),
            "└" => Some(Self::Last),
            "▲" => Some(Self::Marker),
            "●" => Some(Self::Bullet),
            _ => None,
        }
    }
}

/// Optional rendering-mode glyph following the tree glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    /// `λ`, rendered per request
    Server,
    /// `○`, static
    Static,
    /// `●`, generated at build time
    Generated,
    /// `ƒ`, dynamic
    Dynamic,
}

impl FileType {
    #[must_use]
    pub fn from_glyph(glyph: &str) -> Option<Self> {
        match glyph {
            "λ" => Some(Self::Server),
            "○" => Some(Self::Static),
            "●" => Some(Self::Generated),
            "ƒ" => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// One report line, borrowed from the scanned text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMatch<'t> {
    pub tree: TreeGlyph,
    pub file_type: Option<FileType>,
    pub page_url: &'t str,
    pub size_formatted: &'t str,
    pub size_unit: &'t str,
}

impl RawMatch<'_> {
    /// Size of this line in bytes.
    ///
    /// # Errors
    ///
    /// Propagates the unit inversion errors from [`invert_size`].
    pub fn size_bytes(&self) -> Result<u64> {
        invert_size(self.size_formatted, self.size_unit)
    }
}

/// Lazy extractor of report lines from console text.
#[derive(Debug, Clone)]
pub struct ReportScanner {
    pattern: Regex,
}

impl ReportScanner {
    /// Compile a scanner from a pattern with the report capture groups.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidPattern`] if the pattern does not compile
    /// or lacks one of the `treeViewPresentation`, `pageUrl`, `sizeFormatted`,
    /// `sizeUnit` groups.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern =
            Regex::new(pattern).map_err(|e| SnapshotError::InvalidPattern(e.to_string()))?;

        for group in REQUIRED_GROUPS {
            if !pattern.capture_names().flatten().any(|name| name == group) {
                return Err(SnapshotError::InvalidPattern(format!(
                    "missing capture group '{group}'"
                )));
            }
        }

        Ok(Self { pattern })
    }

    /// Scanner for the default page report format.
    ///
    /// # Errors
    ///
    /// Only fails if [`PAGE_REPORT_PATTERN`] itself is broken.
    pub fn page_report() -> Result<Self> {
        Self::new(PAGE_REPORT_PATTERN)
    }

    /// Iterate over the report lines in `text`.
    ///
    /// Each call starts a fresh scan from the beginning of `text`.
    pub fn scan<'t>(&self, text: &'t str) -> impl Iterator<Item = RawMatch<'t>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|captures| Self::to_raw_match(&captures))
    }

    fn to_raw_match<'t>(captures: &Captures<'t>) -> Option<RawMatch<'t>> {
        let tree = TreeGlyph::from_glyph(captures.name("treeViewPresentation")?.as_str())?;
        let file_type = match captures.name("fileType") {
            Some(glyph) => Some(FileType::from_glyph(glyph.as_str())?),
            None => None,
        };

        Some(RawMatch {
            tree,
            file_type,
            page_url: captures.name("pageUrl")?.as_str(),
            size_formatted: captures.name("sizeFormatted")?.as_str(),
            size_unit: captures.name("sizeUnit")?.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> ReportScanner {
        ReportScanner::page_report().unwrap()
    }

    #[test]
    fn test_no_matching_lines_yields_nothing() {
        let text = "info  - Creating an optimized production build\nCompiled successfully.\n";
        assert_eq!(scanner().scan(text).count(), 0);
        assert_eq!(scanner().scan("").count(), 0);
    }

    #[test]
    fn test_two_lines_are_separated() {
        let text = "▲  /about  2.3  kB\n●  ○  chunks/xyz123.js  500  B\n";
        let matches: Vec<_> = scanner().scan(text).collect();

        assert_eq!(matches.len(), 2);

        assert_eq!(matches[0].tree, TreeGlyph::Marker);
        assert_eq!(matches[0].file_type, None);
        assert_eq!(matches[0].page_url, "/about");
        assert_eq!(matches[0].size_formatted, "2.3");
        assert_eq!(matches[0].size_unit, "kB");

        assert_eq!(matches[1].tree, TreeGlyph::Bullet);
        assert_eq!(matches[1].file_type, Some(FileType::Static));
        assert_eq!(matches[1].page_url, "chunks/xyz123.js");
        assert_eq!(matches[1].size_formatted, "500");
        assert_eq!(matches[1].size_unit, "B");
    }

    #[test]
    fn test_first_load_column_is_ignored() {
        let text = "┌ ○ /                             2.3 kB         80 kB\n";
        let matches: Vec<_> = scanner().scan(text).collect();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].page_url, "/");
        assert_eq!(matches[0].size_bytes().unwrap(), 2_300);
    }

    #[test]
    fn test_noise_between_report_lines_is_skipped() {
        let text = "\
Page                              Size     First Load JS
┌ ○ /                             2.3 kB         80 kB
├ λ /api/hello                    0 B            78 kB
└ ● /blog/[slug]                  512 B          78 kB
+ First Load JS shared by all     78 kB
  ├ chunks/framework.4a1c2b.js    42 kB
  └ runtime/main.9f8e7d.js        7 kB

λ  (Server)  server-side renders at runtime
";
        let urls: Vec<_> = scanner().scan(text).map(|m| m.page_url).collect();
        assert_eq!(
            urls,
            vec![
                "/",
                "/api/hello",
                "/blog/[slug]",
                "chunks/framework.4a1c2b.js",
                "runtime/main.9f8e7d.js",
            ]
        );
    }

    #[test]
    fn test_match_never_spans_lines() {
        let text = "├ /orphan\n2.3 kB\n";
        assert_eq!(scanner().scan(text).count(), 0);
    }

    #[test]
    fn test_scan_is_restartable() {
        let scanner = scanner();
        let text = "├ /a 1 kB\n└ /b 2 kB\n";
        assert_eq!(scanner.scan(text).count(), 2);
        assert_eq!(scanner.scan(text).count(), 2);
    }

    #[test]
    fn test_custom_pattern_requires_groups() {
        let err = ReportScanner::new(r"(?P<pageUrl>\S+)").unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidPattern(_)));

        assert!(ReportScanner::new(r"(unclosed").is_err());
    }

    #[test]
    fn test_custom_pattern_with_unknown_glyph_is_skipped() {
        let scanner = ReportScanner::new(
            r"(?P<treeViewPresentation>[*-]) (?P<pageUrl>\S+) (?P<sizeFormatted>[0-9.]+) (?P<sizeUnit>\w+)",
        )
        .unwrap();
        assert_eq!(scanner.scan("* /a 1 kB\n- /b 2 kB\n").count(), 0);
    }

    #[test]
    fn test_glyph_parsing() {
        assert_eq!(TreeGlyph::from_glyph("├"), Some(TreeGlyph::Branch));
        assert_eq!(TreeGlyph::from_glyph("x"), None);
        assert_eq!(FileType::from_glyph("λ"), Some(FileType::Server));
        assert_eq!(FileType::from_glyph("ƒ"), Some(FileType::Dynamic));
        assert_eq!(FileType::from_glyph("?"), None);
    }
}
