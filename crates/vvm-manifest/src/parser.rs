//! Line-oriented parsing of manifest text.
//!
//! Blank lines and `#` comments are skipped; every other line is trimmed
//! and split on `|` without a limit. Field widths are not enforced here.

use std::path::Path;
use std::str::FromStr;

use vvm_common::constants::{COMMENT_PREFIX, FIELD_SEPARATOR};
use vvm_common::error::{Result, VvmError};

/// How a single line of manifest text is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Data,
}

fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.starts_with(COMMENT_PREFIX) {
        LineKind::Comment
    } else {
        LineKind::Data
    }
}

/// One data line split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// 1-based line number in the source text.
    pub line: usize,
    /// Fields produced by splitting the trimmed line on `|`.
    pub fields: Vec<String>,
}

impl RawEntry {
    /// The first field, which names the repository.
    #[must_use]
    pub fn name(&self) -> &str {
        self.fields.first().map_or("", String::as_str)
    }

    /// The trimmed line text this entry was split from.
    #[must_use]
    pub fn text(&self) -> String {
        let separator = FIELD_SEPARATOR.to_string();
        self.fields.join(separator.as_str())
    }

    /// Returns `(name, url, branch, install_method)` when the entry has
    /// exactly four fields.
    #[must_use]
    pub fn as_quad(&self) -> Option<(&str, &str, &str, &str)> {
        match self.fields.as_slice() {
            [name, url, branch, method] => {
                Some((name.as_str(), url.as_str(), branch.as_str(), method.as_str()))
            }
            _ => None,
        }
    }
}

/// Per-kind line counts for a manifest text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineTally {
    /// Every line in the text.
    pub total: usize,
    /// Lines whose first non-whitespace character is `#`.
    pub comments: usize,
    /// Empty or all-whitespace lines.
    pub blanks: usize,
}

impl LineTally {
    /// Counts the lines of `text` by kind.
    #[must_use]
    pub fn count(text: &str) -> Self {
        text.lines().fold(Self::default(), |mut tally, line| {
            tally.total += 1;
            match classify(line) {
                LineKind::Blank => tally.blanks += 1,
                LineKind::Comment => tally.comments += 1,
                LineKind::Data => {}
            }
            tally
        })
    }

    /// Lines that are neither blank nor comments.
    #[must_use]
    pub const fn data_lines(&self) -> usize {
        self.total.saturating_sub(self.comments + self.blanks)
    }
}

/// A parsed manifest: its entries in file order plus its line tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Data lines in the order they appear in the file.
    pub entries: Vec<RawEntry>,
    /// Line counts computed over the same text.
    pub tally: LineTally,
}

impl Manifest {
    /// Reads and parses a manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| VvmError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let manifest = parse(&text);
        tracing::info!(
            path = %path.display(),
            entries = manifest.entries.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for Manifest {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(parse(s))
    }
}

/// Parses manifest text into its data entries.
///
/// Never fails: a line with the wrong number of fields still becomes an
/// entry and is caught later by the field-count rule.
#[must_use]
pub fn parse(text: &str) -> Manifest {
    let entries = text
        .lines()
        .enumerate()
        .filter(|(_, line)| classify(line) == LineKind::Data)
        .map(|(idx, line)| RawEntry {
            line: idx + 1,
            fields: line
                .trim()
                .split(FIELD_SEPARATOR)
                .map(str::to_string)
                .collect(),
        })
        .collect();

    Manifest {
        entries,
        tally: LineTally::count(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_entry() {
        let m = parse("repoA|git@github.com:org/repoA.git|main|pip_editable\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m.entries[0].line, 1);
        assert_eq!(
            m.entries[0].as_quad(),
            Some((
                "repoA",
                "git@github.com:org/repoA.git",
                "main",
                "pip_editable"
            ))
        );
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let m = parse("# comment\n\nrepoA|git@github.com:org/repoA.git|main|pip_editable\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m.entries[0].line, 3);
        assert_eq!(m.tally.total, 3);
        assert_eq!(m.tally.comments, 1);
        assert_eq!(m.tally.blanks, 1);
    }

    #[test]
    fn indented_hash_is_a_comment() {
        let m = parse("   # indented comment\n\t\n");
        assert!(m.is_empty());
        assert_eq!(m.tally.comments, 1);
        assert_eq!(m.tally.blanks, 1);
    }

    #[test]
    fn hash_inside_a_line_is_data() {
        let m = parse("repo#1|url|main|reference");
        assert_eq!(m.entries[0].name(), "repo#1");
    }

    #[test]
    fn parse_keeps_wrong_width_lines() {
        let m = parse("a|b|c\na|b|c|d|e\nsolo\n");
        let widths: Vec<usize> = m.entries.iter().map(|e| e.fields.len()).collect();
        assert_eq!(widths, vec![3, 5, 1]);
        assert!(m.entries.iter().all(|e| e.as_quad().is_none()));
    }

    #[test]
    fn parse_trims_line_but_not_fields() {
        let m = parse("  repoA | url |main|reference  \n");
        assert_eq!(m.entries[0].fields, vec!["repoA ", " url ", "main", "reference"]);
    }

    #[test]
    fn parse_empty_fields_are_kept() {
        let m = parse("repoA|||\n");
        assert_eq!(m.entries[0].fields, vec!["repoA", "", "", ""]);
    }

    #[test]
    fn parse_handles_crlf() {
        let m = parse("# c\r\nrepoA|u|main|reference\r\n");
        assert_eq!(m.entries[0].fields[3], "reference");
        assert_eq!(m.tally.total, 2);
    }

    #[test]
    fn text_rejoins_fields() {
        let m = parse("a|b|c\n");
        assert_eq!(m.entries[0].text(), "a|b|c");
    }

    #[test]
    fn data_lines_match_entry_count() {
        let text = "# header\n\na|b|c|d\n  \n# x\ne|f|g|h\nbroken\n";
        let m = parse(text);
        assert_eq!(m.tally.data_lines(), m.len());
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.conf");
        std::fs::write(&path, "repoA|git@github.com:org/repoA.git|main|reference\n").unwrap();
        let m = Manifest::load(&path).unwrap();
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("absent.conf")).unwrap_err();
        assert!(matches!(err, VvmError::Io { .. }));
    }
}
