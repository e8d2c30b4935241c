//! Structural and content rules for a parsed manifest.
//!
//! Each rule is a standalone check returning its own violations, so rules
//! can be exercised one at a time. [`validate`] runs all of them and only
//! produces typed entries when none report anything.
//!
//! Name uniqueness counts every entry. The per-entry content rules (name
//! shape, URLs, branches, install methods) only look at entries with
//! exactly four fields, so a lone line of the wrong width is reported once,
//! by the field-count rule.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use vvm_common::constants::MANIFEST_FIELD_COUNT;
use vvm_common::types::InstallMethod;

use crate::entry::ManifestEntry;
use crate::parser::{Manifest, RawEntry};
use crate::remote::GitRemote;

/// A validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// Every entry has exactly four fields.
    FieldCount,
    /// No two entries share a name.
    UniqueNames,
    /// The install method is a recognized tag.
    InstallMethod,
    /// The URL is an SSH git remote on the allowed host.
    UrlShape,
    /// The branch is non-empty after trimming.
    BranchNonEmpty,
    /// The name contains no whitespace.
    NameShape,
    /// Entries, comments, and blanks add up to the total line count.
    LineAccounting,
    /// The manifest has at least one entry.
    NonEmpty,
}

impl Rule {
    /// Every rule, in the order [`validate`] runs them.
    pub const ALL: [Self; 8] = [
        Self::NonEmpty,
        Self::LineAccounting,
        Self::FieldCount,
        Self::UniqueNames,
        Self::NameShape,
        Self::UrlShape,
        Self::BranchNonEmpty,
        Self::InstallMethod,
    ];

    /// Kebab-case identifier used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FieldCount => "field-count",
            Self::UniqueNames => "unique-names",
            Self::InstallMethod => "install-method",
            Self::UrlShape => "url-shape",
            Self::BranchNonEmpty => "branch-non-empty",
            Self::NameShape => "name-shape",
            Self::LineAccounting => "line-accounting",
            Self::NonEmpty => "non-empty",
        }
    }

    /// Runs this rule alone against `manifest`.
    #[must_use]
    pub fn check(self, manifest: &Manifest) -> Vec<Violation> {
        match self {
            Self::FieldCount => check_field_count(manifest),
            Self::UniqueNames => check_unique_names(manifest),
            Self::InstallMethod => check_install_methods(manifest),
            Self::UrlShape => check_urls(manifest),
            Self::BranchNonEmpty => check_branches(manifest),
            Self::NameShape => check_name_shape(manifest),
            Self::LineAccounting => check_line_accounting(manifest),
            Self::NonEmpty => check_not_empty(manifest),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a rule name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rule '{0}'")]
pub struct UnknownRule(pub String);

impl FromStr for Rule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

/// One broken rule, attributed to an entry where possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Rule that was broken.
    pub rule: Rule,
    /// Line of the offending entry, if the rule concerns a single entry.
    pub line: Option<usize>,
    /// Name of the offending entry, if the rule concerns a single entry.
    pub entry: Option<String>,
    /// Human-readable description naming the offending data.
    pub message: String,
}

impl Violation {
    fn for_entry(rule: Rule, entry: &RawEntry, message: String) -> Self {
        Self {
            rule,
            line: Some(entry.line),
            entry: Some(entry.name().to_string()),
            message,
        }
    }

    const fn global(rule: Rule, message: String) -> Self {
        Self {
            rule,
            line: None,
            entry: None,
            message,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{}] line {line}: {}", self.rule, self.message),
            None => write!(f, "[{}] {}", self.rule, self.message),
        }
    }
}

/// Every violation found in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("manifest failed validation with {} violation(s)", .violations.len())]
pub struct ValidationReport {
    /// Violations in rule order, then file order.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Violations of a single rule.
    pub fn of_rule(&self, rule: Rule) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    /// Whether `rule` reported anything.
    #[must_use]
    pub fn breaks(&self, rule: Rule) -> bool {
        self.of_rule(rule).next().is_some()
    }
}

/// Entries with exactly four fields, as `(entry, (name, url, branch, method))`.
fn well_formed(
    manifest: &Manifest,
) -> impl Iterator<Item = (&RawEntry, (&str, &str, &str, &str))> {
    manifest
        .entries
        .iter()
        .filter_map(|e| e.as_quad().map(|quad| (e, quad)))
}

/// Flags entries that do not have exactly four fields.
#[must_use]
pub fn check_field_count(manifest: &Manifest) -> Vec<Violation> {
    manifest
        .entries
        .iter()
        .filter(|e| e.fields.len() != MANIFEST_FIELD_COUNT)
        .map(|e| {
            Violation::for_entry(
                Rule::FieldCount,
                e,
                format!(
                    "malformed entry: expected {MANIFEST_FIELD_COUNT} pipe-delimited fields, got {}: {}",
                    e.fields.len(),
                    e.text()
                ),
            )
        })
        .collect()
}

/// Non-empty names of every entry, whatever its width.
fn entry_names(manifest: &Manifest) -> impl Iterator<Item = &str> {
    manifest
        .entries
        .iter()
        .map(RawEntry::name)
        .filter(|name| !name.is_empty())
}

/// Names that occur more than once, each listed once in first-occurrence
/// order.
///
/// Counts every entry, including ones with the wrong number of fields.
#[must_use]
pub fn duplicate_names(manifest: &Manifest) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in entry_names(manifest) {
        *counts.entry(name).or_default() += 1;
    }
    let mut reported = HashSet::new();
    entry_names(manifest)
        .filter(|name| counts.get(name).copied().unwrap_or(0) > 1 && reported.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Reports every repository name used by more than one entry.
#[must_use]
pub fn check_unique_names(manifest: &Manifest) -> Vec<Violation> {
    let dups = duplicate_names(manifest);
    if dups.is_empty() {
        return Vec::new();
    }
    vec![Violation::global(
        Rule::UniqueNames,
        format!("duplicate repo names: {}", dups.join(", ")),
    )]
}

/// Flags entries whose install method is not a recognized tag.
#[must_use]
pub fn check_install_methods(manifest: &Manifest) -> Vec<Violation> {
    well_formed(manifest)
        .filter_map(|(e, (name, _, _, method))| {
            method.parse::<InstallMethod>().err().map(|err| {
                Violation::for_entry(Rule::InstallMethod, e, format!("'{name}' has {err}"))
            })
        })
        .collect()
}

/// Flags entries whose URL is not an SSH git remote on the allowed host.
#[must_use]
pub fn check_urls(manifest: &Manifest) -> Vec<Violation> {
    well_formed(manifest)
        .filter_map(|(e, (name, url, ..))| {
            GitRemote::parse(url).err().map(|err| {
                Violation::for_entry(
                    Rule::UrlShape,
                    e,
                    format!("'{name}' URL does not match git SSH format: {url} ({err})"),
                )
            })
        })
        .collect()
}

/// Flags entries whose branch is empty or all whitespace.
#[must_use]
pub fn check_branches(manifest: &Manifest) -> Vec<Violation> {
    well_formed(manifest)
        .filter(|(_, (_, _, branch, _))| branch.trim().is_empty())
        .map(|(e, (name, ..))| {
            Violation::for_entry(
                Rule::BranchNonEmpty,
                e,
                format!("'{name}' has empty branch name"),
            )
        })
        .collect()
}

/// Flags entries whose name contains whitespace.
#[must_use]
pub fn check_name_shape(manifest: &Manifest) -> Vec<Violation> {
    well_formed(manifest)
        .filter(|(_, (name, ..))| name.chars().any(char::is_whitespace))
        .map(|(e, (name, ..))| {
            Violation::for_entry(
                Rule::NameShape,
                e,
                format!("repo name contains whitespace: '{name}'"),
            )
        })
        .collect()
}

/// Checks that every line is counted exactly once as an entry, a comment,
/// or a blank.
#[must_use]
pub fn check_line_accounting(manifest: &Manifest) -> Vec<Violation> {
    let tally = manifest.tally;
    let accounted = manifest.entries.len() + tally.comments + tally.blanks;
    if accounted == tally.total {
        return Vec::new();
    }
    vec![Violation::global(
        Rule::LineAccounting,
        format!(
            "{} entries + {} comments + {} blanks = {accounted}, but the file has {} lines",
            manifest.entries.len(),
            tally.comments,
            tally.blanks,
            tally.total
        ),
    )]
}

/// Requires at least one entry.
#[must_use]
pub fn check_not_empty(manifest: &Manifest) -> Vec<Violation> {
    if manifest.entries.is_empty() {
        vec![Violation::global(
            Rule::NonEmpty,
            "manifest has no entries".into(),
        )]
    } else {
        Vec::new()
    }
}

/// Runs every rule and returns the typed entries in file order.
///
/// # Errors
///
/// Returns a [`ValidationReport`] listing every violation if any rule is
/// broken.
pub fn validate(manifest: &Manifest) -> Result<Vec<ManifestEntry>, ValidationReport> {
    tracing::info!(entries = manifest.entries.len(), "validating manifest");

    let violations: Vec<Violation> = Rule::ALL
        .into_iter()
        .flat_map(|rule| rule.check(manifest))
        .collect();

    if !violations.is_empty() {
        for v in &violations {
            tracing::debug!(rule = %v.rule, line = ?v.line, "{}", v.message);
        }
        return Err(ValidationReport { violations });
    }

    // Every rule passed: each entry has four fields and a known method.
    Ok(well_formed(manifest)
        .filter_map(|(e, (name, url, branch, method))| {
            method.parse::<InstallMethod>().ok().map(|install_method| ManifestEntry {
                name: name.to_string(),
                url: url.to_string(),
                branch: branch.to_string(),
                install_method,
                line: e.line,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const GOOD: &str = "repoA|git@github.com:org/repoA.git|main|pip_editable";

    fn rules_broken(text: &str) -> Vec<Rule> {
        let report = validate(&parse(text)).unwrap_err();
        let mut rules: Vec<Rule> = report.violations.iter().map(|v| v.rule).collect();
        rules.dedup();
        rules
    }

    #[test]
    fn validate_single_good_entry() {
        let entries = validate(&parse(GOOD)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "repoA");
        assert_eq!(entries[0].install_method, InstallMethod::PipEditable);
        assert_eq!(entries[0].line, 1);
    }

    #[test]
    fn field_count_names_entry_and_count() {
        let v = check_field_count(&parse("repoA|git@github.com:o/r.git|main\n"));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].line, Some(1));
        assert!(v[0].message.contains("got 3"), "got: {}", v[0].message);
        assert!(v[0].message.contains("repoA|git@github.com:o/r.git|main"));
    }

    #[test]
    fn short_line_only_breaks_field_count() {
        assert_eq!(rules_broken("repoA|bad url\n"), vec![Rule::FieldCount]);
    }

    #[test]
    fn duplicate_names_listed_once_each() {
        let text = format!("{GOOD}\n{GOOD}\n{GOOD}\nb|git@github.com:o/b.git|main|reference\n");
        let m = parse(&text);
        assert_eq!(duplicate_names(&m), vec!["repoA".to_string()]);
        let v = check_unique_names(&m);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("repoA"));
    }

    #[test]
    fn duplicate_counts_entries_of_any_width() {
        let m = parse(
            "repoA|git@github.com:org/repoA.git|main|pip_editable\nrepoA|git@github.com:org/repoA.git|main\n",
        );
        assert_eq!(duplicate_names(&m), vec!["repoA".to_string()]);
        assert_eq!(check_unique_names(&m).len(), 1);

        let report = validate(&m).unwrap_err();
        assert!(report.breaks(Rule::UniqueNames));
        assert!(report.breaks(Rule::FieldCount));
        assert!(!report.breaks(Rule::UrlShape));
    }

    #[test]
    fn empty_names_are_not_duplicates() {
        let m = parse("|a\n|b\n");
        assert!(duplicate_names(&m).is_empty());
    }

    #[test]
    fn valid_manifest_yields_every_entry() {
        let text = format!("{GOOD}\nb|git@github.com:o/b.git|dev|c_and_pip\n");
        let entries = validate(&parse(&text)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].install_method, InstallMethod::CAndPip);
        assert_eq!(entries[1].branch, "dev");
    }

    #[test]
    fn install_method_violation_names_tag() {
        let m = parse("repoA|git@github.com:org/repoA.git|main|pip_something_else\n");
        let v = check_install_methods(&m);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].entry.as_deref(), Some("repoA"));
        assert!(v[0].message.contains("pip_something_else"));
    }

    #[test]
    fn url_violation_names_url() {
        let m = parse("repoA|https://github.com/owner/repo.git|main|reference\n");
        let v = check_urls(&m);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("https://github.com/owner/repo.git"));
    }

    #[test]
    fn whitespace_branch_is_empty() {
        let m = parse("repoA|git@github.com:org/repoA.git|   |reference\n");
        let v = check_branches(&m);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("repoA"));
    }

    #[test]
    fn name_with_space_or_tab_is_rejected() {
        let m = parse(
            "repo A|git@github.com:o/a.git|main|reference\nrepo\tB|git@github.com:o/b.git|main|reference\n",
        );
        let v = check_name_shape(&m);
        assert_eq!(v.len(), 2);
        assert_eq!(v[1].line, Some(2));
    }

    #[test]
    fn empty_and_comment_only_manifests_fail() {
        assert_eq!(rules_broken(""), vec![Rule::NonEmpty]);
        assert_eq!(rules_broken("# only a comment\n\n"), vec![Rule::NonEmpty]);
    }

    #[test]
    fn accounting_holds_for_parsed_text() {
        let m = parse("# a\n\n  \nx|y\n# b\nrepo|u|b|m\n");
        assert!(check_line_accounting(&m).is_empty());
    }

    #[test]
    fn accounting_detects_dropped_entry() {
        let mut m = parse(&format!("# a\n{GOOD}\n"));
        let _ = m.entries.pop();
        let v = check_line_accounting(&m);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("2 lines"));
    }

    #[test]
    fn rules_report_independently() {
        let text = "\
bad name|https://example.com/x.git| |docker_pull
ok|git@github.com:o/ok.git|main|reference
";
        let report = validate(&parse(text)).unwrap_err();
        assert!(report.breaks(Rule::NameShape));
        assert!(report.breaks(Rule::UrlShape));
        assert!(report.breaks(Rule::BranchNonEmpty));
        assert!(report.breaks(Rule::InstallMethod));
        assert!(!report.breaks(Rule::FieldCount));
        assert!(!report.breaks(Rule::UniqueNames));
        assert!(report.violations.iter().all(|v| v.line == Some(1)));
    }

    #[test]
    fn rule_names_round_trip() {
        for rule in Rule::ALL {
            assert_eq!(rule.as_str().parse::<Rule>(), Ok(rule));
        }
        assert!("no-such-rule".parse::<Rule>().is_err());
    }

    #[test]
    fn violation_display_includes_rule_and_line() {
        let m = parse("a|b|c\n");
        let v = &check_field_count(&m)[0];
        assert!(v.to_string().starts_with("[field-count] line 1:"));
    }
}
