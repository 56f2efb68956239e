//! Curated pattern matching
//!
//! A fixed, ordered list of regex families, each mapped to one canonical
//! institution label. Patterns match the lowercased input anywhere; a group
//! is only emitted when at least two strings match, so one incidental hit
//! never manufactures a canonical spelling. A string may match several
//! patterns; the merger unions such groups later.

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::error::StageError;
use crate::group::{Group, GroupSet};

/// Hand-authored pattern families for the domain. Each entry is
/// `(regex, canonical label)`; the label may not occur in the input and is
/// then carried as a synthetic member.
const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    (
        r"гомельск\w*\s+гос[\w.]*\s+техническ\w*\s+университет|\bггту\b",
        "Гомельский государственный технический университет",
    ),
    (
        r"гомельск\w*\s+гос[\w.]*\s+медицинск\w*\s+университет|\bггму\b",
        "Гомельский государственный медицинский университет",
    ),
    (
        r"гомельск\w*\s+гос[\w.]*\s+университет|\bггу\b",
        "Гомельский государственный университет",
    ),
    (
        r"белорусск\w*\s+гос[\w.]*\s+университет\s+транспорта|\bбелгут\b",
        "Белорусский государственный университет транспорта",
    ),
    (
        r"белорусск\w*\s+торгово[\s-]эконом\w*\s+университет|\bбтэу\b",
        "Белорусский торгово-экономический университет",
    ),
    (
        r"белорусск\w*\s+гос[\w.]*\s+университет|\bбгу\b",
        "Белорусский государственный университет",
    ),
    (
        r"московск\w*\s+гос[\w.]*\s+университет|\bмгу\b",
        "Московский государственный университет",
    ),
];

/// Compiled pattern table, built once at engine construction and shared by
/// reference into the matcher.
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<(Regex, String)>,
}

impl PatternTable {
    /// Compile an ordered `(regex, canonical label)` list. Patterns that
    /// fail to compile are skipped with a warning rather than failing the
    /// whole table.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let patterns = pairs
            .into_iter()
            .filter_map(|(pattern, label)| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(regex) => Some((regex, label.to_string())),
                    Err(err) => {
                        warn!(pattern, %err, "skipping unparseable pattern");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// An empty table; pattern matching becomes a no-op.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Canonical labels in table order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(_, label)| label.as_str())
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_PATTERNS.iter().copied())
    }
}

/// Group strings matching curated patterns under the pattern's fixed label.
pub fn match_patterns(strings: &[String], table: &PatternTable) -> Result<GroupSet, StageError> {
    let mut groups = GroupSet::new();

    for (regex, label) in &table.patterns {
        let matched: Vec<&str> = strings
            .iter()
            .map(String::as_str)
            .filter(|s| regex.is_match(&s.to_lowercase()))
            .collect();

        if matched.len() >= 2 {
            groups.insert(Group::with_members(label.clone(), matched));
        }
    }

    Ok(groups)
}
