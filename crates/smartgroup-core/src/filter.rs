//! Filter resolution for the value-picker consumer
//!
//! The host application populates its filter picker with group
//! representatives. When the user applies a filter, the chosen text is
//! resolved back into the full member set of its group; free-form text that
//! names no group falls back to keyword matching over normalized cell
//! values.

use std::collections::BTreeSet;

use crate::group::GroupSet;
use crate::normalize::{extract_keywords, normalize};

const MIN_KEYWORD_LEN: usize = 3;

/// How a filter string should be applied to cell values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMatch<'a> {
    /// Empty filter: every row matches.
    All,
    /// The filter names a group; match cells against these members.
    Group(&'a BTreeSet<String>),
    /// Free-form filter; match cells whose normalized form contains every
    /// keyword.
    Keywords(Vec<String>),
    /// The filter produced no usable keywords; nothing matches.
    Nothing,
}

/// Resolve a user-entered filter against the current grouping.
pub fn resolve_filter<'a>(groups: &'a GroupSet, filter_text: &str) -> FilterMatch<'a> {
    if filter_text.trim().is_empty() {
        return FilterMatch::All;
    }

    let normalized = normalize(filter_text);
    for group in groups.groups() {
        if normalize(&group.representative) == normalized {
            return FilterMatch::Group(&group.members);
        }
    }

    let keywords = extract_keywords(filter_text, MIN_KEYWORD_LEN);
    if keywords.is_empty() {
        return FilterMatch::Nothing;
    }
    FilterMatch::Keywords(keywords)
}

/// Does a cell value contain every keyword in its normalized form?
pub fn matches_keywords(cell: &str, keywords: &[String]) -> bool {
    let normalized = normalize(cell);
    keywords.iter().all(|k| normalized.contains(k.as_str()))
}
