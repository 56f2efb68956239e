//! Seed table loading and matching
//!
//! A seed table is a curated JSON document mapping canonical label to a
//! list of known variant spellings:
//!
//! ```json
//! {
//!   "Гомельский государственный университет": ["ГГУ", "ГГУ им. Скорины"]
//! }
//! ```
//!
//! The table is optional. A missing or malformed file degrades to an empty
//! table with a warning; grouping proceeds without the seed stage.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::error::StageError;
use crate::group::{Group, GroupSet};
use crate::normalize::normalize;

#[derive(Debug, Clone)]
struct SeedEntry {
    canonical: String,
    /// Normalized forms of the canonical label and all its variants.
    normalized_variants: HashSet<String>,
}

/// Curated canonical-label to variant-spellings dictionary.
///
/// Entries are kept sorted by canonical label; that order is the documented
/// first-match-wins order when variant sets overlap after normalization.
#[derive(Debug, Clone, Default)]
pub struct SeedTable {
    entries: Vec<SeedEntry>,
}

impl SeedTable {
    /// Empty table; the seed stage is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from a JSON file. Absence or malformed content is non-fatal and
    /// yields an empty table.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json_str(&content),
            Err(err) => {
                warn!(path = %path.display(), %err, "seed table unavailable, proceeding without seeds");
                Self::empty()
            }
        }
    }

    /// Load from any reader; errors degrade to an empty table.
    pub fn from_reader(mut reader: impl Read) -> Self {
        let mut content = String::new();
        match reader.read_to_string(&mut content) {
            Ok(_) => Self::from_json_str(&content),
            Err(err) => {
                warn!(%err, "seed table unreadable, proceeding without seeds");
                Self::empty()
            }
        }
    }

    /// Parse the JSON document. A parse failure yields an empty table.
    pub fn from_json_str(content: &str) -> Self {
        // BTreeMap fixes the entry order regardless of document order.
        let parsed: BTreeMap<String, Vec<String>> = match serde_json::from_str(content) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(%err, "seed table malformed, proceeding without seeds");
                return Self::empty();
            }
        };

        let entries = parsed
            .into_iter()
            .map(|(canonical, variants)| {
                let mut normalized_variants: HashSet<String> =
                    variants.iter().map(|v| normalize(v)).collect();
                normalized_variants.insert(normalize(&canonical));
                SeedEntry {
                    canonical,
                    normalized_variants,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Canonical labels in match order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.canonical.as_str())
    }
}

/// Assign strings to seed groups by normalized-variant equality.
///
/// Each string joins at most one group: entries are tried in table order and
/// the first match wins. Groups that match nothing are omitted.
pub fn match_seeds(strings: &[String], table: &SeedTable) -> Result<GroupSet, StageError> {
    let mut matched: Vec<Vec<&str>> = vec![Vec::new(); table.entries.len()];

    for s in strings {
        let normalized = normalize(s);
        for (i, entry) in table.entries.iter().enumerate() {
            if entry.normalized_variants.contains(&normalized) {
                matched[i].push(s.as_str());
                break;
            }
        }
    }

    let mut groups = GroupSet::new();
    for (entry, members) in table.entries.iter().zip(matched) {
        if !members.is_empty() {
            groups.insert(Group::with_members(entry.canonical.clone(), members));
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEEDS: &str = r#"{
        "Гомельский государственный университет": ["ГГУ", "ГГУ им. Ф. Скорины"],
        "Белорусский государственный университет транспорта": ["БелГУТ"]
    }"#;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_and_matches_variants() {
        let table = SeedTable::from_json_str(SEEDS);
        assert_eq!(table.len(), 2);

        let input = strings(&["ггу", "БелГУТ", "другое"]);
        let groups = match_seeds(&input, &table).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups
            .get("Гомельский государственный университет")
            .unwrap()
            .contains("ггу"));
        assert!(!groups.contains_member("другое"));
    }

    #[test]
    fn canonical_label_matches_itself() {
        let table = SeedTable::from_json_str(SEEDS);
        let input = strings(&["Гомельский государственный университет", "x y z"]);
        let groups = match_seeds(&input, &table).unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn unmatched_groups_are_omitted() {
        let table = SeedTable::from_json_str(SEEDS);
        let groups = match_seeds(&strings(&["ничего похожего"]), &table).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn first_match_wins_in_sorted_order() {
        // Both entries list the same variant; labels sort Б before Г.
        let table = SeedTable::from_json_str(
            r#"{"Гамма": ["общий вариант"], "Бета": ["общий вариант"]}"#,
        );
        let groups = match_seeds(&strings(&["общий вариант"]), &table).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups.get("Бета").is_some());
    }

    #[test]
    fn malformed_json_degrades_to_empty() {
        assert!(SeedTable::from_json_str("not json").is_empty());
        assert!(SeedTable::from_json_str(r#"{"a": "not a list"}"#).is_empty());
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let table = SeedTable::from_path("/nonexistent/seeds.json");
        assert!(table.is_empty());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEEDS.as_bytes()).unwrap();
        let table = SeedTable::from_path(file.path());
        assert_eq!(table.len(), 2);
    }
}
