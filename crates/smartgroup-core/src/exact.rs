//! Normalization grouping
//!
//! Buckets strings that become byte-identical after normalization. Only
//! buckets with two or more originals are emitted; lone strings stay
//! ungrouped for the orchestrator's singleton pass.

use std::collections::{HashMap, HashSet};

use crate::config::GrouperConfig;
use crate::error::StageError;
use crate::group::{Group, GroupSet};
use crate::normalize::normalize;
use crate::similarity::select_representative;

/// Group strings whose normalized forms are equal.
pub fn group_by_normalization(
    strings: &[String],
    config: &GrouperConfig,
) -> Result<GroupSet, StageError> {
    let mut buckets: HashMap<String, Vec<&str>> = HashMap::new();
    let mut bucket_order: Vec<String> = Vec::new();

    for s in strings {
        let key = normalize(s);
        let bucket = buckets.entry(key.clone()).or_insert_with(|| {
            bucket_order.push(key);
            Vec::new()
        });
        bucket.push(s.as_str());
    }

    let no_labels = HashSet::new();
    let mut groups = GroupSet::new();
    for key in &bucket_order {
        let members = &buckets[key];
        if members.len() < 2 {
            continue;
        }
        let representative = select_representative(members, &no_labels, config);
        groups.insert(Group::with_members(representative, members.iter().copied()));
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn groups_equal_normalized_forms() {
        let input = strings(&["Школа №5", "школа номер 5", "лицей"]);
        let groups = group_by_normalization(&input, &GrouperConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);
        let group = groups.groups().next().unwrap();
        assert!(group.contains("Школа №5"));
        assert!(group.contains("школа номер 5"));
        assert!(!group.contains("лицей"));
    }

    #[test]
    fn representative_is_a_member() {
        let input = strings(&["УО ГГУ", "ггу", "Г.Г.У."]);
        let groups = group_by_normalization(&input, &GrouperConfig::default()).unwrap();
        for group in groups.groups() {
            assert!(group.contains(&group.representative));
        }
    }

    #[test]
    fn size_one_buckets_stay_ungrouped() {
        let input = strings(&["альфа", "бета", "гамма"]);
        let groups = group_by_normalization(&input, &GrouperConfig::default()).unwrap();
        assert!(groups.is_empty());
    }
}
