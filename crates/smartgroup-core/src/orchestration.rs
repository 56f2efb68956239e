//! Grouping pipeline orchestration
//!
//! Runs the matcher stages in priority order (seeds, patterns,
//! normalization buckets, abbreviations, similarity clustering), merges
//! overlapping stage output by member intersection, and fills in singleton
//! groups so every input string lands in exactly one group.
//!
//! No stage failure escapes [`Grouper::group_all`]; a failing stage is
//! logged and contributes nothing.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::abbrev::match_abbreviations;
use crate::config::GrouperConfig;
use crate::error::StageError;
use crate::exact::group_by_normalization;
use crate::group::{Group, GroupSet};
use crate::patterns::{match_patterns, PatternTable};
use crate::seeds::{match_seeds, SeedTable};
use crate::similarity::{cluster, select_representative, UnionFind};

/// The grouping engine. Immutable after construction; cheap to share.
#[derive(Debug, Clone)]
pub struct Grouper {
    config: GrouperConfig,
    seeds: SeedTable,
    patterns: PatternTable,
}

impl Grouper {
    /// Engine with default thresholds, the curated pattern table, and no
    /// seed table.
    pub fn new() -> Self {
        Self::with_config(GrouperConfig::default())
    }

    pub fn with_config(config: GrouperConfig) -> Self {
        Self {
            config,
            seeds: SeedTable::empty(),
            patterns: PatternTable::default(),
        }
    }

    pub fn seeds(mut self, seeds: SeedTable) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn patterns(mut self, patterns: PatternTable) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn config(&self) -> &GrouperConfig {
        &self.config
    }

    /// Partition the input into groups of equivalent spellings.
    ///
    /// The input is deduplicated and blank entries dropped; every surviving
    /// string ends up in exactly one group. Never fails: a failing stage
    /// degrades to contributing no groups, and with every stage degraded the
    /// result is singleton-only grouping.
    pub fn group_all(&self, values: &[String]) -> GroupSet {
        let mut seen: HashSet<&str> = HashSet::new();
        let strings: Vec<String> = values
            .iter()
            .filter(|s| !s.trim().is_empty())
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();

        if strings.is_empty() {
            return GroupSet::new();
        }
        if strings.len() == 1 {
            let mut groups = GroupSet::new();
            groups.insert(Group::singleton(strings[0].clone()));
            return groups;
        }

        let mut stage_groups: Vec<Group> = Vec::new();

        if !self.seeds.is_empty() {
            collect_stage("seeds", match_seeds(&strings, &self.seeds), &mut stage_groups);
        }
        collect_stage(
            "patterns",
            match_patterns(&strings, &self.patterns),
            &mut stage_groups,
        );
        collect_stage(
            "normalization",
            group_by_normalization(&strings, &self.config),
            &mut stage_groups,
        );
        collect_stage(
            "abbreviations",
            match_abbreviations(&strings, &self.config),
            &mut stage_groups,
        );

        // Later clustering only sees strings no earlier stage claimed.
        let claimed: HashSet<&str> = stage_groups
            .iter()
            .flat_map(|g| g.members.iter().map(String::as_str))
            .collect();
        let unclaimed: Vec<String> = strings
            .iter()
            .filter(|s| !claimed.contains(s.as_str()))
            .cloned()
            .collect();
        collect_stage(
            "similarity",
            cluster(&unclaimed, &self.config),
            &mut stage_groups,
        );

        let mut groups = self.merge_overlapping(stage_groups);

        // Singleton fallback for anything no stage claimed.
        let grouped = groups.all_members();
        for s in &strings {
            if !grouped.contains(s) {
                groups.insert(Group::singleton(s.clone()));
            }
        }

        debug!(
            inputs = strings.len(),
            groups = groups.len(),
            "grouping complete"
        );

        groups
    }

    /// Union stage groups whose member sets intersect. The merged
    /// representative is chosen among the component's original
    /// representatives; seed and pattern labels win unconditionally.
    fn merge_overlapping(&self, stage_groups: Vec<Group>) -> GroupSet {
        let known_labels: HashSet<String> = self
            .seeds
            .labels()
            .chain(self.patterns.labels())
            .map(str::to_string)
            .collect();

        let mut components = UnionFind::new(stage_groups.len());
        for i in 0..stage_groups.len() {
            for j in (i + 1)..stage_groups.len() {
                let intersects = stage_groups[i]
                    .members
                    .intersection(&stage_groups[j].members)
                    .next()
                    .is_some();
                if intersects {
                    components.union(i, j);
                }
            }
        }

        let mut buckets: HashMap<usize, Vec<usize>> = HashMap::new();
        for i in 0..stage_groups.len() {
            buckets.entry(components.find(i)).or_default().push(i);
        }

        let mut merged = GroupSet::new();
        for indices in buckets.values() {
            let mut representatives: Vec<&str> = Vec::new();
            for &i in indices {
                let rep = stage_groups[i].representative.as_str();
                if !representatives.contains(&rep) {
                    representatives.push(rep);
                }
            }
            let representative =
                select_representative(&representatives, &known_labels, &self.config);

            let mut group = Group::singleton(representative);
            for &i in indices {
                group.members.extend(stage_groups[i].members.iter().cloned());
            }
            merged.insert(group);
        }

        merged
    }
}

impl Default for Grouper {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_stage(name: &str, result: Result<GroupSet, StageError>, out: &mut Vec<Group>) {
    match result {
        Ok(groups) => {
            debug!(stage = name, groups = groups.len(), "stage complete");
            out.extend(groups.into_iter().map(|(_, g)| g));
        }
        Err(err) => {
            warn!(stage = name, %err, "stage failed, continuing without it");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_yields_empty_set() {
        let groups = Grouper::new().group_all(&[]);
        assert!(groups.is_empty());
    }

    #[test]
    fn blank_entries_are_dropped() {
        let groups = Grouper::new().group_all(&strings(&["", "   ", "школа"]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.groups().next().unwrap().representative, "школа");
    }

    #[test]
    fn single_value_groups_with_itself() {
        let groups = Grouper::new().group_all(&strings(&["лицей"]));
        assert_eq!(groups.len(), 1);
        assert!(groups.resolve("лицей").unwrap().contains("лицей"));
    }

    #[test]
    fn duplicates_collapse_before_grouping() {
        let groups = Grouper::new().group_all(&strings(&["Школа №5", "школа номер 5", "Школа №5"]));
        assert_eq!(groups.len(), 1);
        let group = groups.groups().next().unwrap();
        assert!(group.contains("Школа №5"));
        assert!(group.contains("школа номер 5"));
    }

    #[test]
    fn overlapping_stage_groups_merge() {
        // Pattern and abbreviation stages both claim ГГУ + full name;
        // merging must produce a single group.
        let groups = Grouper::new().group_all(&strings(&[
            "ГГУ",
            "Гомельский государственный университет",
            "другое слово",
        ]));
        assert_eq!(groups.len(), 2);
        let big = groups
            .get("Гомельский государственный университет")
            .unwrap();
        assert!(big.contains("ГГУ"));
        assert!(groups.resolve("другое слово").is_some());
    }

    #[test]
    fn every_input_lands_in_exactly_one_group() {
        let input = strings(&[
            "ГГУ",
            "Гомельский государственный университет",
            "Школа №5",
            "школа номер 5",
            "завод",
        ]);
        let groups = Grouper::new().group_all(&input);
        for s in &input {
            let containing = groups.groups().filter(|g| g.contains(s)).count();
            assert_eq!(containing, 1, "{} appears in {} groups", s, containing);
        }
    }

    #[test]
    fn representative_always_member() {
        let input = strings(&["СШ №5", "средняя школа номер 5", "гимназия", "ГИМНАЗИЯ"]);
        let groups = Grouper::new().group_all(&input);
        for group in groups.groups() {
            assert!(
                group.contains(&group.representative),
                "representative {} not in members",
                group.representative
            );
        }
    }

    #[test]
    fn deterministic_across_calls() {
        let input = strings(&["ГГУ", "ггу", "Школа №5", "школа номер 5", "завод", "фабрика"]);
        let grouper = Grouper::new();
        assert_eq!(grouper.group_all(&input), grouper.group_all(&input));
    }

    #[test]
    fn failed_clustering_degrades_to_singletons() {
        // An out-of-range threshold makes the similarity stage error out;
        // group_all must still return a total partition.
        let input = strings(&[
            "средняя школа номер 5",
            "средняя школа номер 5 города Гомеля",
        ]);
        let groups = Grouper::with_config(GrouperConfig {
            similarity_threshold: 1.5,
            ..GrouperConfig::default()
        })
        .group_all(&input);

        assert_eq!(groups.len(), 2);
        for s in &input {
            assert_eq!(groups.resolve(s).map(|m| m.len()), Some(1));
        }
    }

    #[test]
    fn seed_stage_runs_when_configured() {
        let seeds = SeedTable::from_json_str(
            r#"{"Белорусский государственный университет транспорта": ["БелГУТ"]}"#,
        );
        let groups = Grouper::new()
            .seeds(seeds)
            .group_all(&strings(&["БелГУТ", "прочее"]));
        let group = groups
            .get("Белорусский государственный университет транспорта")
            .unwrap();
        assert!(group.contains("БелГУТ"));
    }
}
