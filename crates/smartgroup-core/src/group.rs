//! Group and GroupSet types
//!
//! A `Group` is one cluster of equivalent spellings with a chosen
//! representative label. A `GroupSet` maps representative to group with
//! deterministic (sorted) iteration order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One cluster of equivalent strings.
///
/// Invariant: `representative` is always a member. Pattern and seed stages
/// fix a canonical label as representative; the label is inserted as a
/// synthetic member so the invariant holds even when the label was not part
/// of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub representative: String,
    pub members: BTreeSet<String>,
}

impl Group {
    /// Create a group containing only its representative.
    pub fn singleton(representative: impl Into<String>) -> Self {
        let representative = representative.into();
        let mut members = BTreeSet::new();
        members.insert(representative.clone());
        Self {
            representative,
            members,
        }
    }

    /// Create a group from a representative and members. The representative
    /// is inserted into the member set if absent.
    pub fn with_members<I, S>(representative: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let representative = representative.into();
        let mut members: BTreeSet<String> = members.into_iter().map(Into::into).collect();
        members.insert(representative.clone());
        Self {
            representative,
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.members.contains(value)
    }
}

/// Mapping from representative label to its group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSet(BTreeMap<String, Group>);

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group. If a group with the same representative already
    /// exists, the member sets are unioned.
    pub fn insert(&mut self, group: Group) {
        match self.0.get_mut(&group.representative) {
            Some(existing) => existing.members.extend(group.members),
            None => {
                self.0.insert(group.representative.clone(), group);
            }
        }
    }

    pub fn get(&self, representative: &str) -> Option<&Group> {
        self.0.get(representative)
    }

    /// Resolve a representative label back to its full member set.
    pub fn resolve(&self, representative: &str) -> Option<&BTreeSet<String>> {
        self.0.get(representative).map(|g| &g.members)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn representatives(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.0.values()
    }

    /// Union of every group's member set.
    pub fn all_members(&self) -> BTreeSet<String> {
        self.0
            .values()
            .flat_map(|g| g.members.iter().cloned())
            .collect()
    }

    /// True if `value` is a member of any group.
    pub fn contains_member(&self, value: &str) -> bool {
        self.0.values().any(|g| g.contains(value))
    }
}

impl IntoIterator for GroupSet {
    type Item = (String, Group);
    type IntoIter = std::collections::btree_map::IntoIter<String, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Group> for GroupSet {
    fn from_iter<I: IntoIterator<Item = Group>>(iter: I) -> Self {
        let mut set = GroupSet::new();
        for group in iter {
            set.insert(group);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_contains_representative() {
        let group = Group::singleton("школа");
        assert_eq!(group.len(), 1);
        assert!(group.contains("школа"));
    }

    #[test]
    fn with_members_inserts_representative() {
        let group = Group::with_members("МГУ", ["мгу", "moscow state"]);
        assert!(group.contains("МГУ"));
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn insert_merges_same_representative() {
        let mut set = GroupSet::new();
        set.insert(Group::with_members("a", ["b"]));
        set.insert(Group::with_members("a", ["c"]));
        assert_eq!(set.len(), 1);
        assert_eq!(set.resolve("a").unwrap().len(), 3);
    }

    #[test]
    fn iteration_order_is_sorted() {
        let mut set = GroupSet::new();
        set.insert(Group::singleton("b"));
        set.insert(Group::singleton("a"));
        let reps: Vec<&str> = set.representatives().collect();
        assert_eq!(reps, vec!["a", "b"]);
    }
}
