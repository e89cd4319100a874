use std::collections::HashSet;

use super::UserEntry;

/// Insertion-ordered set of entries, unique by value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    items: Vec<UserEntry>,
    seen: HashSet<UserEntry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when an equal entry is already present
    pub fn insert(&mut self, entry: UserEntry) -> bool {
        if self.seen.contains(&entry) {
            return false;
        }
        self.seen.insert(entry.clone());
        self.items.push(entry);
        true
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = UserEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserEntry> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<UserEntry> for EntrySet {
    fn from_iter<I: IntoIterator<Item = UserEntry>>(iter: I) -> Self {
        let mut set = EntrySet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for EntrySet {
    type Item = UserEntry;
    type IntoIter = std::vec::IntoIter<UserEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a UserEntry;
    type IntoIter = std::slice::Iter<'a, UserEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Extraction result for one or more exports.
///
/// The three categories are filled independently: somebody who wrote a
/// message and was also @-mentioned shows up in both `participants` and
/// `mentions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultBundle {
    pub participants: EntrySet,
    pub mentions: EntrySet,
    pub channels: EntrySet,
}

impl ResultBundle {
    pub fn new(participants: EntrySet, mentions: EntrySet, channels: EntrySet) -> Self {
        Self {
            participants,
            mentions,
            channels,
        }
    }

    /// Distinct entries across participants and mentions; channels are not users
    pub fn unique_users_count(&self) -> usize {
        let mut union: HashSet<&UserEntry> = self.participants.iter().collect();
        union.extend(self.mentions.iter());
        union.len()
    }

    /// Set-union of another bundle into this one, per category
    pub fn merge(&mut self, other: ResultBundle) {
        self.participants.extend(other.participants);
        self.mentions.extend(other.mentions);
        self.channels.extend(other.channels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_set_keeps_first_insertion_order() {
        let mut set = EntrySet::new();
        assert!(set.insert(UserEntry::from_handle("bob")));
        assert!(set.insert(UserEntry::from_handle("alice")));
        assert!(!set.insert(UserEntry::from_handle("bob")));

        let names: Vec<_> = set.iter().filter_map(|e| e.username()).collect();
        assert_eq!(names, vec!["bob", "alice"]);
    }

    #[test]
    fn test_unique_users_count_ignores_channels() {
        let alice = UserEntry::from_handle("alice");
        let bundle = ResultBundle::new(
            [alice.clone()].into_iter().collect(),
            [alice, UserEntry::from_handle("carol")].into_iter().collect(),
            [UserEntry::from_handle("news")].into_iter().collect(),
        );
        assert_eq!(bundle.unique_users_count(), 2);
    }

    #[test]
    fn test_merge_is_set_union() {
        let mut first = ResultBundle::default();
        first.mentions.insert(UserEntry::from_handle("bob"));

        let mut second = ResultBundle::default();
        second.mentions.insert(UserEntry::from_handle("bob"));
        second.mentions.insert(UserEntry::from_handle("dave"));

        first.merge(second);
        assert_eq!(first.mentions.len(), 2);
    }
}
