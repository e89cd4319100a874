//! Identity-key deduplication and placeholder filtering

use crate::domain::entities::{EntrySet, UserEntry};
use std::collections::HashSet;

/// Names Telegram shows for removed accounts, already case-folded
const DELETED_ACCOUNT_NAMES: &[&str] = &["deleted account", "удаленный аккаунт", "удалённый аккаунт"];

/// Canonical identity of an entry: username, else link, else display name.
///
/// Returns `None` when all three are blank.
pub fn identity_key(entry: &UserEntry) -> Option<String> {
    if let Some(username) = entry.username() {
        return Some(format!("@{}", username.trim().to_lowercase()));
    }
    if let Some(link) = entry.link() {
        return Some(format!("link:{}", link.trim().to_lowercase()));
    }
    entry
        .display_name()
        .map(|name| format!("name:{}", name.trim().to_lowercase()))
}

/// Collapse entries sharing an identity key. The first entry seen for a key wins.
pub fn dedup<'a, I>(entries: I) -> EntrySet
where
    I: IntoIterator<Item = &'a UserEntry>,
{
    let mut keys = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| match identity_key(entry) {
            Some(key) => keys.insert(key),
            None => false,
        })
        .cloned()
        .collect()
}

pub fn is_deleted_account(entry: &UserEntry) -> bool {
    let name = entry
        .display_name
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    DELETED_ACCOUNT_NAMES.contains(&name.as_str())
}

/// Dedup followed by the deleted-account filter, as used for people
pub fn dedup_people(entries: &EntrySet) -> EntrySet {
    dedup(entries)
        .into_iter()
        .filter(|entry| !is_deleted_account(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: Vec<UserEntry>) -> EntrySet {
        entries.into_iter().collect()
    }

    #[test]
    fn test_dedup_by_username_is_case_insensitive() {
        let input = set(vec![
            UserEntry::new()
                .with_username("Alice")
                .with_display_name("Alice")
                .with_link("https://t.me/Alice"),
            UserEntry::new()
                .with_username("alice")
                .with_display_name("Alice 2")
                .with_link("https://t.me/alice"),
        ]);

        let out = dedup(&input);
        assert_eq!(out.len(), 1);
        // first seen wins
        let kept = out.iter().next().unwrap();
        assert_eq!(kept.display_name.as_deref(), Some("Alice"));
        assert_eq!(kept.link.as_deref(), Some("https://t.me/Alice"));
    }

    #[test]
    fn test_username_key_beats_differing_links() {
        let input = set(vec![
            UserEntry::new().with_username("bob").with_link("https://t.me/bob"),
            UserEntry::new().with_username("BOB").with_link("https://example.com/other"),
        ]);
        assert_eq!(dedup(&input).len(), 1);
    }

    #[test]
    fn test_dedup_falls_back_to_link() {
        let input = set(vec![
            UserEntry::new().with_display_name("User One").with_link("https://t.me/some"),
            UserEntry::new().with_display_name("User Two").with_link("https://t.me/some"),
        ]);
        assert_eq!(dedup(&input).len(), 1);
    }

    #[test]
    fn test_dedup_falls_back_to_display_name() {
        let input = set(vec![
            UserEntry::new().with_display_name("  Carol "),
            UserEntry::new().with_display_name("carol"),
            UserEntry::new().with_display_name("Dave"),
        ]);
        assert_eq!(dedup(&input).len(), 2);
    }

    #[test]
    fn test_entries_without_key_are_dropped() {
        let input = set(vec![
            UserEntry::new(),
            UserEntry::new().with_username("   ").with_display_name(""),
        ]);
        assert!(dedup(&input).is_empty());
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let input = set(vec![
            UserEntry::from_handle("alice"),
            UserEntry::from_handle("ALICE"),
            UserEntry::new().with_display_name("Bob"),
            UserEntry::new().with_link("https://t.me/chan"),
            UserEntry::new().with_link("https://T.me/CHAN"),
        ]);
        let once = dedup(&input);
        let twice = dedup(&once);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_detects_deleted_account_in_english_and_russian() {
        assert!(is_deleted_account(&UserEntry::new().with_display_name("Deleted Account")));
        assert!(is_deleted_account(&UserEntry::new().with_display_name(" DELETED ACCOUNT ")));
        assert!(is_deleted_account(&UserEntry::new().with_display_name("Удаленный аккаунт")));
        assert!(is_deleted_account(&UserEntry::new().with_display_name("Удалённый аккаунт")));
        assert!(!is_deleted_account(&UserEntry::new().with_username("bob").with_display_name("Bob")));
        assert!(!is_deleted_account(&UserEntry::from_handle("deleted")));
    }

    #[test]
    fn test_dedup_people_drops_placeholders() {
        let input = set(vec![
            UserEntry::new().with_display_name("Deleted Account"),
            UserEntry::new().with_display_name("Bob"),
        ]);
        let out = dedup_people(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out.iter().next().unwrap().display_name.as_deref(), Some("Bob"));
    }
}
