//! Eviction Policy Module
//!
//! Picks the single entry an eviction should remove.

use indexmap::IndexMap;

use crate::cache::{CacheEntry, Timestamp};

// == Select Victim ==
/// Returns the insertion-order index of the entry to evict, or None if
/// there are no entries.
///
/// Entries are scanned in insertion order:
/// - The first expired entry found wins immediately, even if a later one
///   expired earlier.
/// - Otherwise the entry with the lowest `last_used_at` wins, and ties go
///   to the entry inserted first.
pub(crate) fn select_victim<K, V>(
    entries: &IndexMap<K, CacheEntry<V>>,
    now: Timestamp,
) -> Option<usize> {
    let mut lru: Option<(usize, Timestamp)> = None;

    for (index, (_, entry)) in entries.iter().enumerate() {
        if entry.meta.is_expired_at(now) {
            return Some(index);
        }
        match lru {
            Some((_, oldest)) if entry.meta.last_used_at >= oldest => {}
            _ => lru = Some((index, entry.meta.last_used_at)),
        }
    }

    lru.map(|(index, _)| index)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EntryMeta;

    fn entry(expires_at: Option<Timestamp>, last_used_at: Timestamp) -> CacheEntry<()> {
        CacheEntry::new(
            (),
            EntryMeta {
                size: 1,
                expires_at,
                last_used_at,
            },
        )
    }

    #[test]
    fn test_select_victim_empty() {
        let entries: IndexMap<&str, CacheEntry<()>> = IndexMap::new();
        assert_eq!(select_victim(&entries, 0), None);
    }

    #[test]
    fn test_select_victim_lowest_last_used() {
        let mut entries = IndexMap::new();
        entries.insert("a", entry(None, 30));
        entries.insert("b", entry(None, 10));
        entries.insert("c", entry(None, 20));

        assert_eq!(select_victim(&entries, 100), Some(1));
    }

    #[test]
    fn test_select_victim_ties_go_to_first_inserted() {
        let mut entries = IndexMap::new();
        entries.insert("a", entry(None, 10));
        entries.insert("b", entry(None, 10));

        assert_eq!(select_victim(&entries, 100), Some(0));
    }

    #[test]
    fn test_select_victim_expired_beats_lru() {
        let mut entries = IndexMap::new();
        entries.insert("a", entry(None, 1));
        entries.insert("b", entry(Some(50), 90));

        assert_eq!(select_victim(&entries, 100), Some(1));
    }

    #[test]
    fn test_select_victim_first_expired_not_most_expired() {
        let mut entries = IndexMap::new();
        entries.insert("a", entry(None, 1));
        entries.insert("b", entry(Some(80), 5));
        entries.insert("c", entry(Some(10), 5));

        assert_eq!(select_victim(&entries, 100), Some(1));
    }

    #[test]
    fn test_select_victim_expiry_boundary_is_not_expired() {
        let mut entries = IndexMap::new();
        entries.insert("a", entry(None, 1));
        entries.insert("b", entry(Some(100), 50));

        // `b` expires exactly now, so it is not preferred over the LRU entry.
        assert_eq!(select_victim(&entries, 100), Some(0));
    }
}
