//! Pure reconciliation helpers shared by every local collection.
//!
//! The push channel offers no ordering guarantee, so collections are
//! maintained with idempotent, replace-by-id operations: replaying the
//! same event, or applying events out of order, converges to a state the
//! next full refetch can correct.

/// Insert at the front unless an entry already matches.
///
/// Guards against a duplicate delivery racing a manual refetch. Returns
/// `true` when the candidate was inserted.
pub fn prepend_if_absent<T>(
    items: &mut Vec<T>,
    candidate: T,
    matches: impl Fn(&T) -> bool,
) -> bool {
    if items.iter().any(&matches) {
        return false;
    }
    items.insert(0, candidate);
    true
}

/// Replace every matching entry with a clone of `replacement`.
///
/// Whole-record replacement, never a partial patch. Returns `true` when
/// anything was replaced.
pub fn replace_where<T: Clone>(
    items: &mut Vec<T>,
    replacement: &T,
    matches: impl Fn(&T) -> bool,
) -> bool {
    let mut replaced = false;
    for slot in items.iter_mut() {
        if matches(slot) {
            *slot = replacement.clone();
            replaced = true;
        }
    }
    replaced
}

/// Remove every matching entry. Returns `true` when anything was removed.
pub fn remove_where<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

/// Replace the matching entry, or insert at the front when absent.
pub fn upsert_front<T: Clone>(items: &mut Vec<T>, item: &T, matches: impl Fn(&T) -> bool) {
    if !replace_where(items, item, &matches) {
        items.insert(0, item.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_if_absent_guards_duplicates() {
        let mut items = vec![(1, "a"), (2, "b")];
        assert!(prepend_if_absent(&mut items, (3, "c"), |(id, _)| *id == 3));
        assert!(!prepend_if_absent(&mut items, (3, "again"), |(id, _)| *id == 3));
        assert_eq!(items, vec![(3, "c"), (1, "a"), (2, "b")]);
    }

    #[test]
    fn test_replace_where_is_idempotent_under_replay() {
        let mut items = vec![(1, "old"), (2, "other")];
        let replacement = (1, "new");

        assert!(replace_where(&mut items, &replacement, |(id, _)| *id == 1));
        let once = items.clone();
        assert!(replace_where(&mut items, &replacement, |(id, _)| *id == 1));
        assert_eq!(items, once);
        assert_eq!(items.iter().filter(|(id, _)| *id == 1).count(), 1);
    }

    #[test]
    fn test_replace_where_misses_absent_ids() {
        let mut items = vec![(1, "a")];
        assert!(!replace_where(&mut items, &(9, "x"), |(id, _)| *id == 9));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_remove_where_is_unconditional() {
        let mut items = vec![(1, "a"), (2, "b"), (1, "dup")];
        assert!(remove_where(&mut items, |(id, _)| *id == 1));
        assert_eq!(items, vec![(2, "b")]);
        assert!(!remove_where(&mut items, |(id, _)| *id == 1));
    }

    #[test]
    fn test_upsert_front_replaces_or_inserts() {
        let mut items = vec![(1, "a")];
        upsert_front(&mut items, &(1, "a2"), |(id, _)| *id == 1);
        assert_eq!(items, vec![(1, "a2")]);
        upsert_front(&mut items, &(2, "b"), |(id, _)| *id == 2);
        assert_eq!(items, vec![(2, "b"), (1, "a2")]);
    }
}
