use std::collections::HashSet;
use std::hash::Hash;

/// Deduplicates a sequence by key, keeping the first occurrence of each key
///
/// Order of survivors follows the input order, so concatenating a preferred
/// list ahead of a fallback list makes the preferred entries win ties.
pub fn merge_first_wins<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}
