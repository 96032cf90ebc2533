//! Ordered keyed container shared by schedules, calendars, teams, resources and users.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::cmp::Ordering;

use crate::error::{CalGridError, CalGridResult};

/// Anything stored in a [`Collection`] carries its own stable key.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Keyed container that remembers insertion order.
///
/// Lookups by key are O(1). Iteration follows insertion order; [`Collection::sort`]
/// returns a sorted view and leaves the storage order alone.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            items: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Keyed> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item under its key. A key that is already present is rejected.
    pub fn add(&mut self, item: T) -> CalGridResult<&T> {
        let key = item.key().to_string();

        match self.items.entry(key) {
            Entry::Occupied(occupied) => Err(CalGridError::DuplicateKey(occupied.key().clone())),
            Entry::Vacant(vacant) => {
                self.order.push(vacant.key().clone());
                Ok(&*vacant.insert(item))
            }
        }
    }

    /// Remove the item stored under `key`. Missing keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let item = self.items.remove(key)?;
        self.order.retain(|k| k != key);
        Some(item)
    }

    /// Remove every item matching `predicate`, returning them in insertion order.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        let doomed: Vec<String> = self
            .iter()
            .filter(|item| predicate(item))
            .map(|item| item.key().to_string())
            .collect();

        doomed.iter().filter_map(|key| self.remove(key)).collect()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.items.get_mut(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|key| self.items.get(key))
    }

    pub fn each(&self, f: impl FnMut(&T)) {
        self.iter().for_each(f);
    }

    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.iter().find(|item| predicate(item))
    }

    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<&T> {
        self.iter().filter(|item| predicate(item)).collect()
    }

    pub fn sort(&self, mut compare: impl FnMut(&T, &T) -> Ordering) -> Vec<&T> {
        let mut sorted: Vec<&T> = self.iter().collect();
        sorted.sort_by(|a, b| compare(a, b));
        sorted
    }

    /// Bucket items by a derived key, keeping insertion order inside each bucket.
    pub fn group_by<K: Ord>(&self, mut key_fn: impl FnMut(&T) -> K) -> BTreeMap<K, Vec<&T>> {
        let mut groups: BTreeMap<K, Vec<&T>> = BTreeMap::new();
        for item in self.iter() {
            groups.entry(key_fn(item)).or_default().push(item);
        }
        groups
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }
}

impl<T: Keyed> FromIterator<T> for Collection<T> {
    /// Later items with an already-seen key are dropped.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Collection::new();
        for item in iter {
            let _ = collection.add(item);
        }
        collection
    }
}

impl<T: Keyed> TryFrom<Vec<T>> for Collection<T> {
    type Error = CalGridError;

    fn try_from(items: Vec<T>) -> CalGridResult<Self> {
        let mut collection = Collection::new();
        for item in items {
            collection.add(item)?;
        }
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        rank: u32,
    }

    impl Keyed for Item {
        fn key(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, rank: u32) -> Item {
        Item {
            id: id.to_string(),
            rank,
        }
    }

    fn ids<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<&'a str> {
        items.into_iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut c = Collection::new();
        c.add(item("b", 1)).unwrap();
        c.add(item("a", 2)).unwrap();
        c.add(item("c", 3)).unwrap();

        assert_eq!(ids(c.iter()), vec!["b", "a", "c"]);
        assert_eq!(c.len(), 3);

        let mut seen = Vec::new();
        c.each(|i| seen.push(i.id.clone()));
        assert_eq!(seen, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut c = Collection::new();
        c.add(item("a", 1)).unwrap();

        let err = c.add(item("a", 99)).unwrap_err();
        assert_eq!(err, CalGridError::DuplicateKey("a".to_string()));
        // Original entry untouched
        assert_eq!(c.get("a").unwrap().rank, 1);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut c = Collection::new();
        c.add(item("a", 1)).unwrap();

        assert!(c.remove("zzz").is_none());
        assert_eq!(c.len(), 1);
        assert_eq!(c.remove("a"), Some(item("a", 1)));
        assert!(c.is_empty());
        assert!(!c.has("a"));
    }

    #[test]
    fn test_remove_where() {
        let mut c: Collection<Item> = vec![item("a", 1), item("b", 2), item("c", 3)]
            .into_iter()
            .collect();

        let removed = c.remove_where(|i| i.rank >= 2);
        assert_eq!(ids(&removed), vec!["b", "c"]);
        assert_eq!(ids(c.iter()), vec!["a"]);
    }

    #[test]
    fn test_sort_does_not_touch_storage_order() {
        let c: Collection<Item> = vec![item("a", 3), item("b", 1), item("c", 2)]
            .into_iter()
            .collect();

        let sorted = c.sort(|x, y| x.rank.cmp(&y.rank));
        assert_eq!(ids(sorted), vec!["b", "c", "a"]);
        assert_eq!(ids(c.iter()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filter_find_and_group_by() {
        let c: Collection<Item> = vec![item("a", 1), item("b", 2), item("c", 3), item("d", 4)]
            .into_iter()
            .collect();

        assert_eq!(ids(c.filter(|i| i.rank % 2 == 0)), vec!["b", "d"]);
        assert_eq!(c.find(|i| i.rank > 2).map(|i| i.id.as_str()), Some("c"));

        let groups = c.group_by(|i| i.rank % 2 == 0);
        assert_eq!(ids(groups[&false].iter().copied()), vec!["a", "c"]);
        assert_eq!(ids(groups[&true].iter().copied()), vec!["b", "d"]);
    }

    #[test]
    fn test_try_from_vec_rejects_duplicates() {
        let result = Collection::try_from(vec![item("a", 1), item("a", 2)]);
        assert!(matches!(result, Err(CalGridError::DuplicateKey(k)) if k == "a"));
    }

    #[test]
    fn test_clear() {
        let mut c: Collection<Item> = vec![item("a", 1)].into_iter().collect();
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.keys().count(), 0);
    }
}
