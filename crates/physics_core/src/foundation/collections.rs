//! Specialized collection types

pub use slotmap::{new_key_type, Key, SlotMap};

/// Slot map that also remembers insertion order
///
/// Keys stay stable across removals like a plain [`SlotMap`], and iteration
/// visits live entries in the order they were inserted.
#[derive(Debug, Clone)]
pub struct OrderedSlotMap<K: Key, V> {
    slots: SlotMap<K, V>,
    order: Vec<K>,
}

impl<K: Key, V> OrderedSlotMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Insert a value at the end of the order and return its key
    pub fn insert(&mut self, value: V) -> K {
        let key = self.slots.insert(value);
        self.order.push(key);
        key
    }

    /// Remove a value, dropping its key from the order
    ///
    /// Returns the value only when the key was present in both the slots and
    /// the order.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let position = self.position(key);
        let value = self.slots.remove(key);
        if let Some(position) = position {
            self.order.remove(position);
        }
        value.filter(|_| position.is_some())
    }

    /// Position of the key in insertion order
    pub fn position(&self, key: K) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == key)
    }

    /// Get a value by key
    pub fn get(&self, key: K) -> Option<&V> {
        self.slots.get(key)
    }

    /// Get a mutable value by key
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.slots.get_mut(key)
    }

    /// Whether the key is live in the slots
    pub fn contains_key(&self, key: K) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.order.iter().copied()
    }

    /// Entries in insertion order
    ///
    /// Keys in the order with no live slot are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.order
            .iter()
            .filter_map(move |key| self.slots.get(*key).map(|value| (*key, value)))
    }

    /// Check that the slots and the order name the same keys
    ///
    /// Returns a description of the first mismatch found.
    pub fn check_consistency(&self) -> Result<(), String> {
        if let Some(missing) = self.order.iter().find(|key| !self.slots.contains_key(**key)) {
            return Err(format!("ordered key {missing:?} has no slot"));
        }
        if let Some((orphan, _)) = self.slots.iter().find(|(key, _)| !self.order.contains(key)) {
            return Err(format!("slot {orphan:?} is missing from the order"));
        }
        if self.order.len() != self.slots.len() {
            return Err(format!(
                "order lists {} keys for {} slots",
                self.order.len(),
                self.slots.len()
            ));
        }
        Ok(())
    }
}

impl<K: Key, V> Default for OrderedSlotMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    new_key_type! {
        struct TestKey;
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut map: OrderedSlotMap<TestKey, &str> = OrderedSlotMap::new();
        let a = map.insert("a");
        let b = map.insert("b");
        let c = map.insert("c");

        assert_eq!(map.remove(b), Some("b"));
        let d = map.insert("d");

        assert_eq!(map.keys().collect::<Vec<_>>(), vec![a, c, d]);
        assert_eq!(map.iter().map(|(_, value)| *value).collect::<Vec<_>>(), vec!["a", "c", "d"]);
        assert!(map.check_consistency().is_ok());
    }

    #[test]
    fn test_removed_keys_stay_dead() {
        let mut map: OrderedSlotMap<TestKey, u32> = OrderedSlotMap::new();
        let key = map.insert(7);

        assert_eq!(map.remove(key), Some(7));
        assert_eq!(map.remove(key), None);
        assert!(!map.contains_key(key));
        assert!(map.is_empty());
    }
}
