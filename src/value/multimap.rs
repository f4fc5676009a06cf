// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! An ordered, multi-valued string map.
//!
//! [`NameValueMap`] models header-like collections where one key may carry
//! several values. Keys keep the casing they were first inserted with, and
//! lookups are ASCII case-insensitive. Within a key, value order is the
//! order of insertion.
//!
//! When mapped to a document, a key with exactly one value becomes a bare
//! string and a key with several values becomes an array of strings (see
//! the [`ToValue`](crate::ToValue) impl in [`crate::convert`]).
use smallvec::SmallVec;

// Most keys carry a single value, so one inline slot avoids the
// per-key allocation in the common case.
type Values = SmallVec<[String; 1]>;

/// An insertion-ordered string map where each key holds one or more values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NameValueMap {
    entries: Vec<(String, Values)>,
}

impl NameValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Appends a value under `key`, keeping any values already present.
    ///
    /// The key keeps the casing of its first insertion.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1.push(value.into()),
            None => {
                let mut values = Values::new();
                values.push(value.into());
                self.entries.push((key, values));
            }
        }
    }

    /// Replaces all values under `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.position(&key) {
            Some(i) => {
                self.entries[i].1.clear();
                self.entries[i].1.push(value.into());
            }
            None => self.append(key, value),
        }
    }

    /// Returns the first value under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key)
            .map(|i| self.entries[i].1[0].as_str())
    }

    /// Returns all values under `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.position(key).map(|i| self.entries[i].1.as_slice())
    }

    /// Removes `key` and all its values.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Iterates over `(key, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, vs)| (k.as_str(), vs.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_accumulates_and_set_replaces() {
        let mut map = NameValueMap::new();
        map.append("accept", "text/html");
        map.append("accept", "application/json");
        assert_eq!(
            map.get_all("accept").unwrap(),
            &["text/html".to_string(), "application/json".to_string()]
        );

        map.set("accept", "*/*");
        assert_eq!(map.get_all("accept").unwrap(), &["*/*".to_string()]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn lookups_are_case_insensitive_but_casing_is_preserved() {
        let mut map = NameValueMap::new();
        map.append("KeyNumber2", "value-2");
        map.append("keynumber2", "value-3");

        assert_eq!(map.get("KEYNUMBER2"), Some("value-2"));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["KeyNumber2"]);
        assert_eq!(map.get_all("KeyNumber2").unwrap().len(), 2);
    }

    #[test]
    fn remove_drops_every_value_of_the_key() {
        let mut map = NameValueMap::new();
        map.append("key-1", "value-1");
        map.append("key-1", "value-2");
        assert!(map.remove("KEY-1"));
        assert!(map.is_empty());
        assert!(!map.remove("key-1"));
    }
}
