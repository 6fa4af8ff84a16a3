/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagMap {
    inner: BTreeMap<String, String>,
}

impl TagMap {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.insert(name.into(), value.into())
    }

    #[inline]
    pub fn extend(&mut self, other: Self) {
        self.inner.extend(other.inner)
    }

    /// Insert the tags of `other` whose keys are not present yet.
    pub fn fill(&mut self, other: &Self) {
        for (k, v) in other.inner.iter() {
            if !self.inner.contains_key(k) {
                self.inner.insert(k.clone(), v.clone());
            }
        }
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(|s| s.as_str())
    }

    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.inner.remove(key)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(|k| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = TagMap::default();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill() {
        let mut origin = TagMap::from_iter([("host", "a"), ("region", "cn")]);
        let global = TagMap::from_iter([("host", "b"), ("project", "p1")]);
        origin.fill(&global);
        assert_eq!(origin.len(), 3);
        assert_eq!(origin.get("host"), Some("a"));
        assert_eq!(origin.get("project"), Some("p1"));
    }

    #[test]
    fn ordered_iter() {
        let map = TagMap::from_iter([("b", "2"), ("a", "1"), ("c", "3")]);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
