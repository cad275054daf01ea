// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Keyed registry for shared catalog entities.
//!
//! Tree nodes never own a catalog entity; they hold the entity's key and
//! resolve it through the Project's `Catalog` at read time. The registry is
//! insertion-ordered so that exporters can emit catalog entries in a stable
//! declaration order, and entries freeze once the first reference has been
//! handed out.

use std::collections::HashMap;

use crate::common::{Error, ErrorCode, ErrorKind, Result};

#[derive(Clone, Debug, PartialEq)]
struct Entry<T> {
    key: String,
    value: T,
    referenced: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog<T> {
    entries: Vec<Entry<T>>,
    index: HashMap<String, usize>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Catalog {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Catalog<T> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert an entity under `key`. If the key is already present the
    /// existing entity wins and its position is returned: deduplication is
    /// by key, never by value, so structurally-identical entities under
    /// different keys stay distinct.
    pub fn insert(&mut self, key: &str, value: T) -> usize {
        if let Some(&pos) = self.index.get(key) {
            return pos;
        }
        let pos = self.entries.len();
        self.entries.push(Entry {
            key: key.to_owned(),
            value,
            referenced: false,
        });
        self.index.insert(key.to_owned(), pos);
        pos
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&pos| &self.entries[pos].value)
    }

    /// Position of `key` in declaration order, used by exporters as the
    /// entity's identity number in the target document.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Record that a tree node now references `key`. From this point on the
    /// entry may not be changed: every usage site assumed the value it saw.
    pub fn mark_referenced(&mut self, key: &str) -> Result<()> {
        match self.index.get(key) {
            Some(&pos) => {
                self.entries[pos].referenced = true;
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::Model,
                ErrorCode::UnresolvedReference,
                Some(format!("no catalog entry for key '{key}'")),
            )),
        }
    }

    /// Replace the entity stored under `key`. Fails with `CatalogFrozen`
    /// once any reference to the entry has been handed out, so shared
    /// definitions cannot silently diverge from their usage sites.
    pub fn update(&mut self, key: &str, value: T) -> Result<()> {
        match self.index.get(key) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                if entry.referenced {
                    return Err(Error::new(
                        ErrorKind::Model,
                        ErrorCode::CatalogFrozen,
                        Some(format!("catalog entry '{key}' is already referenced")),
                    ));
                }
                entry.value = value;
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::Model,
                ErrorCode::DoesNotExist,
                Some(format!("no catalog entry for key '{key}'")),
            )),
        }
    }

    /// Entities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_dedups_by_key_not_value() {
        let mut catalog: Catalog<f64> = Catalog::new();
        let a = catalog.insert("mat_a", 1.0);
        let b = catalog.insert("mat_a", 2.0);
        assert_eq!(a, b);
        assert_eq!(catalog.len(), 1);
        // first insert wins
        assert_eq!(catalog.get("mat_a"), Some(&1.0));

        // same value, different key: distinct entity
        catalog.insert("mat_b", 1.0);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn declaration_order_is_stable() {
        let mut catalog: Catalog<i32> = Catalog::new();
        catalog.insert("z", 0);
        catalog.insert("a", 1);
        catalog.insert("m", 2);
        let keys: Vec<&str> = catalog.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(catalog.position("m"), Some(2));
    }

    #[test]
    fn update_fails_once_referenced() {
        let mut catalog: Catalog<i32> = Catalog::new();
        catalog.insert("k", 1);
        catalog.update("k", 2).unwrap();
        assert_eq!(catalog.get("k"), Some(&2));

        catalog.mark_referenced("k").unwrap();
        let err = catalog.update("k", 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogFrozen);
        assert_eq!(catalog.get("k"), Some(&2));
    }

    #[test]
    fn mark_referenced_unknown_key_errors() {
        let mut catalog: Catalog<i32> = Catalog::new();
        let err = catalog.mark_referenced("missing").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnresolvedReference);
    }
}
