//! In-memory entity store.
//!
//! One [`EntityStore`] per entity kind. Records are kept in insertion order and
//! addressed by an opaque string id. Every mutation validates the record first;
//! a rejected mutation leaves the store untouched.

use indexmap::IndexMap;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;

/// A record that can live in an [`EntityStore`].
pub trait Record: Clone + Validate {
    /// Human-readable entity kind used in error messages and events.
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Checks the record's invariants. Records with cross-field invariants
    /// extend the derive-based validation.
    fn check(&self) -> Result<(), ServiceError> {
        self.validate().map_err(ServiceError::from)
    }
}

/// Generates a fresh record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone)]
pub struct EntityStore<T: Record> {
    records: IndexMap<String, T>,
}

impl<T: Record> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }

    /// Inserts a record and returns its id.
    ///
    /// An empty id is replaced with a freshly generated one; a supplied id
    /// that is already present fails with `DuplicateId`.
    pub fn create(&mut self, mut record: T) -> Result<String, ServiceError> {
        record.check()?;

        if record.id().is_empty() {
            record.set_id(new_id());
        } else if self.records.contains_key(record.id()) {
            return Err(ServiceError::duplicate_id(T::KIND, record.id()));
        }

        let id = record.id().to_string();
        debug!(kind = T::KIND, %id, "record created");
        self.records.insert(id.clone(), record);
        Ok(id)
    }

    /// Replaces the record stored under `id`, keeping its position.
    pub fn update(&mut self, id: &str, mut record: T) -> Result<(), ServiceError> {
        record.check()?;

        let slot = self
            .records
            .get_mut(id)
            .ok_or_else(|| ServiceError::not_found(T::KIND, id))?;
        record.set_id(id.to_string());
        *slot = record;

        debug!(kind = T::KIND, %id, "record updated");
        Ok(())
    }

    /// Removes and returns the record stored under `id`.
    pub fn delete(&mut self, id: &str) -> Result<T, ServiceError> {
        let removed = self
            .records
            .shift_remove(id)
            .ok_or_else(|| ServiceError::not_found(T::KIND, id))?;

        debug!(kind = T::KIND, %id, "record deleted");
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.get(id)
    }

    /// Like [`get`](Self::get) but signals `NotFound`.
    pub fn require(&self, id: &str) -> Result<&T, ServiceError> {
        self.get(id)
            .ok_or_else(|| ServiceError::not_found(T::KIND, id))
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<&T> {
        self.records.values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.records.values().find(|record| predicate(record))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug, Clone, PartialEq, Validate)]
    struct Note {
        id: String,
        #[validate(length(min = 1))]
        text: String,
    }

    impl Record for Note {
        const KIND: &'static str = "Note";

        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.into(),
            text: text.into(),
        }
    }

    #[test]
    fn test_create_assigns_id_when_missing() {
        let mut store = EntityStore::new();
        let id = store.create(note("", "hello")).unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.get(&id).unwrap().id, id);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut store = EntityStore::new();
        let a = store.create(note("", "a")).unwrap();
        let b = store.create(note("", "b")).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let mut store = EntityStore::new();
        store.create(note("1", "first")).unwrap();
        let err = store.create(note("1", "second")).unwrap_err();
        assert_matches!(err, ServiceError::DuplicateId(_));
        assert_eq!(store.get("1").unwrap().text, "first");
    }

    #[test]
    fn test_create_rejects_invalid_record() {
        let mut store: EntityStore<Note> = EntityStore::new();
        let err = store.create(note("1", "")).unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = EntityStore::new();
        for id in ["c", "a", "b"] {
            store.create(note(id, id)).unwrap();
        }
        let ids: Vec<&str> = store.list().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_update_keeps_position_and_forces_id() {
        let mut store = EntityStore::new();
        store.create(note("1", "one")).unwrap();
        store.create(note("2", "two")).unwrap();

        store.update("1", note("other", "uno")).unwrap();

        let list = store.list();
        assert_eq!(list[0], &note("1", "uno"));
        assert_eq!(list[1], &note("2", "two"));
    }

    #[test]
    fn test_update_missing_id_leaves_store_unchanged() {
        let mut store = EntityStore::new();
        store.create(note("1", "one")).unwrap();

        let err = store.update("404", note("404", "ghost")).unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
        assert_eq!(store.list(), vec![&note("1", "one")]);
    }

    #[test]
    fn test_delete_preserves_remaining_order() {
        let mut store = EntityStore::new();
        for id in ["1", "2", "3"] {
            store.create(note(id, id)).unwrap();
        }

        let removed = store.delete("2").unwrap();
        assert_eq!(removed.id, "2");

        let ids: Vec<&str> = store.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_matches!(store.delete("2"), Err(ServiceError::NotFound(_)));
    }
}
