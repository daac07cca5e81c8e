use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{KeyValueStore, StoreError};

/// Entity addressable by a string key inside a [`Collection`].
pub trait Record: Clone + Serialize + DeserializeOwned + Send + 'static {
    fn key(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record '{0}' already exists")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode collection '{collection}': {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// An ordered, durable list of records stored wholesale under a single key.
///
/// The whole list is decoded once at [`Collection::load`] and re-encoded after
/// every mutation, so a half-applied change is never visible in the store.
pub struct Collection<T, S> {
    key: &'static str,
    store: Arc<S>,
    items: Mutex<Vec<T>>,
}

impl<T, S> Collection<T, S>
where
    T: Clone + Serialize + DeserializeOwned + Send + 'static,
    S: KeyValueStore,
{
    /// Decode the stored list. A missing or malformed blob yields an empty
    /// collection; only a failing store is an error.
    pub fn load(key: &'static str, store: Arc<S>) -> Result<Self, RepositoryError> {
        let items = match store.get(key)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => items,
                Err(err) => {
                    warn!(collection = key, error = %err, "discarding unreadable collection");
                    Vec::new()
                }
            },
        };
        debug!(collection = key, records = items.len(), "collection loaded");

        Ok(Self {
            key,
            store,
            items: Mutex::new(items),
        })
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn all(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.is_empty())
    }

    /// Overwrite the entire collection.
    pub fn replace_all(&self, items: Vec<T>) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        self.persist(&items)?;
        *guard = items;
        Ok(())
    }

    pub fn append(&self, item: T) -> Result<(), RepositoryError> {
        self.mutate(|items| {
            items.push(item);
        })
    }

    fn mutate<R>(&self, change: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, RepositoryError> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let result = change(&mut next);
        self.persist(&next)?;
        *guard = next;
        Ok(result)
    }

    fn persist(&self, items: &[T]) -> Result<(), RepositoryError> {
        let encoded = serde_json::to_string(items).map_err(|source| RepositoryError::Encode {
            collection: self.key,
            source,
        })?;
        self.store.set(self.key, &encoded)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>, RepositoryError> {
        self.items
            .lock()
            .map_err(|_| RepositoryError::Store(StoreError::Poisoned))
    }
}

impl<T, S> Collection<T, S>
where
    T: Record,
    S: KeyValueStore,
{
    pub fn get(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        Ok(self.lock()?.iter().find(|item| item.key() == key).cloned())
    }

    pub fn contains(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.iter().any(|item| item.key() == key))
    }

    /// Add a record whose key must not exist yet.
    pub fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|item| item.key() == record.key()) {
            return Err(RepositoryError::Conflict(record.key().to_string()));
        }
        let mut next = guard.clone();
        next.push(record.clone());
        self.persist(&next)?;
        *guard = next;
        Ok(record)
    }

    /// Replace the record with the same key in place, or append it.
    pub fn put(&self, record: T) -> Result<T, RepositoryError> {
        let stored = record.clone();
        self.mutate(move |items| {
            match items.iter_mut().find(|item| item.key() == record.key()) {
                Some(slot) => *slot = record,
                None => items.push(record),
            }
        })?;
        Ok(stored)
    }

    /// Apply `change` to the record under `key`. `Ok(None)` when absent;
    /// nothing is written in that case.
    pub fn patch(
        &self,
        key: &str,
        change: impl FnOnce(&mut T),
    ) -> Result<Option<T>, RepositoryError> {
        let mut guard = self.lock()?;
        let Some(index) = guard.iter().position(|item| item.key() == key) else {
            return Ok(None);
        };
        let mut next = guard.clone();
        change(&mut next[index]);
        let updated = next[index].clone();
        self.persist(&next)?;
        *guard = next;
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Record for Note {
        fn key(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.to_string(),
            body: body.to_string(),
        }
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only"),
            })
        }
    }

    #[test]
    fn malformed_blob_loads_as_empty() {
        let store = Arc::new(MemoryStore::new().with_entry("notes", "{not json"));
        let notes: Collection<Note, _> = Collection::load("notes", store).expect("loads");
        assert!(notes.is_empty().expect("len"));
    }

    #[test]
    fn mutations_rewrite_the_whole_blob() {
        let store = Arc::new(MemoryStore::new());
        let notes = Collection::load("notes", store.clone()).expect("loads");
        notes.insert(note("a", "first")).expect("insert");
        notes.put(note("b", "second")).expect("put");
        notes
            .patch("a", |n: &mut Note| n.body = "edited".to_string())
            .expect("patch");

        let raw = store.get("notes").expect("get").expect("written");
        let decoded: Vec<Note> = serde_json::from_str(&raw).expect("decodes");
        assert_eq!(decoded, vec![note("a", "edited"), note("b", "second")]);
    }

    #[test]
    fn put_replaces_in_place() {
        let notes = Collection::load("notes", Arc::new(MemoryStore::new())).expect("loads");
        notes.put(note("a", "one")).expect("put");
        notes.put(note("b", "two")).expect("put");
        notes.put(note("a", "three")).expect("put");
        assert_eq!(
            notes.all().expect("all"),
            vec![note("a", "three"), note("b", "two")]
        );
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let notes = Collection::load("notes", Arc::new(MemoryStore::new())).expect("loads");
        notes.insert(note("a", "one")).expect("insert");
        assert!(matches!(
            notes.insert(note("a", "again")),
            Err(RepositoryError::Conflict(key)) if key == "a"
        ));
    }

    #[test]
    fn patch_of_missing_record_is_none() {
        let notes: Collection<Note, _> =
            Collection::load("notes", Arc::new(MemoryStore::new())).expect("loads");
        assert!(notes.patch("nope", |_| {}).expect("patch").is_none());
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let notes: Collection<Note, _> =
            Collection::load("notes", Arc::new(ReadOnlyStore)).expect("loads");
        assert!(notes.append(note("a", "one")).is_err());
        assert!(notes.is_empty().expect("len"));
    }
}
