//! Key-Value store wrapper with automatic serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

/// Store name that maps to Spin's default store.
pub const DEFAULT_STORE: &str = "default";

#[cfg(not(target_arch = "wasm32"))]
type MemoryStore = Rc<RefCell<BTreeMap<String, Vec<u8>>>>;

#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static STORES: RefCell<BTreeMap<String, MemoryStore>> = RefCell::new(BTreeMap::new());
}

/// Type-safe cache over a Key-Value store.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
pub struct Cache {
    name: String,
    #[cfg(target_arch = "wasm32")]
    store: spin_sdk::key_value::Store,
    #[cfg(not(target_arch = "wasm32"))]
    store: MemoryStore,
}

impl Cache {
    /// Open a named Key-Value store.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use turbo_cache::Cache;
    /// let cache = Cache::open("baskets").unwrap();
    /// assert_eq!(cache.name(), "baskets");
    /// ```
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        let store = if name == DEFAULT_STORE {
            spin_sdk::key_value::Store::open_default()
        } else {
            spin_sdk::key_value::Store::open(name)
        }
        .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            store,
        })
    }

    /// Open a named Key-Value store.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use turbo_cache::Cache;
    /// let cache = Cache::open("baskets").unwrap();
    /// assert_eq!(cache.name(), "baskets");
    /// ```
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        if name.is_empty() {
            return Err(CacheError::OpenError("store name is empty".to_string()));
        }
        let store = STORES.with(|stores| {
            stores
                .borrow_mut()
                .entry(name.to_string())
                .or_default()
                .clone()
        });
        Ok(Self {
            name: name.to_string(),
            store,
        })
    }

    /// Name of the store this handle was opened on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.set_raw(key, &bytes)
    }

    #[cfg(target_arch = "wasm32")]
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.store
            .get(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.store.borrow().get(key).cloned())
    }

    #[cfg(target_arch = "wasm32")]
    fn set_raw(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.store
            .set(key, bytes)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn set_raw(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.store
            .borrow_mut()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    /// Delete a value from the cache. Deleting a missing key is not an error.
    #[cfg(target_arch = "wasm32")]
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store
            .delete(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    /// Delete a value from the cache. Deleting a missing key is not an error.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.borrow_mut().remove(key);
        Ok(())
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("name", &self.name).finish()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust
/// let key = turbo_cache::cache_key!("basket", "sess_abc", 7);
/// assert_eq!(key, "basket:sess_abc:7");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache = Cache::open("kv-set-get").unwrap();
        cache.set("answer", &42u32).unwrap();
        assert_eq!(cache.get::<u32>("answer").unwrap(), Some(42));
        assert_eq!(cache.get::<u32>("missing").unwrap(), None);
    }

    #[test]
    fn test_handles_share_named_store() {
        let a = Cache::open("kv-shared").unwrap();
        let b = Cache::open("kv-shared").unwrap();
        a.set("k", &"v").unwrap();
        assert_eq!(b.get::<String>("k").unwrap().as_deref(), Some("v"));

        let other = Cache::open("kv-shared-other").unwrap();
        assert_eq!(other.get::<String>("k").unwrap(), None);
    }

    #[test]
    fn test_delete() {
        let cache = Cache::open("kv-delete").unwrap();
        cache.set("a", &2).unwrap();
        cache.delete("a").unwrap();
        cache.delete("never-set").unwrap();
        assert_eq!(cache.get::<u32>("a").unwrap(), None);
    }

    #[test]
    fn test_type_mismatch_is_serialize_error() {
        let cache = Cache::open("kv-mismatch").unwrap();
        cache.set("k", &"not a number").unwrap();
        let err = cache.get::<u32>("k").unwrap_err();
        assert!(matches!(err, CacheError::SerializeError(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(Cache::open(""), Err(CacheError::OpenError(_))));
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("session", "abc"), "session:abc");
    }
}
