//! Type-safe Key-Value store and session persistence for TurboCommerce.
//!
//! Values are stored as JSON. On `wasm32` the cache talks to Spin's
//! Key-Value Store; native builds get an in-memory store per thread,
//! addressed by name, so two handles opened on the same name see the
//! same data for the lifetime of the thread.
//!
//! # Example
//!
//! ```rust
//! use turbo_cache::{Cache, Session, SessionId};
//!
//! let cache = Cache::open("doc-example").unwrap();
//! cache.set("greeting", &"hello").unwrap();
//! let value: Option<String> = cache.get("greeting").unwrap();
//! assert_eq!(value.as_deref(), Some("hello"));
//!
//! let sessions = Session::<Vec<u32>>::with_store("doc-sessions").unwrap();
//! let id = SessionId::generate();
//! sessions.set(&id, &vec![1, 2, 3]).unwrap();
//! assert_eq!(sessions.get(&id).unwrap(), Some(vec![1, 2, 3]));
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::Cache;
pub use session::{Session, SessionData, SessionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Session, SessionId};
}
