//! Session persistence on top of the Key-Value cache.

use crate::{Cache, CacheError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Envelope written to the cache for each session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    /// The session ID.
    pub id: SessionId,
    /// User-defined session data.
    pub data: T,
    /// Number of writes since the session was created.
    pub version: u64,
    /// When the session was created (Unix timestamp).
    pub created_at: u64,
    /// When the session was last written (Unix timestamp).
    pub updated_at: u64,
}

/// Session store, generic over the payload type `T`.
///
/// # Example
///
/// ```rust
/// use turbo_cache::{Session, SessionId};
///
/// let sessions = Session::<Vec<String>>::with_store("session-doc").unwrap();
/// let id = SessionId::from("abc123");
///
/// sessions.set(&id, &vec!["item".to_string()]).unwrap();
/// assert_eq!(sessions.get(&id).unwrap().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct Session<T> {
    cache: Cache,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Session<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a session store on a named Key-Value store.
    pub fn with_store(name: &str) -> Result<Self, CacheError> {
        Ok(Self::with_cache(Cache::open(name)?))
    }

    /// Create a session store on an already opened cache.
    pub fn with_cache(cache: Cache) -> Self {
        Self {
            cache,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Get session data if it exists.
    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.get_versioned(id)?.map(|s| s.data))
    }

    /// Get the full envelope including version and timestamps.
    pub fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        self.cache.get::<SessionData<T>>(&self.session_key(id))
    }

    /// Set session data, bumping the version and keeping the creation time.
    pub fn set(&self, id: &SessionId, data: &T) -> Result<(), CacheError> {
        let now = now_secs();
        let (version, created_at) = self
            .get_versioned(id)?
            .map(|p| (p.version + 1, p.created_at))
            .unwrap_or((1, now));

        let envelope = SessionEnvelope {
            id,
            data,
            version,
            created_at,
            updated_at: now,
        };
        debug!(session = %id, version, "writing session");
        self.cache.set(&self.session_key(id), &envelope)
    }

    /// Delete a session.
    pub fn delete(&self, id: &SessionId) -> Result<(), CacheError> {
        debug!(session = %id, "deleting session");
        self.cache.delete(&self.session_key(id))
    }

    fn session_key(&self, id: &SessionId) -> String {
        crate::cache_key!("session", id)
    }
}

/// Borrowed form of [`SessionData`] so writes don't clone the payload.
#[derive(Serialize)]
struct SessionEnvelope<'a, T> {
    id: &'a SessionId,
    data: &'a T,
    version: u64,
    created_at: u64,
    updated_at: u64,
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
