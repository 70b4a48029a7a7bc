//! Session-backed storage.

use super::{BasketState, RuntimeStorage, Storage};
use crate::config::BasketConfig;
use crate::error::BasketError;
use crate::ids::BasketId;
use crate::item::Item;
use tracing::debug;
use turbo_cache::{Session, SessionId};

/// Storage that keeps baskets in memory during a request and in a
/// `turbo_cache` session between requests.
///
/// Nothing is written implicitly: the host calls [`Storage::restore`]
/// (done by `Basket::new`) when a request starts and [`Storage::save`]
/// (`Basket::save`) when it ends.
///
/// ```
/// use turbo_basket::{Basket, NewItem, RuntimeIdentifier, SessionStorage};
/// use turbo_cache::SessionId;
///
/// let session = SessionId::new("sess_doc");
///
/// let storage = SessionStorage::open("doc-baskets", session.clone()).unwrap();
/// let mut basket = Basket::new(storage, RuntimeIdentifier::with_id("b1")).unwrap();
/// basket
///     .insert(NewItem::new().id("tee").name("Tee").price(10.0).quantity(2).weight(0.2))
///     .unwrap();
/// basket.save().unwrap();
///
/// // Next request
/// let storage = SessionStorage::open("doc-baskets", session).unwrap();
/// let basket = Basket::new(storage, RuntimeIdentifier::with_id("b1")).unwrap();
/// assert_eq!(basket.total_items(false), 2);
/// ```
#[derive(Debug)]
pub struct SessionStorage {
    inner: RuntimeStorage,
    session: Session<BasketState>,
    session_id: SessionId,
}

impl SessionStorage {
    /// Storage on a named key-value store, for one client session.
    pub fn open(store: &str, session_id: SessionId) -> Result<Self, BasketError> {
        Ok(Self::with_session(Session::with_store(store)?, session_id))
    }

    /// Storage on the store named in the configuration, with the
    /// configured default basket active until an identifier is set.
    pub fn open_with_config(
        config: &BasketConfig,
        session_id: SessionId,
    ) -> Result<Self, BasketError> {
        let mut storage = Self::open(&config.session.store, session_id)?;
        storage.inner.set_identifier(BasketId::new(&config.default_basket));
        Ok(storage)
    }

    /// Storage on an already opened session store.
    pub fn with_session(session: Session<BasketState>, session_id: SessionId) -> Self {
        Self {
            inner: RuntimeStorage::new(),
            session,
            session_id,
        }
    }

    /// The client session this storage persists into.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Drop the persisted state for this session and everything held in memory.
    pub fn clear_session(&mut self) -> Result<(), BasketError> {
        self.session.delete(&self.session_id)?;
        self.inner.replace_state(BasketState::default());
        Ok(())
    }
}

impl Storage for SessionStorage {
    fn insert_update(&mut self, item: Item) {
        self.inner.insert_update(item);
    }

    fn data(&mut self) -> &mut Vec<Item> {
        self.inner.data()
    }

    fn contents(&self) -> &[Item] {
        self.inner.contents()
    }

    fn set_identifier(&mut self, id: BasketId) {
        self.inner.set_identifier(id);
    }

    fn identifier(&self) -> &BasketId {
        self.inner.identifier()
    }

    fn restore(&mut self) -> Result<(), BasketError> {
        if let Some(state) = self.session.get(&self.session_id)? {
            debug!(session = %self.session_id, "restoring baskets from session");
            self.inner.replace_state(state);
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), BasketError> {
        debug!(session = %self.session_id, "saving baskets to session");
        self.session.set(&self.session_id, self.inner.state())?;
        Ok(())
    }
}
