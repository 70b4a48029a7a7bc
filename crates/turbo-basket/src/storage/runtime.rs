//! In-process storage.

use super::Storage;
use crate::ids::BasketId;
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Every basket's items, keyed by basket id.
///
/// This is also the payload the session backend persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketState {
    baskets: BTreeMap<BasketId, Vec<Item>>,
}

impl BasketState {
    /// Items of one basket, if it exists.
    pub fn basket(&self, id: &BasketId) -> Option<&[Item]> {
        self.baskets.get(id).map(Vec::as_slice)
    }

    /// Ids of every known basket.
    pub fn basket_ids(&self) -> impl Iterator<Item = &BasketId> {
        self.baskets.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.values().all(Vec::is_empty)
    }
}

/// Storage held in an explicitly owned value.
///
/// Items live as long as the `RuntimeStorage` does; share one instance
/// across baskets by handing it around rather than through globals.
///
/// ```
/// use turbo_basket::{BasketId, RuntimeStorage, Storage};
///
/// let mut storage = RuntimeStorage::new();
/// assert_eq!(storage.identifier().as_str(), "basket");
///
/// storage.set_identifier(BasketId::new("guest-1"));
/// assert!(storage.contents().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuntimeStorage {
    active: BasketId,
    state: BasketState,
}

impl RuntimeStorage {
    /// Empty storage with the default basket active.
    pub fn new() -> Self {
        let mut storage = Self::default();
        storage.ensure_active();
        storage
    }

    /// Storage seeded from previously saved state.
    pub fn from_state(state: BasketState) -> Self {
        let mut storage = Self {
            active: BasketId::default(),
            state,
        };
        storage.ensure_active();
        storage
    }

    /// Everything held, across all baskets.
    pub fn state(&self) -> &BasketState {
        &self.state
    }

    /// Replace everything held, keeping the active basket id.
    pub fn replace_state(&mut self, state: BasketState) {
        self.state = state;
        self.ensure_active();
    }

    fn ensure_active(&mut self) -> &mut Vec<Item> {
        self.state.baskets.entry(self.active.clone()).or_default()
    }
}

impl Storage for RuntimeStorage {
    fn insert_update(&mut self, item: Item) {
        let items = self.ensure_active();
        let slot = item
            .identifier()
            .and_then(|key| items.iter().position(|i| i.identifier() == Some(key)));
        match slot {
            Some(index) => items[index] = item,
            None => items.push(item),
        }
    }

    fn data(&mut self) -> &mut Vec<Item> {
        self.ensure_active()
    }

    fn contents(&self) -> &[Item] {
        self.state.basket(&self.active).unwrap_or(&[])
    }

    fn set_identifier(&mut self, id: BasketId) {
        debug!(basket = %id, "switching active basket");
        self.active = id;
        self.ensure_active();
    }

    fn identifier(&self) -> &BasketId {
        &self.active
    }
}
