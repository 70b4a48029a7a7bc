//! Storage backends.
//!
//! A [`Storage`] owns every basket's items, keyed by basket id, and
//! answers for one active basket at a time. The [`Basket`](crate::Basket)
//! routes all reads and writes through it.

mod runtime;
mod session;

pub use runtime::{BasketState, RuntimeStorage};
pub use session::SessionStorage;

use crate::error::BasketError;
use crate::ids::{BasketId, ItemKey, ProductId};
use crate::item::Item;
use serde_json::{Map, Value};

/// The capability a basket needs from its persistence layer.
///
/// Every operation is scoped to the active basket id. Lookups that find
/// nothing return `None`/`false`.
pub trait Storage {
    /// Insert the item, or overwrite the stored item with the same key in place.
    fn insert_update(&mut self, item: Item);

    /// Live, mutable view of the active basket's items in insertion order.
    ///
    /// Changes made through this view are the stored data.
    fn data(&mut self) -> &mut Vec<Item>;

    /// Read-only view of the active basket's items in insertion order.
    fn contents(&self) -> &[Item];

    /// The active basket's items flattened to plain field maps.
    fn data_as_maps(&self) -> Vec<Map<String, Value>> {
        self.contents().iter().map(Item::to_map).collect()
    }

    fn has(&self, key: &ItemKey) -> bool {
        self.item(key).is_some()
    }

    fn item(&self, key: &ItemKey) -> Option<&Item> {
        self.contents()
            .iter()
            .find(|item| item.identifier() == Some(key))
    }

    fn item_mut(&mut self, key: &ItemKey) -> Option<&mut Item> {
        self.data()
            .iter_mut()
            .find(|item| item.identifier() == Some(key))
    }

    /// First item, in insertion order, with the given catalog id.
    fn find(&self, id: &ProductId) -> Option<&Item> {
        self.contents().iter().find(|item| item.id() == id)
    }

    /// Remove the item with the given key. Returns whether one was removed.
    fn remove(&mut self, key: &ItemKey) -> bool {
        let items = self.data();
        let before = items.len();
        items.retain(|item| item.identifier() != Some(key));
        items.len() < before
    }

    /// Remove every item of the active basket.
    fn destroy(&mut self) {
        self.data().clear();
    }

    /// Switch the active basket, creating it empty if it was never seen.
    fn set_identifier(&mut self, id: BasketId);

    /// The active basket id.
    fn identifier(&self) -> &BasketId;

    /// Reload every basket from the backing medium.
    fn restore(&mut self) -> Result<(), BasketError> {
        Ok(())
    }

    /// Write every basket to the backing medium.
    fn save(&mut self) -> Result<(), BasketError> {
        Ok(())
    }
}
