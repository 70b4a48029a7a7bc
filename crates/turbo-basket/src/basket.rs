//! The basket façade.

use crate::error::BasketError;
use crate::identifier::{IdentifierProvider, RuntimeIdentifier};
use crate::ids::{BasketId, ItemKey, ProductId};
use crate::item::{Item, ItemPatch, NewItem};
use crate::storage::{RuntimeStorage, Storage};
use crate::summary::BasketSummary;
use serde_json::{Map, Value};
use tracing::debug;

/// A shopping basket.
///
/// The basket holds no items itself. It validates input, derives item
/// keys, merges repeat inserts and folds totals; the storage backend
/// owns the items and the identifier provider decides which basket is
/// active.
///
/// Not synchronized: hosts sharing one basket across threads must put it
/// behind their own lock.
///
/// ```
/// use turbo_basket::{Basket, NewItem, RuntimeIdentifier, RuntimeStorage};
///
/// let mut basket = Basket::new(RuntimeStorage::new(), RuntimeIdentifier::new()).unwrap();
/// let key = basket
///     .insert(NewItem::new().id("mug").name("Mug").price(100.0).quantity(1).weight(350.0).tax(20.0))
///     .unwrap();
///
/// assert!(basket.has(&key));
/// assert!((basket.total(true) - 120.0).abs() < 1e-9);
/// assert!((basket.total(false) - 100.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct Basket<S = RuntimeStorage, I = RuntimeIdentifier> {
    storage: S,
    identifier: I,
}

impl<S: Storage, I: IdentifierProvider> Basket<S, I> {
    /// Resolve the basket id, restore saved state and activate the basket.
    pub fn new(mut storage: S, mut identifier: I) -> Result<Self, BasketError> {
        let id = identifier.get();
        storage.restore()?;
        storage.set_identifier(id);
        Ok(Self {
            storage,
            identifier,
        })
    }

    /// The active basket id.
    pub fn identifier(&self) -> &BasketId {
        self.storage.identifier()
    }

    /// Switch to another basket, e.g. one saved under a known id.
    pub fn set_identifier(&mut self, id: impl Into<BasketId>) {
        let id = id.into();
        debug!(basket = %id, "switching basket");
        self.storage.set_identifier(id);
    }

    /// Forget the current id and start a fresh, empty basket under a new one.
    ///
    /// Items of the old basket stay in storage under the old id.
    pub fn forget_identifier(&mut self) -> BasketId {
        self.identifier.forget();
        let id = self.identifier.get();
        self.storage.set_identifier(id.clone());
        id
    }

    /// Items in insertion order.
    pub fn contents(&self) -> &[Item] {
        self.storage.contents()
    }

    /// Live, mutable view of the items. Changes are stored directly.
    pub fn contents_mut(&mut self) -> &mut Vec<Item> {
        self.storage.data()
    }

    /// Items flattened to plain field maps.
    pub fn contents_as_maps(&self) -> Vec<Map<String, Value>> {
        self.storage.data_as_maps()
    }

    /// Insert an item and return its key.
    ///
    /// Fails if `id`, `name`, `quantity`, `price` or `weight` is missing.
    /// Inserting an item whose key is already present adds the quantities
    /// and applies the new record's other fields to the stored item.
    pub fn insert(&mut self, item: NewItem) -> Result<ItemKey, BasketError> {
        item.check_required()?;
        let key = item
            .item_key()
            .ok_or(BasketError::MissingField("id"))?;

        if let Some(existing) = self.storage.item_mut(&key) {
            let quantity = existing
                .quantity()
                .saturating_add(item.quantity.unwrap_or_default());
            let mut patch = ItemPatch::from(item);
            patch.quantity = Some(quantity);
            existing.merge(patch);
            debug!(basket = %self.storage.identifier(), item = %key, quantity, "merged into existing item");
            return Ok(key);
        }

        let mut fresh = Item::new(item)?;
        fresh.set_identifier(key.clone());
        debug!(
            basket = %self.storage.identifier(),
            item = %key,
            quantity = fresh.quantity(),
            "inserted item"
        );
        self.storage.insert_update(fresh);
        Ok(key)
    }

    /// Update one field of the item with the given key.
    ///
    /// Returns `false` if there is no such item or the value didn't fit the field.
    pub fn update(&mut self, key: &ItemKey, field: &str, value: impl Into<Value>) -> bool {
        match self.storage.item_mut(key) {
            Some(item) => item.update(field, value.into()),
            None => false,
        }
    }

    /// Apply a partial update to the item with the given key.
    ///
    /// Returns `false` if there is no such item.
    pub fn merge(&mut self, key: &ItemKey, patch: ItemPatch) -> bool {
        match self.storage.item_mut(key) {
            Some(item) => {
                item.merge(patch);
                true
            }
            None => false,
        }
    }

    /// Remove the item with the given key.
    pub fn remove(&mut self, key: &ItemKey) -> bool {
        let removed = self.storage.remove(key);
        debug!(basket = %self.storage.identifier(), item = %key, removed, "remove item");
        removed
    }

    /// Empty the active basket.
    pub fn destroy(&mut self) {
        debug!(basket = %self.storage.identifier(), "destroying basket");
        self.storage.destroy();
    }

    pub fn has(&self, key: &ItemKey) -> bool {
        self.storage.has(key)
    }

    pub fn item(&self, key: &ItemKey) -> Option<&Item> {
        self.storage.item(key)
    }

    pub fn item_mut(&mut self, key: &ItemKey) -> Option<&mut Item> {
        self.storage.item_mut(key)
    }

    /// First item with the given catalog id.
    pub fn find(&self, id: &ProductId) -> Option<&Item> {
        self.storage.find(id)
    }

    /// Total tax of all items.
    pub fn tax(&self) -> f64 {
        self.contents().iter().map(Item::tax).sum()
    }

    /// Total weight of all items.
    pub fn weight(&self) -> f64 {
        self.contents().iter().map(Item::weight).sum()
    }

    /// Total value of all items, with or without tax.
    pub fn total(&self, include_tax: bool) -> f64 {
        self.contents().iter().map(|i| i.total(include_tax)).sum()
    }

    /// Sum of quantities, or the number of distinct lines when `unique`.
    pub fn total_items(&self, unique: bool) -> i64 {
        if unique {
            self.contents().len() as i64
        } else {
            self.contents()
                .iter()
                .fold(0i64, |acc, item| acc.saturating_add(item.quantity()))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents().is_empty()
    }

    /// Snapshot of every line and the basket totals.
    pub fn summary(&self) -> BasketSummary {
        BasketSummary::from_items(self.identifier(), self.contents())
    }

    /// Persist through the storage backend.
    pub fn save(&mut self) -> Result<(), BasketError> {
        self.storage.save()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn identifier_provider(&self) -> &I {
        &self.identifier
    }

    pub fn identifier_provider_mut(&mut self) -> &mut I {
        &mut self.identifier
    }

    /// Take the storage and identifier provider back.
    pub fn into_parts(self) -> (S, I) {
        (self.storage, self.identifier)
    }
}
