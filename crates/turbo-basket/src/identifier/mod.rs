//! Basket identifier providers.
//!
//! A provider hands out the opaque id that scopes a visitor's basket in
//! storage, and remembers it between requests however it sees fit.

mod cookie;
mod runtime;

pub use cookie::CookieIdentifier;
pub use runtime::RuntimeIdentifier;

use crate::ids::BasketId;

/// Produces and persists the active basket id.
pub trait IdentifierProvider {
    /// The active id, generating one if there is none.
    fn get(&mut self) -> BasketId;

    /// Generate a new id, persist it and make it the active one.
    fn regenerate(&mut self) -> BasketId;

    /// Drop the active id so the next [`get`](Self::get) generates a new one.
    fn forget(&mut self);
}
