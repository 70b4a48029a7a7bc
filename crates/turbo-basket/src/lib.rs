//! Shopping basket for TurboCommerce.
//!
//! This crate keeps a visitor's basket of items and rolls up prices, tax
//! and weight:
//!
//! - **Items**: validated lines with per-item tax, options and free-form attributes
//! - **Storage**: in-process ([`RuntimeStorage`]) or session-backed ([`SessionStorage`])
//! - **Identifiers**: in-process ([`RuntimeIdentifier`]) or cookie-backed ([`CookieIdentifier`])
//! - **Totals**: tax, weight and totals with or without tax, plus a serializable summary
//!
//! # Example
//!
//! ```rust
//! use turbo_basket::prelude::*;
//!
//! let mut basket = Basket::new(RuntimeStorage::new(), RuntimeIdentifier::new()).unwrap();
//!
//! let tee = basket
//!     .insert(
//!         NewItem::new()
//!             .id("tee")
//!             .name("T-Shirt")
//!             .price(25.0)
//!             .quantity(2)
//!             .weight(180.0)
//!             .tax(20.0)
//!             .option(ItemOption::new().field("size", "L").price(5.0)),
//!     )
//!     .unwrap();
//!
//! basket.update(&tee, "quantity", 3);
//!
//! assert_eq!(basket.total_items(false), 3);
//! assert!((basket.total(false) - 90.0).abs() < 1e-9);
//! assert!((basket.tax() - 18.0).abs() < 1e-9);
//! ```

pub mod basket;
pub mod config;
pub mod error;
pub mod identifier;
pub mod ids;
pub mod item;
pub mod storage;
pub mod summary;
pub mod tax;

pub use basket::Basket;
pub use config::{BasketConfig, CookieConfig, SessionStoreConfig};
pub use error::BasketError;
pub use identifier::{CookieIdentifier, IdentifierProvider, RuntimeIdentifier};
pub use ids::*;
pub use item::{Item, ItemOption, ItemPatch, NewItem};
pub use storage::{BasketState, RuntimeStorage, SessionStorage, Storage};
pub use summary::{BasketSummary, LineSummary};
pub use tax::Tax;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::basket::Basket;
    pub use crate::error::BasketError;
    pub use crate::identifier::{CookieIdentifier, IdentifierProvider, RuntimeIdentifier};
    pub use crate::ids::*;
    pub use crate::item::{Item, ItemOption, ItemPatch, NewItem};
    pub use crate::storage::{RuntimeStorage, SessionStorage, Storage};
    pub use crate::summary::{BasketSummary, LineSummary};
    pub use crate::tax::Tax;
}
