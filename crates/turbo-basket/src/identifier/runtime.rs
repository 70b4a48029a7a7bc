//! In-process identifier.

use super::IdentifierProvider;
use crate::ids::BasketId;
use tracing::debug;

/// Holds the basket id for as long as the value lives.
#[derive(Debug, Clone, Default)]
pub struct RuntimeIdentifier {
    current: Option<BasketId>,
}

impl RuntimeIdentifier {
    /// A provider with no id yet; the first `get` generates one.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that already holds `id`.
    pub fn with_id(id: impl Into<BasketId>) -> Self {
        Self {
            current: Some(id.into()),
        }
    }

    /// The held id, without generating one.
    pub fn current(&self) -> Option<&BasketId> {
        self.current.as_ref()
    }
}

impl IdentifierProvider for RuntimeIdentifier {
    fn get(&mut self) -> BasketId {
        match &self.current {
            Some(id) => id.clone(),
            None => self.regenerate(),
        }
    }

    fn regenerate(&mut self) -> BasketId {
        let id = BasketId::generate();
        debug!(basket = %id, "generated basket identifier");
        self.current = Some(id.clone());
        id
    }

    fn forget(&mut self) {
        self.current = None;
    }
}
