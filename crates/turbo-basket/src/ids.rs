//! Newtype IDs for type-safe identifiers.
//!
//! A basket deals with three different strings: the catalog id a caller
//! hands in, the derived key that addresses a line in storage, and the
//! basket id that scopes storage. Newtypes keep them from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Caller-supplied catalog id. Not unique within a basket.
    ProductId
);
define_id!(
    /// Derived key of a basket line, unique within a basket.
    ItemKey
);
define_id!(
    /// Opaque id scoping a basket in storage.
    BasketId
);

impl BasketId {
    /// Generate a new random basket id: 32 lowercase hex characters.
    pub fn generate() -> Self {
        use rand::Rng;

        let seed: [u8; 16] = rand::thread_rng().gen();
        Self(format!("{:x}", md5::compute(seed)))
    }
}

impl Default for BasketId {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BASKET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
        assert_eq!(format!("{}", id), "prod-123");
    }

    #[test]
    fn test_basket_id_generation() {
        let a = BasketId::generate();
        let b = BasketId::generate();

        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_default_basket_id() {
        assert_eq!(BasketId::default().as_str(), "basket");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let key = ItemKey::new("abc");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""abc""#);
    }
}
