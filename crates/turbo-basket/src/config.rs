//! Basket configuration.

use crate::error::BasketError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Basket id active before an identifier is set.
pub const DEFAULT_BASKET: &str = "basket";

/// Cookie that carries the basket id.
pub const DEFAULT_COOKIE_NAME: &str = "cart_identifier";

/// Basket configuration file.
///
/// ```toml
/// default_basket = "basket"
///
/// [cookie]
/// name = "cart_identifier"
/// path = "/"
///
/// [session]
/// store = "default"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketConfig {
    /// Basket id a storage opened with this config starts on.
    ///
    /// Only seen when the storage is used on its own: `Basket::new`
    /// switches to the identifier provider's id straight away.
    #[serde(default = "default_basket")]
    pub default_basket: String,

    /// Identifier cookie settings.
    #[serde(default)]
    pub cookie: CookieConfig,

    /// Session storage settings.
    #[serde(default)]
    pub session: SessionStoreConfig,
}

impl BasketConfig {
    /// Load config from a file. `.json` files are parsed as JSON,
    /// anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BasketError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BasketError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(|e| {
                BasketError::Config(format!("failed to parse {}: {}", path.display(), e))
            })
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, BasketError> {
        Ok(toml::from_str(content)?)
    }
}

impl Default for BasketConfig {
    fn default() -> Self {
        Self {
            default_basket: default_basket(),
            cookie: CookieConfig::default(),
            session: SessionStoreConfig::default(),
        }
    }
}

fn default_basket() -> String {
    DEFAULT_BASKET.to_string()
}

/// Identifier cookie settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
        }
    }
}

/// Session storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStoreConfig {
    /// Key-value store name.
    #[serde(default = "default_store")]
    pub store: String,
}

fn default_store() -> String {
    "default".to_string()
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
        }
    }
}
