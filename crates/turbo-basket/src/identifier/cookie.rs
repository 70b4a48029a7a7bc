//! Cookie-backed identifier.

use super::IdentifierProvider;
use crate::config::CookieConfig;
use crate::error::BasketError;
use crate::ids::BasketId;
use http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use tracing::debug;

/// Keeps the basket id in a client cookie.
///
/// The id is read from the request's `Cookie` header. Changes are queued
/// as `Set-Cookie` values and written out with
/// [`write_response_headers`](Self::write_response_headers).
///
/// ```
/// use http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
/// use turbo_basket::{CookieIdentifier, IdentifierProvider};
///
/// let mut request = HeaderMap::new();
/// request.insert(COOKIE, HeaderValue::from_static("theme=dark; cart_identifier=abc123"));
///
/// let mut ids = CookieIdentifier::new().with_request_headers(&request);
/// assert_eq!(ids.get().as_str(), "abc123");
///
/// ids.forget();
/// let mut response = HeaderMap::new();
/// ids.write_response_headers(&mut response).unwrap();
/// assert!(response[SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));
/// ```
#[derive(Debug, Clone)]
pub struct CookieIdentifier {
    config: CookieConfig,
    current: Option<BasketId>,
    pending: Vec<String>,
}

impl CookieIdentifier {
    /// Provider using the default cookie name and path.
    pub fn new() -> Self {
        Self::with_config(CookieConfig::default())
    }

    /// Provider using a configured cookie name and path.
    pub fn with_config(config: CookieConfig) -> Self {
        Self {
            config,
            current: None,
            pending: Vec::new(),
        }
    }

    /// Pick up the id from a request's `Cookie` headers.
    pub fn with_request_headers(mut self, headers: &HeaderMap) -> Self {
        self.current = read_cookie(headers, &self.config.name).map(BasketId::new);
        self
    }

    /// Cookie name in use.
    pub fn cookie_name(&self) -> &str {
        &self.config.name
    }

    /// `Set-Cookie` values queued since the last write.
    pub fn pending_cookies(&self) -> &[String] {
        &self.pending
    }

    /// Append the queued `Set-Cookie` values to a response and clear the queue.
    pub fn write_response_headers(&mut self, headers: &mut HeaderMap) -> Result<(), BasketError> {
        for cookie in self.pending.drain(..) {
            headers.append(SET_COOKIE, HeaderValue::from_str(&cookie)?);
        }
        Ok(())
    }

    fn session_cookie(&self, id: &BasketId) -> String {
        format!("{}={}; Path={}", self.config.name, id, self.config.path)
    }

    fn expired_cookie(&self) -> String {
        format!(
            "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.config.name, self.config.path
        )
    }
}

impl Default for CookieIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierProvider for CookieIdentifier {
    fn get(&mut self) -> BasketId {
        match &self.current {
            Some(id) => id.clone(),
            None => self.regenerate(),
        }
    }

    fn regenerate(&mut self) -> BasketId {
        let id = BasketId::generate();
        debug!(cookie = %self.config.name, basket = %id, "issuing basket cookie");
        self.pending.push(self.session_cookie(&id));
        self.current = Some(id.clone());
        id
    }

    fn forget(&mut self) {
        debug!(cookie = %self.config.name, "expiring basket cookie");
        self.current = None;
        self.pending.push(self.expired_cookie());
    }
}

/// Find a cookie's value across every `Cookie` header. Empty values count
/// as absent.
fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(cookie: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(cookie));
        headers
    }

    #[test]
    fn test_reads_existing_cookie() {
        let mut ids = CookieIdentifier::new().with_request_headers(&request("cart_identifier=abc"));
        assert_eq!(ids.get().as_str(), "abc");
        assert!(ids.pending_cookies().is_empty());
    }

    #[test]
    fn test_missing_cookie_issues_session_cookie() {
        let mut ids = CookieIdentifier::new().with_request_headers(&request("theme=dark"));
        let id = ids.get();

        assert_eq!(ids.get(), id);
        assert_eq!(
            ids.pending_cookies(),
            &[format!("cart_identifier={}; Path=/", id)]
        );
    }

    #[test]
    fn test_empty_cookie_value_is_absent() {
        let mut ids = CookieIdentifier::new().with_request_headers(&request("cart_identifier="));
        assert_eq!(ids.get().as_str().len(), 32);
    }

    #[test]
    fn test_forget_expires_cookie() {
        let mut ids = CookieIdentifier::new().with_request_headers(&request("cart_identifier=abc"));
        ids.forget();

        let mut response = HeaderMap::new();
        ids.write_response_headers(&mut response).unwrap();
        let cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("cart_identifier=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(ids.pending_cookies().is_empty());

        assert_ne!(ids.get().as_str(), "abc");
    }

    #[test]
    fn test_configured_name_and_path() {
        let config = CookieConfig {
            name: "basket".into(),
            path: "/shop".into(),
        };
        let mut ids = CookieIdentifier::with_config(config)
            .with_request_headers(&request("cart_identifier=abc; basket=xyz"));
        assert_eq!(ids.get().as_str(), "xyz");

        let id = ids.regenerate();
        assert_eq!(ids.pending_cookies(), &[format!("basket={}; Path=/shop", id)]);
    }

    #[test]
    fn test_cookie_headers_are_all_scanned() {
        let mut headers = request("a=1");
        headers.append(COOKIE, HeaderValue::from_static("cart_identifier=second"));
        let mut ids = CookieIdentifier::new().with_request_headers(&headers);
        assert_eq!(ids.get().as_str(), "second");
    }

    #[test]
    fn test_invalid_header_value_is_an_error() {
        let config = CookieConfig {
            name: "bad\nname".into(),
            path: "/".into(),
        };
        let mut ids = CookieIdentifier::with_config(config);
        ids.regenerate();

        let mut response = HeaderMap::new();
        let err = ids.write_response_headers(&mut response).unwrap_err();
        assert!(matches!(err, BasketError::InvalidHeader(_)));
    }
}
