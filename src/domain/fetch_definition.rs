use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use sha2::{Digest, Sha256};

use crate::app::Result;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hook run on a response before its status is checked.
///
/// An error returned here is recorded as the fetch error and the
/// response is not parsed.
pub trait ResponseProcessor: Send + Sync {
    fn process(&self, response: &mut Response, url: &str) -> Result<()>;
}

/// Descriptor for fetching content from an endpoint.
#[derive(Clone)]
pub struct FetchDefinition {
    pub url: String,
    pub name: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
    /// Carried for the page assembly; the scheduler never acts on it.
    pub required: bool,
    pub response_processor: Option<Arc<dyn ResponseProcessor>>,
}

impl FetchDefinition {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: String::new(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            required: true,
            response_processor: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_response_processor(mut self, processor: Arc<dyn ResponseProcessor>) -> Self {
        self.response_processor = Some(processor);
        self
    }

    /// Deterministic identity of the fetched resource.
    ///
    /// Two definitions with the same hash refer to the same resource and
    /// can replace each other, e.g. as a cache key. Only the URL and the
    /// request headers contribute: method and body are ignored, so a POST
    /// and a GET to the same URL collapse into one fetch.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());

        let mut headers: Vec<(&str, &[u8])> = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_bytes()))
            .collect();
        // stable: values of one header keep their order
        headers.sort_by(|a, b| a.0.cmp(b.0));

        for (name, value) in headers {
            hasher.update(name.as_bytes());
            hasher.update(b": ");
            hasher.update(value);
            hasher.update(b"\r\n");
        }

        hex::encode(hasher.finalize())
    }

    /// Whether the definition refers to a fetchable resource or is a local
    /// name only.
    pub fn is_fetchable(&self) -> bool {
        !self.url.is_empty()
    }
}

impl fmt::Debug for FetchDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchDefinition")
            .field("url", &self.url)
            .field("name", &self.name)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("timeout", &self.timeout)
            .field("required", &self.required)
            .field("response_processor", &self.response_processor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &'static str) -> HeaderValue {
        HeaderValue::from_static(value)
    }

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(
            FetchDefinition::new("/foo").hash(),
            FetchDefinition::new("/foo").hash()
        );
    }

    #[test]
    fn test_hash_differs_by_url() {
        assert_ne!(
            FetchDefinition::new("/foo").hash(),
            FetchDefinition::new("/bar").hash()
        );
    }

    #[test]
    fn test_hash_ignores_timeout_required_method_body_and_name() {
        let a = FetchDefinition::new("/foo")
            .with_header(HeaderName::from_static("some"), header("header"))
            .with_timeout(Duration::from_secs(1))
            .with_required(false);
        let b = FetchDefinition::new("/foo")
            .with_header(HeaderName::from_static("some"), header("header"))
            .with_timeout(Duration::from_secs(42))
            .with_required(true)
            .with_method(Method::POST)
            .with_body("payload")
            .with_name("content");

        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_hash_differs_by_header_value() {
        let a = FetchDefinition::new("/foo")
            .with_header(HeaderName::from_static("some"), header("header"));
        let b = FetchDefinition::new("/foo")
            .with_header(HeaderName::from_static("some"), header("other header"));

        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_hash_independent_of_header_insertion_order() {
        let a = FetchDefinition::new("/foo")
            .with_header(HeaderName::from_static("a-first"), header("1"))
            .with_header(HeaderName::from_static("z-last"), header("2"));
        let b = FetchDefinition::new("/foo")
            .with_header(HeaderName::from_static("z-last"), header("2"))
            .with_header(HeaderName::from_static("a-first"), header("1"));

        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_hash_keeps_multi_value_order() {
        let a = FetchDefinition::new("/foo")
            .with_header(HeaderName::from_static("accept"), header("text/html"))
            .with_header(HeaderName::from_static("accept"), header("text/plain"));
        let b = FetchDefinition::new("/foo")
            .with_header(HeaderName::from_static("accept"), header("text/plain"))
            .with_header(HeaderName::from_static("accept"), header("text/html"));

        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = FetchDefinition::new("http://example.com/layout.html").hash();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_is_fetchable() {
        assert!(FetchDefinition::new("/foo").is_fetchable());
        assert!(!FetchDefinition::new("").with_name("local").is_fetchable());
    }

    #[test]
    fn test_defaults() {
        let fd = FetchDefinition::new("/foo");
        assert_eq!(fd.method, Method::GET);
        assert_eq!(fd.timeout, DEFAULT_TIMEOUT);
        assert!(fd.required);
        assert!(fd.headers.is_empty());
        assert!(fd.body.is_none());
    }
}
