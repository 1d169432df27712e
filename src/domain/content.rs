use std::collections::HashMap;
use std::fmt;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::FetchDefinition;

/// One attribute of an HTML declaration such as `<link rel="stylesheet">`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub val: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            val: val.into(),
        }
    }
}

/// Attribute set of a single stylesheet or script declaration.
pub type Attributes = Vec<Attribute>;

/// Look up an attribute value by key.
pub fn attr_value<'a>(attrs: &'a [Attribute], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.key == key)
        .map(|a| a.val.as_str())
}

/// A loaded, and possibly parsed, fragment.
pub trait Content: fmt::Debug + Send + Sync {
    fn url(&self) -> &str;
    fn status_code(&self) -> StatusCode;
    fn headers(&self) -> &HeaderMap;
    fn meta(&self) -> &HashMap<String, Value>;
    /// Further fetches this fragment declared; empty for unparsed content.
    fn required_content(&self) -> &[FetchDefinition];
    fn head(&self) -> Option<&str>;
    /// Named body fragments; the unnamed default fragment has key `""`.
    fn body(&self) -> &HashMap<String, String>;
    fn tail(&self) -> Option<&str>;
    fn stylesheets(&self) -> &[Attributes];
    fn scripts(&self) -> &[Attributes];
    /// Response body of content that was not parsed.
    fn raw(&self) -> Option<&[u8]>;
}

#[derive(Debug, Clone)]
pub struct MemoryContent {
    pub url: String,
    pub status_code: StatusCode,
    pub headers: HeaderMap,
    pub meta: HashMap<String, Value>,
    pub required_content: Vec<FetchDefinition>,
    pub head: Option<String>,
    pub body: HashMap<String, String>,
    pub tail: Option<String>,
    pub stylesheets: Vec<Attributes>,
    pub scripts: Vec<Attributes>,
    pub raw: Option<Vec<u8>>,
}

impl MemoryContent {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: StatusCode::BAD_GATEWAY,
            headers: HeaderMap::new(),
            meta: HashMap::new(),
            required_content: Vec::new(),
            head: None,
            body: HashMap::new(),
            tail: None,
            stylesheets: Vec::new(),
            scripts: Vec::new(),
            raw: None,
        }
    }
}

impl Content for MemoryContent {
    fn url(&self) -> &str {
        &self.url
    }

    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn meta(&self) -> &HashMap<String, Value> {
        &self.meta
    }

    fn required_content(&self) -> &[FetchDefinition] {
        &self.required_content
    }

    fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    fn body(&self) -> &HashMap<String, String> {
        &self.body
    }

    fn tail(&self) -> Option<&str> {
        self.tail.as_deref()
    }

    fn stylesheets(&self) -> &[Attributes] {
        &self.stylesheets
    }

    fn scripts(&self) -> &[Attributes] {
        &self.scripts
    }

    fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_content_defaults_to_bad_gateway() {
        let content = MemoryContent::new("http://example.com/");
        assert_eq!(content.status_code(), StatusCode::BAD_GATEWAY);
        assert!(content.required_content().is_empty());
        assert!(content.raw().is_none());
    }

    #[test]
    fn test_attr_value() {
        let attrs = vec![
            Attribute::new("rel", "stylesheet"),
            Attribute::new("href", "/a.css"),
        ];
        assert_eq!(attr_value(&attrs, "href"), Some("/a.css"));
        assert_eq!(attr_value(&attrs, "media"), None);
    }
}
