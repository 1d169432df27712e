pub mod content_fetcher;
pub mod http_loader;
pub mod template;

pub use content_fetcher::ContentFetcher;
pub use http_loader::HttpContentLoader;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::{json, Map, Value};
use url::Url;

use crate::app::Result;
use crate::domain::{Content, FetchDefinition};

/// Loads and parses the resource a [`FetchDefinition`] points to.
///
/// A failed load, including a response with a status outside `200..=399`,
/// yields only the error and no partial content. The status a page should
/// report for it comes from [`TributaryError::status_code`].
///
/// [`TributaryError::status_code`]: crate::app::TributaryError::status_code
#[async_trait]
pub trait ContentLoader: Send + Sync {
    async fn load(&self, def: &FetchDefinition) -> Result<Arc<dyn Content>>;
}

/// Metadata describing an incoming page request, meant to seed the
/// metadata context of a session under the `request` key.
pub fn metadata_for_request(url: &Url, headers: &HeaderMap) -> Value {
    let mut base_url = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        base_url.push_str(&format!(":{port}"));
    }

    let mut header_values = Map::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            header_values
                .entry(name.as_str())
                .or_insert_with(|| Value::String(value.to_string()));
        }
    }

    json!({
        "base_url": base_url,
        "host": url.host_str().unwrap_or_default(),
        "path": url.path(),
        "query": url.query().unwrap_or_default(),
        "headers": header_values,
    })
}
