use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::app::error::{Result, TributaryError};
use crate::config::Config;
use crate::dedup::DeduplicationStrategy;
use crate::fetcher::{ContentFetcher, ContentLoader, HttpContentLoader};

/// Wires the loader and the deduplication strategy shared by all
/// composition sessions of a process.
pub struct AppContext {
    pub config: Config,
    pub loader: Arc<dyn ContentLoader>,
    pub deduplication: Box<dyn DeduplicationStrategy>,
}

impl AppContext {
    /// Build a context from the config file at `config_path`, or from the
    /// default config location.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
        .map_err(|e| TributaryError::Config(e.to_string()))?;

        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let loader: Arc<dyn ContentLoader> = Arc::new(HttpContentLoader::with_config(&config.loader)?);
        let deduplication = config.composition.deduplication.strategy();

        Ok(Self {
            config,
            loader,
            deduplication,
        })
    }

    /// Start a composition session seeded with `meta`.
    pub fn session(&self, meta: HashMap<String, Value>) -> ContentFetcher {
        ContentFetcher::with_loader(meta, self.loader.clone())
    }
}
