use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::watch;

use crate::app::Result;
use crate::domain::{FetchDefinition, FetchResult, FetchState};
use crate::fetcher::template::expand_template_vars;
use crate::fetcher::{ContentLoader, HttpContentLoader};

/// Fetches a tree of fragments concurrently.
///
/// Every fragment added with [`add_fetch_job`](Self::add_fetch_job) is
/// loaded in its own task; once loaded, its metadata is merged into the
/// shared metadata and the fragments it requires are added in turn.
/// Fragments are identified by [`FetchDefinition::hash`], each one is
/// fetched at most once per fetcher.
///
/// A fetcher lives for one composition request. Cloning it yields another
/// handle to the same session.
#[derive(Clone)]
pub struct ContentFetcher {
    inner: Arc<Inner>,
}

struct Inner {
    /// Keyed by hash, in order of first submission. Also the dedup gate.
    results: Mutex<IndexMap<String, FetchResult>>,
    meta: Mutex<HashMap<String, Value>>,
    active_jobs: watch::Sender<usize>,
    loader: Arc<dyn ContentLoader>,
}

/// Counts one running job; released when the job's task ends, however
/// it ends.
struct ActiveJob(Arc<Inner>);

impl Drop for ActiveJob {
    fn drop(&mut self) {
        self.0.active_jobs.send_modify(|jobs| *jobs -= 1);
    }
}

impl ContentFetcher {
    /// Create a fetcher loading over HTTP.
    pub fn new(meta: HashMap<String, Value>) -> Result<Self> {
        Ok(Self::with_loader(meta, Arc::new(HttpContentLoader::new()?)))
    }

    pub fn with_loader(meta: HashMap<String, Value>, loader: Arc<dyn ContentLoader>) -> Self {
        let (active_jobs, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                results: Mutex::new(IndexMap::new()),
                meta: Mutex::new(meta),
                active_jobs,
                loader,
            }),
        }
    }

    /// Add a fetch job, unless one with the same hash was added before.
    ///
    /// Must be called within a tokio runtime.
    pub fn add_fetch_job(&self, def: FetchDefinition) {
        let hash = def.hash();

        let job = {
            let mut results = lock(&self.inner.results);
            if results.contains_key(&hash) {
                return;
            }
            results.insert(hash.clone(), FetchResult::new(def.clone(), hash.clone()));

            // counted before the lock is released, so a waiter never sees
            // zero while this job is pending
            self.inner.active_jobs.send_modify(|jobs| *jobs += 1);
            ActiveJob(self.inner.clone())
        };

        let fetcher = self.clone();
        tokio::spawn(async move {
            let _job = job;
            fetcher.run(def, hash).await;
        });
    }

    async fn run(&self, def: FetchDefinition, hash: String) {
        let start = Instant::now();

        let url = match self.expand_template_vars(&def.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    definition = ?def,
                    "error expanding url template {}",
                    def.url
                );
                return;
            }
        };

        let mut resolved = def.clone();
        resolved.url = url.clone();

        match self.inner.loader.load(&resolved).await {
            Ok(content) => {
                tracing::info!(
                    duration = ?start.elapsed(),
                    definition = ?def,
                    "fetched {}",
                    url
                );

                self.add_meta(content.meta());
                self.set_state(&hash, FetchState::Loaded(content.clone()));

                for dependency in content.required_content() {
                    if dependency.is_fetchable() {
                        self.add_fetch_job(dependency.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    duration = ?start.elapsed(),
                    error = %e,
                    definition = ?def,
                    "failed fetching {}",
                    url
                );
                self.set_state(&hash, FetchState::Failed(Arc::new(e)));
            }
        }
    }

    /// Wait until every job is done, including jobs added while waiting,
    /// and return the results in the order they were first added.
    pub async fn wait_for_results(&self) -> Vec<FetchResult> {
        let mut active_jobs = self.inner.active_jobs.subscribe();
        // the sender lives in `inner`, the channel cannot close here
        let _ = active_jobs.wait_for(|jobs| *jobs == 0).await;

        lock(&self.inner.results).values().cloned().collect()
    }

    /// Snapshot of the metadata, including everything merged from loaded
    /// fragments so far.
    pub fn meta(&self) -> HashMap<String, Value> {
        lock(&self.inner.meta).clone()
    }

    fn expand_template_vars(&self, template: &str) -> Result<String> {
        let meta = lock(&self.inner.meta);
        expand_template_vars(template, &meta)
    }

    // last write wins between fragments finishing at the same time
    fn add_meta(&self, data: &HashMap<String, Value>) {
        let mut meta = lock(&self.inner.meta);
        for (key, value) in data {
            meta.insert(key.clone(), value.clone());
        }
    }

    fn set_state(&self, hash: &str, state: FetchState) {
        if let Some(result) = lock(&self.inner.results).get_mut(hash) {
            result.state = state;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
