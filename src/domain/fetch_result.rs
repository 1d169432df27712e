use std::sync::Arc;

use crate::app::TributaryError;
use crate::domain::{Content, FetchDefinition};

static NOT_FETCHED: TributaryError = TributaryError::NotFetched;

/// Progress of a single fetch job.
///
/// Every job starts as `NotFetched` and moves at most once to `Failed` or
/// `Loaded`. A job whose URL template could not be expanded stays
/// `NotFetched`.
#[derive(Debug, Clone)]
pub enum FetchState {
    NotFetched,
    Failed(Arc<TributaryError>),
    Loaded(Arc<dyn Content>),
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub def: FetchDefinition,
    /// Hash of `def`
    pub hash: String,
    pub state: FetchState,
}

impl FetchResult {
    pub fn new(def: FetchDefinition, hash: String) -> Self {
        Self {
            def,
            hash,
            state: FetchState::NotFetched,
        }
    }

    pub fn content(&self) -> Option<&Arc<dyn Content>> {
        match &self.state {
            FetchState::Loaded(content) => Some(content),
            _ => None,
        }
    }

    /// The failure of this job, or [`TributaryError::NotFetched`] if it
    /// never produced content. `None` once content is loaded.
    pub fn error(&self) -> Option<&TributaryError> {
        match &self.state {
            FetchState::NotFetched => Some(&NOT_FETCHED),
            FetchState::Failed(err) => Some(err.as_ref()),
            FetchState::Loaded(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, FetchState::Loaded(_))
    }

    pub fn is_not_fetched(&self) -> bool {
        matches!(self.state, FetchState::NotFetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MemoryContent;

    #[test]
    fn test_new_result_is_not_fetched() {
        let def = FetchDefinition::new("/foo");
        let hash = def.hash();
        let result = FetchResult::new(def, hash);

        assert!(result.is_not_fetched());
        assert!(result.content().is_none());
        assert!(matches!(result.error(), Some(TributaryError::NotFetched)));
    }

    #[test]
    fn test_loaded_result_has_no_error() {
        let def = FetchDefinition::new("/foo");
        let hash = def.hash();
        let mut result = FetchResult::new(def, hash);
        result.state = FetchState::Loaded(Arc::new(MemoryContent::new("/foo")));

        assert!(result.is_loaded());
        assert!(result.error().is_none());
        assert_eq!(result.content().map(|c| c.url()), Some("/foo"));
    }

    #[test]
    fn test_failed_result_has_no_content() {
        let def = FetchDefinition::new("/foo");
        let hash = def.hash();
        let mut result = FetchResult::new(def, hash);
        result.state = FetchState::Failed(Arc::new(TributaryError::Parse("bad".into())));

        assert!(result.content().is_none());
        assert!(matches!(result.error(), Some(TributaryError::Parse(_))));
    }
}
