pub mod content;
pub mod fetch_definition;
pub mod fetch_result;

pub use content::{attr_value, Attribute, Attributes, Content, MemoryContent};
pub use fetch_definition::{FetchDefinition, ResponseProcessor, DEFAULT_TIMEOUT};
pub use fetch_result::{FetchResult, FetchState};
