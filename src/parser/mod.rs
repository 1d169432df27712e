mod html;

pub use html::HtmlContentParser;

use crate::app::Result;
use crate::domain::MemoryContent;

/// Turns a response body into content.
///
/// Parsers are registered on the loader per content-type prefix.
pub trait ContentParser: Send + Sync {
    fn parse(&self, content: &mut MemoryContent, body: &[u8]) -> Result<()>;
}
