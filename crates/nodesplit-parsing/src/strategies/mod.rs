//! Splitting strategies
//!
//! Every strategy turns a [`Document`] into ordered, non-empty [`Segment`]s
//! whose `raw_text` is a literal slice of the source. Strategies are chosen
//! by name through the [`StrategyRegistry`].

pub mod markdown;
pub mod registry;
pub mod sentence;
pub mod token;

pub use markdown::MarkdownSplitter;
pub use registry::{StrategyConstructor, StrategyRegistry};
pub use sentence::SentenceSplitter;
pub use token::TokenSplitter;

use crate::SegmentationResult;
use crate::document::{Document, Segment};
use nodesplit_config::SplitterConfig;

/// Trait for splitting a document into segments
///
/// Implementations are stateless apart from their token counter and render
/// options, so they can be shared across threads.
pub trait SplitStrategy: Send + Sync {
    /// Registered name of this strategy
    fn name(&self) -> &'static str;

    /// Parameters used when the caller leaves them unset
    fn default_config(&self) -> SplitterConfig;

    /// Check a (defaults-merged) configuration before any work is done
    ///
    /// # Errors
    /// Returns a configuration error if the parameters are unusable
    fn validate(&self, config: &SplitterConfig) -> SegmentationResult<()>;

    /// Split the document text into segments, in reading order
    ///
    /// # Errors
    /// Returns configuration errors for invalid parameters and tokenization
    /// errors from the token counter
    fn split(&self, document: &Document, config: &SplitterConfig)
    -> SegmentationResult<Vec<Segment>>;
}

/// Shrink `span` to exclude surrounding whitespace, `None` if nothing is left
pub(crate) fn trim_span(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = text.get(start..end)?;
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }

    let leading = slice.len().saturating_sub(slice.trim_start().len());
    let trimmed_start = start.saturating_add(leading);
    Some((trimmed_start, trimmed_start.saturating_add(trimmed.len())))
}
