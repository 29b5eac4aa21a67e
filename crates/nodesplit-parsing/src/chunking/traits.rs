//! Trait definitions for token counting

use crate::SegmentationResult;
use std::ops::Range;
use std::sync::Arc;

/// Byte range of one token within the text it was produced from
pub type TokenSpan = Range<usize>;

/// Trait for counting tokens in text
///
/// Implementations provide model-specific token counting without coupling
/// to embedding providers. Counting is pure: the same text always yields the
/// same result for a given counter.
pub trait TokenCounter: Send + Sync {
    /// Get the name/identifier of this counter
    fn name(&self) -> &str;

    /// Maximum number of tokens this model can handle
    fn max_tokens(&self) -> usize;

    /// Byte spans of every token in `text`, in order
    ///
    /// The spans are contiguous and cover the whole text: the first starts at
    /// 0, each starts where the previous ended, the last ends at `text.len()`,
    /// and every boundary is a char boundary. A span may be empty when a
    /// single character is encoded as several tokens.
    ///
    /// # Errors
    /// Returns `SegmentationError::Tokenization` if the text cannot be encoded
    fn token_spans(&self, text: &str) -> SegmentationResult<Vec<TokenSpan>>;

    /// Count tokens in the given text
    ///
    /// # Errors
    /// Returns `SegmentationError::Tokenization` if the text cannot be encoded
    fn count(&self, text: &str) -> SegmentationResult<usize> {
        Ok(self.token_spans(text)?.len())
    }

    /// Count tokens for multiple texts
    ///
    /// # Errors
    /// Returns the first tokenization error encountered
    fn count_batch(&self, texts: &[&str]) -> SegmentationResult<Vec<usize>> {
        texts.iter().map(|text| self.count(text)).collect()
    }
}

/// Type alias for shared token counter
pub type TokenCounterRef = Arc<dyn TokenCounter>;
