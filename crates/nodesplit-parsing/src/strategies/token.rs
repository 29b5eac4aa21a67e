//! Fixed-size token windows with overlap

use super::SplitStrategy;
use crate::SegmentationResult;
use crate::chunking::{TokenCounterRef, TokenSpan};
use crate::document::{Document, RenderOptions, Segment};
use nodesplit_config::SplitterConfig;
use std::ops::Range;

/// Registered name of the token window strategy
pub const NAME: &str = "TokenTextSplitter";

const DEFAULT_CHUNK_SIZE: usize = 1024;
const DEFAULT_CHUNK_OVERLAP: usize = 20;

/// Token index windows over `total` tokens
///
/// Window `i` starts at `i * (size - overlap)`; the last window is clipped
/// and is the first one to reach `total`. Requires `overlap < size`.
pub fn token_windows(total: usize, size: usize, overlap: usize) -> Vec<Range<usize>> {
    let step = size.saturating_sub(overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0usize;

    while start < total {
        let end = start.saturating_add(size).min(total);
        windows.push(start..end);
        if end == total {
            break;
        }
        start = start.saturating_add(step);
    }

    windows
}

/// Byte range covered by a token window, `None` if it covers no bytes
///
/// Windows made only of the trailing tokens of a multi-token character
/// cover nothing; their bytes belong to the window holding the first token.
fn byte_range(spans: &[TokenSpan], window: &Range<usize>) -> Option<Range<usize>> {
    let first = spans.get(window.start)?;
    let last = spans.get(window.end.checked_sub(1)?)?;
    (first.start < last.end).then_some(first.start..last.end)
}

/// Splits text into windows of exactly `chunk_size` tokens (the last may be
/// shorter), consecutive windows sharing `chunk_overlap` tokens
pub struct TokenSplitter {
    counter: TokenCounterRef,
    render: RenderOptions,
}

impl TokenSplitter {
    pub const fn new(counter: TokenCounterRef, render: RenderOptions) -> Self {
        Self { counter, render }
    }
}

impl SplitStrategy for TokenSplitter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_config(&self) -> SplitterConfig {
        SplitterConfig::sized(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }

    fn validate(&self, config: &SplitterConfig) -> SegmentationResult<()> {
        config.window()?;
        Ok(())
    }

    fn split(
        &self,
        document: &Document,
        config: &SplitterConfig,
    ) -> SegmentationResult<Vec<Segment>> {
        let (size, overlap) = config.window()?;
        let text = document.text.as_str();
        let spans = self.counter.token_spans(text)?;

        if spans.is_empty() {
            // A counter may report no tokens for non-empty input
            return Ok(if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::new(document, 0..text.len(), Vec::new(), &self.render)]
            });
        }

        let windows = token_windows(spans.len(), size, overlap);
        let mut ranges: Vec<Range<usize>> = windows
            .iter()
            .filter_map(|window| byte_range(&spans, window))
            .collect();
        ranges.dedup();

        let segments: Vec<Segment> = ranges
            .into_iter()
            .map(|range| Segment::new(document, range, Vec::new(), &self.render))
            .collect();

        tracing::debug!(
            strategy = NAME,
            tokens = spans.len(),
            segments = segments.len(),
            chunk_size = size,
            chunk_overlap = overlap,
            "Split document into token windows"
        );
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{TokenCounter, WordTokenCounter};
    use std::sync::Arc;

    /// Encodes every non-ASCII character as two tokens, the second empty
    struct SplitCharCounter;

    impl TokenCounter for SplitCharCounter {
        fn name(&self) -> &str {
            "split-char"
        }

        fn max_tokens(&self) -> usize {
            usize::MAX
        }

        fn token_spans(&self, text: &str) -> SegmentationResult<Vec<TokenSpan>> {
            let mut spans = Vec::new();
            for (start, ch) in text.char_indices() {
                let end = start + ch.len_utf8();
                spans.push(start..end);
                if !ch.is_ascii() {
                    spans.push(end..end);
                }
            }
            Ok(spans)
        }
    }

    fn filler(words: usize) -> String {
        (0..words).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn splitter() -> TokenSplitter {
        TokenSplitter::new(Arc::new(WordTokenCounter::default()), RenderOptions::default())
    }

    #[test]
    fn test_windows_for_250_tokens() {
        assert_eq!(token_windows(250, 100, 20), vec![0..100, 80..180, 160..250]);
    }

    #[test]
    fn test_windows_edge_cases() {
        assert!(token_windows(0, 10, 2).is_empty());
        assert_eq!(token_windows(5, 10, 2), vec![0..5]);
        assert_eq!(token_windows(10, 10, 0), vec![0..10]);
        assert_eq!(token_windows(4, 2, 1), vec![0..2, 1..3, 2..4]);
    }

    #[test]
    fn test_split_filler_text() {
        let text = filler(250);
        let segments = splitter()
            .split(&Document::new(text.as_str()), &SplitterConfig::sized(100, 20))
            .expect("splits");

        assert_eq!(segments.len(), 3);
        assert!(segments[0].raw_text.starts_with("w0 "));
        assert!(segments[0].raw_text.ends_with(" w99"));
        assert!(segments[1].raw_text.starts_with(" w80 "));
        assert!(segments[2].raw_text.ends_with(" w249"));
        for segment in &segments {
            assert_eq!(&text[segment.span()], segment.raw_text);
        }
    }

    #[test]
    fn test_whitespace_only_text_is_one_segment() {
        let segments = splitter()
            .split(&Document::new("   "), &SplitterConfig::sized(4, 1))
            .expect("splits");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].raw_text, "   ");
    }

    #[test]
    fn test_trailing_character_tokens_never_form_empty_windows() {
        let splitter = TokenSplitter::new(Arc::new(SplitCharCounter), RenderOptions::default());
        let text = "aæb";
        let document = Document::new(text);

        let segments = splitter
            .split(&document, &SplitterConfig::sized(1, 0))
            .expect("splits");
        let pieces: Vec<&str> = segments.iter().map(|s| s.raw_text.as_str()).collect();
        assert_eq!(pieces, vec!["a", "æ", "b"]);

        let segments = splitter
            .split(&document, &SplitterConfig::sized(2, 1))
            .expect("splits");
        let pieces: Vec<&str> = segments.iter().map(|s| s.raw_text.as_str()).collect();
        assert_eq!(pieces, vec!["aæ", "æ", "b"]);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let err = splitter()
            .split(&Document::new("a b c"), &SplitterConfig::sized(3, 5))
            .expect_err("overlap larger than size");
        assert!(err.is_configuration());
    }
}
