//! Whitespace-delimited token counter
//!
//! Cheap and deterministic, which makes it handy for tests and for rough
//! budgeting when no BPE vocabulary matches the target model.

use super::traits::{TokenCounter, TokenSpan};
use crate::SegmentationResult;

/// Model id the registry exposes this counter under
pub const WORD_COUNTER_MODEL: &str = "whitespace";

/// Counts whitespace-separated words as tokens
///
/// Each token owns the whitespace in front of it, so token spans tile the
/// text exactly. Trailing whitespace belongs to the last token and a
/// whitespace-only string is a single token.
pub struct WordTokenCounter {
    name: String,
    max_tokens: usize,
}

impl WordTokenCounter {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            name: WORD_COUNTER_MODEL.to_string(),
            max_tokens,
        }
    }
}

impl Default for WordTokenCounter {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl TokenCounter for WordTokenCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    fn token_spans(&self, text: &str) -> SegmentationResult<Vec<TokenSpan>> {
        let mut spans: Vec<TokenSpan> = Vec::new();
        let mut start = 0;
        let mut in_word = false;

        for (offset, ch) in text.char_indices() {
            if ch.is_whitespace() {
                if in_word {
                    spans.push(start..offset);
                    start = offset;
                    in_word = false;
                }
            } else {
                in_word = true;
            }
        }

        if in_word {
            spans.push(start..text.len());
        } else if start < text.len() {
            match spans.last_mut() {
                Some(last) => last.end = text.len(),
                None => spans.push(0..text.len()),
            }
        }

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces(text: &str) -> Vec<&str> {
        WordTokenCounter::default()
            .token_spans(text)
            .expect("spans")
            .into_iter()
            .map(|span| &text[span])
            .collect()
    }

    #[test]
    fn test_words_carry_leading_whitespace() {
        assert_eq!(pieces("one two  three"), vec!["one", " two", "  three"]);
    }

    #[test]
    fn test_trailing_whitespace_joins_last_word() {
        assert_eq!(pieces("one two \n"), vec!["one", " two \n"]);
        assert_eq!(pieces("  lead"), vec!["  lead"]);
    }

    #[test]
    fn test_whitespace_only_and_empty() {
        assert_eq!(pieces("   "), vec!["   "]);
        assert!(pieces("").is_empty());
    }

    #[test]
    fn test_count_matches_words() {
        let counter = WordTokenCounter::new(512);
        assert_eq!(counter.count("Blåbær på\tbrød").expect("count"), 3);
        assert_eq!(counter.max_tokens(), 512);
        assert_eq!(counter.name(), WORD_COUNTER_MODEL);
    }
}
