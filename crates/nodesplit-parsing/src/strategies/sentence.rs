//! Sentence-aligned splitting under a token budget

use super::{SplitStrategy, trim_span};
use crate::chunking::TokenCounterRef;
use crate::document::{Document, RenderOptions, Segment};
use crate::{SegmentationError, SegmentationResult};
use nodesplit_config::SplitterConfig;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Registered name of the sentence strategy
pub const NAME: &str = "SentenceSplitter";

const DEFAULT_CHUNK_SIZE: usize = 1024;
const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Lowercased abbreviations whose trailing period does not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "etc.", "vs.", "cf.", "approx.", "fig.", "no.", "mr.", "mrs.", "ms.",
    "dr.", "prof.", "sr.", "jr.", "st.",
];

/// Terminal punctuation (plus closing quotes/brackets) followed by
/// whitespace, CJK full-width terminals, or a blank line
fn boundary_regex() -> Option<&'static Regex> {
    static BOUNDARY_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    BOUNDARY_REGEX
        .get_or_init(|| {
            Regex::new(r#"[.!?]+["'”’)\]]*\s+|[。！？]+["'”’」』)\]]*\s*|\n[ \t]*\n\s*"#).ok()
        })
        .as_ref()
}

/// Whether the boundary at `boundary_start` is the period of an abbreviation
fn ends_abbreviation(text: &str, boundary_start: usize, terminator: &str) -> bool {
    if !terminator.starts_with('.') || terminator.starts_with("..") {
        return false;
    }

    let Some(before) = text.get(..boundary_start) else {
        return false;
    };
    let word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(['(', '[', '"', '\'', '“', '‘']);

    let candidate = format!("{}.", word.to_lowercase());
    ABBREVIATIONS.contains(&candidate.as_str())
}

/// Byte spans of the trimmed sentences of `text`, in order
fn sentence_spans(text: &str, boundary: &Regex) -> Vec<(usize, usize)> {
    let mut sentences = Vec::new();
    let mut cursor = 0usize;

    for found in boundary.find_iter(text) {
        if ends_abbreviation(text, found.start(), found.as_str()) {
            continue;
        }
        if let Some(span) = trim_span(text, cursor, found.end()) {
            sentences.push(span);
        }
        cursor = found.end();
    }

    if let Some(span) = trim_span(text, cursor, text.len()) {
        sentences.push(span);
    }

    sentences
}

/// Group sentence indices into segments
///
/// Sentences are packed greedily while the summed token count stays within
/// `size`; an oversized sentence stands alone. Each following group starts
/// with trailing sentences of the previous one until `overlap` tokens are
/// covered, never the whole previous group, and dropping overlap sentences
/// when they would leave no room for the first new sentence.
fn pack(counts: &[usize], size: usize, overlap: usize) -> Vec<Range<usize>> {
    let count_at = |index: usize| counts.get(index).copied().unwrap_or(0);
    let total = counts.len();

    let mut groups = Vec::new();
    let mut start = 0usize;
    // First index not yet part of any group; each group must reach past it
    let mut min_end = 1usize;

    while start < total {
        let mut end = start;
        let mut tokens = 0usize;
        while end < total {
            let next = count_at(end);
            if end >= min_end && tokens.saturating_add(next) > size {
                break;
            }
            tokens = tokens.saturating_add(next);
            end = end.saturating_add(1);
        }

        groups.push(start..end);
        if end >= total {
            break;
        }

        let mut next_start = end;
        let mut covered = 0usize;
        while next_start > start.saturating_add(1) && covered < overlap {
            next_start = next_start.saturating_sub(1);
            covered = covered.saturating_add(count_at(next_start));
        }

        let incoming = count_at(end);
        while next_start < end && covered.saturating_add(incoming) > size {
            covered = covered.saturating_sub(count_at(next_start));
            next_start = next_start.saturating_add(1);
        }

        start = next_start;
        min_end = end.saturating_add(1);
    }

    groups
}

/// Packs whole sentences into segments of at most `chunk_size` tokens
pub struct SentenceSplitter {
    counter: TokenCounterRef,
    render: RenderOptions,
}

impl SentenceSplitter {
    pub const fn new(counter: TokenCounterRef, render: RenderOptions) -> Self {
        Self { counter, render }
    }
}

impl SplitStrategy for SentenceSplitter {
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
        let boundary = boundary_regex().ok_or_else(|| {
            SegmentationError::configuration("sentence boundary pattern failed to compile")
        })?;

        let text = document.text.as_str();
        let sentences = sentence_spans(text, boundary);
        if sentences.is_empty() {
            // Whitespace-only text has no sentences but is still a document
            return Ok(if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::new(document, 0..text.len(), Vec::new(), &self.render)]
            });
        }
        let pieces: Vec<&str> = sentences
            .iter()
            .map(|&(start, end)| text.get(start..end).unwrap_or_default())
            .collect();
        let counts = self.counter.count_batch(&pieces)?;

        let segments: Vec<Segment> = pack(&counts, size, overlap)
            .into_iter()
            .filter_map(|group| {
                let first = sentences.get(group.start)?;
                let last = sentences.get(group.end.checked_sub(1)?)?;
                Some(Segment::new(document, first.0..last.1, Vec::new(), &self.render))
            })
            .collect();

        tracing::debug!(
            strategy = NAME,
            sentences = sentences.len(),
            segments = segments.len(),
            chunk_size = size,
            chunk_overlap = overlap,
            "Split document into sentence groups"
        );
        Ok(segments)
    }
}
