//! Per-segment token statistics and cost estimates

use nodesplit_parsing::{MetadataMode, Segment, SegmentationResult, TokenCounter, TokenCounterRef};
use serde::Serialize;

/// Token counts of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentStats {
    /// Position of the segment in the input sequence
    pub index: usize,
    /// Tokens in the raw source slice
    pub token_count_raw: usize,
    /// Tokens in the embedding rendering (header path and metadata included)
    pub token_count_embed: usize,
    /// Tokens in the LLM rendering
    pub token_count_llm: usize,
    /// The embedding rendering is longer than the model's context window
    pub exceeds_context_window: bool,
}

impl SegmentStats {
    /// `icon` repeated once per whole `tokens_per_icon` raw tokens
    ///
    /// Partial steps are dropped, so a segment below `tokens_per_icon`
    /// tokens gets an empty bar. A zero step also yields an empty bar.
    pub fn token_bar(&self, icon: &str, tokens_per_icon: usize) -> String {
        self.token_count_raw
            .checked_div(tokens_per_icon)
            .map_or_else(String::new, |icons| icon.repeat(icons))
    }
}

/// Aggregate statistics over a segment sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub per_segment: Vec<SegmentStats>,
    pub total_tokens_raw: usize,
    pub total_tokens_embed: usize,
    pub total_tokens_llm: usize,
    /// Context window of the counting model
    pub context_window: usize,
}

impl Report {
    /// Cost of embedding every segment's embed rendering
    ///
    /// `cost_per_token` is in the pricing currency (USD for OpenAI) and
    /// `currency_rate` converts it to the display currency.
    pub fn estimated_cost(&self, currency_rate: f64, cost_per_token: f64) -> f64 {
        self.total_tokens_embed as f64 * cost_per_token * currency_rate
    }

    pub fn segment_count(&self) -> usize {
        self.per_segment.len()
    }

    /// Largest raw token count, 0 for an empty report
    pub fn max_tokens_raw(&self) -> usize {
        self.per_segment
            .iter()
            .map(|stats| stats.token_count_raw)
            .max()
            .unwrap_or(0)
    }

    /// Indices of segments whose embedding rendering exceeds the context window
    pub fn oversized_segments(&self) -> Vec<usize> {
        self.per_segment
            .iter()
            .filter(|stats| stats.exceeds_context_window)
            .map(|stats| stats.index)
            .collect()
    }

    /// Mean raw token count, 0.0 for an empty report
    pub fn mean_tokens_raw(&self) -> f64 {
        if self.per_segment.is_empty() {
            0.0
        } else {
            self.total_tokens_raw as f64 / self.per_segment.len() as f64
        }
    }
}

/// Count tokens of every segment in all three renderings
///
/// # Errors
/// Returns the token counter's error for the first segment it cannot count
pub fn summarize(segments: &[Segment], counter: &dyn TokenCounter) -> SegmentationResult<Report> {
    let context_window = counter.max_tokens();
    let mut report = Report {
        context_window,
        ..Report::default()
    };

    for (index, segment) in segments.iter().enumerate() {
        let token_count_raw = counter.count(segment.content(MetadataMode::None))?;
        let token_count_embed = count_rendering(segment, MetadataMode::Embed, token_count_raw, counter)?;
        let token_count_llm = count_rendering(segment, MetadataMode::Llm, token_count_raw, counter)?;

        let exceeds_context_window = token_count_embed > context_window;
        if exceeds_context_window {
            tracing::warn!(
                counter = counter.name(),
                segment = index,
                tokens = token_count_embed,
                context_window,
                "Segment exceeds the model context window"
            );
        }

        report.total_tokens_raw = report.total_tokens_raw.saturating_add(token_count_raw);
        report.total_tokens_embed = report.total_tokens_embed.saturating_add(token_count_embed);
        report.total_tokens_llm = report.total_tokens_llm.saturating_add(token_count_llm);
        report.per_segment.push(SegmentStats {
            index,
            token_count_raw,
            token_count_embed,
            token_count_llm,
            exceeds_context_window,
        });
    }

    tracing::debug!(
        counter = counter.name(),
        segments = report.segment_count(),
        total_tokens_raw = report.total_tokens_raw,
        total_tokens_embed = report.total_tokens_embed,
        "Summarized segments"
    );
    Ok(report)
}

/// Renderings identical to the raw text reuse its count
fn count_rendering(
    segment: &Segment,
    mode: MetadataMode,
    raw_count: usize,
    counter: &dyn TokenCounter,
) -> SegmentationResult<usize> {
    let rendered = segment.content(mode);
    if rendered == segment.raw_text {
        Ok(raw_count)
    } else {
        counter.count(rendered)
    }
}

/// Summarizes segments with a fixed token counter
pub struct StatisticsReporter {
    counter: TokenCounterRef,
}

impl StatisticsReporter {
    pub const fn new(counter: TokenCounterRef) -> Self {
        Self { counter }
    }

    /// See [`summarize`]
    ///
    /// # Errors
    /// Returns the token counter's error for the first segment it cannot count
    pub fn summarize(&self, segments: &[Segment]) -> SegmentationResult<Report> {
        summarize(segments, self.counter.as_ref())
    }
}
