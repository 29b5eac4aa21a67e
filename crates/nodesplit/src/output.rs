//! Report rendering for the terminal and for JSON consumers

use nodesplit_config::{DisplayConfig, PricingConfig, SplitterConfig};
use nodesplit_parsing::Segment;
use nodesplit_stats::Report;
use serde::Serialize;
use std::fmt::{self, Write};

/// One line per node followed by its text, then totals and the cost estimate
///
/// # Errors
/// Returns an error only if formatting fails
pub fn render_text(
    segments: &[Segment],
    report: &Report,
    display: &DisplayConfig,
    pricing: &PricingConfig,
) -> Result<String, fmt::Error> {
    let mut out = String::new();

    for (segment, stats) in segments.iter().zip(&report.per_segment) {
        let bar = stats.token_bar(&display.bar_icon, display.tokens_per_icon);
        writeln!(
            out,
            "Node {} : {bar} | {} tokens | {} tokens w/ metadata",
            stats.index, stats.token_count_raw, stats.token_count_embed
        )?;
        writeln!(out, "{}\n", segment.raw_text)?;
    }

    writeln!(
        out,
        "Token Statistics: {} tokens | {} tokens w/ metadata",
        report.total_tokens_raw, report.total_tokens_embed
    )?;
    let cost = report.estimated_cost(pricing.currency_rate, pricing.cost_per_token);
    writeln!(out, "Estimated cost to run: {cost:.2} {}", pricing.currency)?;

    let oversized = report.oversized_segments();
    if !oversized.is_empty() {
        let nodes: Vec<String> = oversized.iter().map(ToString::to_string).collect();
        writeln!(
            out,
            "Nodes over the {}-token context window: {}",
            report.context_window,
            nodes.join(", ")
        )?;
    }

    Ok(out)
}

/// Everything a run produced, in machine-readable form
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub strategy: &'a str,
    pub model: &'a str,
    pub splitter_config: SplitterConfig,
    pub segments: &'a [Segment],
    pub report: &'a Report,
    pub estimated_cost: f64,
    pub currency: &'a str,
}

impl<'a> JsonReport<'a> {
    pub fn new(
        strategy: &'a str,
        model: &'a str,
        splitter_config: SplitterConfig,
        segments: &'a [Segment],
        report: &'a Report,
        pricing: &'a PricingConfig,
    ) -> Self {
        Self {
            strategy,
            model,
            splitter_config,
            segments,
            report,
            estimated_cost: report.estimated_cost(pricing.currency_rate, pricing.cost_per_token),
            currency: &pricing.currency,
        }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
