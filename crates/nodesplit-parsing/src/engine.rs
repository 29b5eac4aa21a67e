//! Validation and dispatch of splitting strategies

use crate::SegmentationResult;
use crate::chunking::TokenCounterRef;
use crate::document::{Document, RenderOptions, Segment};
use crate::strategies::{SplitStrategy, StrategyRegistry};
use nodesplit_config::SplitterConfig;
use std::sync::Arc;
use std::time::Instant;

/// Applies splitting strategies to documents
///
/// Holds the token counter and render options that strategies resolved by
/// name are bound to.
pub struct SegmentationEngine {
    registry: StrategyRegistry,
    counter: TokenCounterRef,
    render: RenderOptions,
}

impl SegmentationEngine {
    pub fn new(counter: TokenCounterRef, render: RenderOptions) -> Self {
        Self {
            registry: StrategyRegistry::new(),
            counter,
            render,
        }
    }

    /// Names of all registered strategies, sorted
    pub fn list_available_strategies(&self) -> Vec<&'static str> {
        self.registry.list_available_strategies()
    }

    /// Default parameters of the named strategy
    ///
    /// # Errors
    /// Returns a configuration error for unknown strategy names
    pub fn default_config_for(&self, name: &str) -> SegmentationResult<SplitterConfig> {
        self.registry
            .default_config_for(name, Arc::clone(&self.counter))
    }

    /// Build the named strategy bound to this engine's counter
    ///
    /// # Errors
    /// Returns a configuration error for unknown strategy names
    pub fn strategy(&self, name: &str) -> SegmentationResult<Box<dyn SplitStrategy>> {
        self.registry
            .create(name, Arc::clone(&self.counter), self.render.clone())
    }

    /// Split a document with the given strategy
    ///
    /// Unset parameters are filled from the strategy defaults and validated
    /// before any work is done, so an invalid configuration fails even for an
    /// empty document.
    ///
    /// # Errors
    /// Returns configuration errors for invalid parameters and tokenization
    /// errors from the strategy's token counter
    pub fn run(
        document: &Document,
        strategy: &dyn SplitStrategy,
        config: &SplitterConfig,
    ) -> SegmentationResult<Vec<Segment>> {
        let config = config.or_defaults(&strategy.default_config());
        strategy.validate(&config)?;

        if document.is_empty() {
            tracing::debug!(strategy = strategy.name(), "Empty document, nothing to split");
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let segments = strategy.split(document, &config)?;

        tracing::info!(
            strategy = strategy.name(),
            bytes = document.text.len(),
            segments = segments.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Segmented document"
        );
        Ok(segments)
    }

    /// Resolve a strategy by name and split a document with it
    ///
    /// # Errors
    /// Same as [`SegmentationEngine::run`], plus a configuration error for
    /// unknown strategy names
    pub fn run_named(
        &self,
        document: &Document,
        name: &str,
        config: &SplitterConfig,
    ) -> SegmentationResult<Vec<Segment>> {
        let strategy = self.strategy(name)?;
        Self::run(document, strategy.as_ref(), config)
    }
}
