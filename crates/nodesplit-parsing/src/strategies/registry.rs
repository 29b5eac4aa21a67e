//! Strategy registry for selection by name

use super::{MarkdownSplitter, SentenceSplitter, SplitStrategy, TokenSplitter, markdown, sentence, token};
use crate::SegmentationResult;
use crate::chunking::TokenCounterRef;
use crate::document::RenderOptions;
use nodesplit_config::{ConfigError, SplitterConfig};
use std::collections::BTreeMap;

/// Builds a strategy bound to a token counter and render options
pub type StrategyConstructor = fn(TokenCounterRef, RenderOptions) -> Box<dyn SplitStrategy>;

fn markdown_strategy(_counter: TokenCounterRef, render: RenderOptions) -> Box<dyn SplitStrategy> {
    Box::new(MarkdownSplitter::new(render))
}

fn sentence_strategy(counter: TokenCounterRef, render: RenderOptions) -> Box<dyn SplitStrategy> {
    Box::new(SentenceSplitter::new(counter, render))
}

fn token_strategy(counter: TokenCounterRef, render: RenderOptions) -> Box<dyn SplitStrategy> {
    Box::new(TokenSplitter::new(counter, render))
}

/// Registry mapping strategy names to constructors
///
/// Names are kept sorted so listings are stable.
#[derive(Clone)]
pub struct StrategyRegistry {
    constructors: BTreeMap<&'static str, StrategyConstructor>,
}

impl StrategyRegistry {
    /// Create a registry with the built-in strategies
    pub fn new() -> Self {
        let mut constructors: BTreeMap<&'static str, StrategyConstructor> = BTreeMap::new();
        constructors.insert(markdown::NAME, markdown_strategy);
        constructors.insert(sentence::NAME, sentence_strategy);
        constructors.insert(token::NAME, token_strategy);
        Self { constructors }
    }

    /// Register a strategy, replacing any existing one with the same name
    pub fn register(&mut self, name: &'static str, constructor: StrategyConstructor) {
        self.constructors.insert(name, constructor);
    }

    /// Names of all registered strategies, sorted
    pub fn list_available_strategies(&self) -> Vec<&'static str> {
        self.constructors.keys().copied().collect()
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Build the named strategy
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownStrategy` (wrapped) if `name` is not
    /// registered
    pub fn create(
        &self,
        name: &str,
        counter: TokenCounterRef,
        render: RenderOptions,
    ) -> SegmentationResult<Box<dyn SplitStrategy>> {
        let constructor = self.constructors.get(name).ok_or_else(|| {
            ConfigError::UnknownStrategy {
                name: name.to_string(),
                available: self.list_available_strategies().join(", "),
            }
        })?;
        Ok(constructor(counter, render))
    }

    /// Default parameters of the named strategy
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownStrategy` (wrapped) if `name` is not
    /// registered
    pub fn default_config_for(
        &self,
        name: &str,
        counter: TokenCounterRef,
    ) -> SegmentationResult<SplitterConfig> {
        Ok(self
            .create(name, counter, RenderOptions::default())?
            .default_config())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
