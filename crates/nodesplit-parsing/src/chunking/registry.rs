//! Token counter registry for model selection

use super::tiktoken_counter::{Encoding, TiktokenCounter};
use super::traits::TokenCounterRef;
use super::word_counter::{WORD_COUNTER_MODEL, WordTokenCounter};
use crate::SegmentationResult;
use nodesplit_config::{ConfigError, DEFAULT_TOKENIZER_MODEL};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Model ids advertised by [`TokenCounterRegistry::list_models`]
///
/// Other ids of the same families (dated snapshots and the like) resolve
/// too; these are the ones worth showing a user.
const KNOWN_MODELS: &[&str] = &[
    "gpt-35-turbo",
    "gpt-35-turbo-16k",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-16k",
    "gpt-4",
    "gpt-4-32k",
    "gpt-4-turbo",
    "gpt-4o",
    "gpt-4o-mini",
    "o1-mini",
    "o1-preview",
    "text-embedding-ada-002",
    "text-embedding-3-small",
    "text-embedding-3-large",
    "text-davinci-003",
    "text-curie-001",
    "code-davinci-002",
];

/// Registry for token counters by model ID
///
/// Supports OpenAI models (via tiktoken), raw encoding names and the
/// whitespace counter. Built-in counters are constructed per lookup; hold
/// on to the returned reference to reuse a loaded BPE table.
pub struct TokenCounterRegistry {
    custom: HashMap<String, TokenCounterRef>,
    models: BTreeSet<String>,
    default_model: String,
}

impl TokenCounterRegistry {
    /// Create a registry with every built-in model id
    pub fn new() -> Self {
        let mut models: BTreeSet<String> = KNOWN_MODELS.iter().map(ToString::to_string).collect();
        models.extend(Encoding::ALL.iter().map(|encoding| encoding.name().to_string()));
        models.insert(WORD_COUNTER_MODEL.to_string());

        Self {
            custom: HashMap::new(),
            models,
            default_model: DEFAULT_TOKENIZER_MODEL.to_string(),
        }
    }

    /// Get a token counter for the specified model
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownTokenizerModel` (wrapped) when no counter
    /// can be built for `model_id`. Unknown ids are never mapped to a
    /// fallback counter.
    pub fn for_model(&self, model_id: &str) -> SegmentationResult<TokenCounterRef> {
        let model_id = model_id.trim();

        if let Some(counter) = self.custom.get(model_id) {
            return Ok(Arc::clone(counter));
        }

        let counter: TokenCounterRef = if model_id == WORD_COUNTER_MODEL {
            Arc::new(WordTokenCounter::default())
        } else if Encoding::for_model(model_id).is_some() {
            Arc::new(TiktokenCounter::for_model(model_id)?)
        } else {
            return Err(ConfigError::UnknownTokenizerModel {
                model: model_id.to_string(),
            }
            .into());
        };

        tracing::debug!(model = model_id, "Built token counter");
        Ok(counter)
    }

    /// Get the counter for the default model (gpt-35-turbo)
    ///
    /// # Errors
    /// Returns an error if the default tokenizer fails to load
    pub fn default_counter(&self) -> SegmentationResult<TokenCounterRef> {
        self.for_model(&self.default_model)
    }

    /// Id of the default model
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Register a custom counter under `model_id`, replacing any built-in
    pub fn register(&mut self, model_id: String, counter: TokenCounterRef) {
        self.models.insert(model_id.clone());
        self.custom.insert(model_id, counter);
    }

    /// List all registered model IDs
    pub fn list_models(&self) -> Vec<String> {
        self.models.iter().cloned().collect()
    }
}

impl Default for TokenCounterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TokenCounter;

    #[test]
    fn test_default_model_is_gpt35() {
        let registry = TokenCounterRegistry::new();
        assert_eq!(registry.default_model(), "gpt-35-turbo");
        let counter = registry.default_counter().expect("default loads");
        assert_eq!(counter.name(), "gpt-35-turbo");
    }

    #[test]
    fn test_encoding_names_resolve() {
        let registry = TokenCounterRegistry::new();
        let counter = registry.for_model("o200k_base").expect("encoding name");
        assert!(counter.count("hello world").expect("counts") > 0);
    }

    #[test]
    fn test_snapshot_ids_resolve() {
        let registry = TokenCounterRegistry::new();
        let counter = registry.for_model("gpt-4-0613").expect("dated gpt-4");
        assert_eq!(counter.name(), "gpt-4-0613");
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let registry = TokenCounterRegistry::new();
        let err = registry
            .for_model("bert-base-uncased")
            .err()
            .expect("unknown model must fail");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("bert-base-uncased"));
    }

    #[test]
    fn test_list_models_is_sorted_and_complete() {
        let registry = TokenCounterRegistry::new();
        let models = registry.list_models();

        let mut sorted = models.clone();
        sorted.sort();
        assert_eq!(models, sorted);
        assert!(models.iter().any(|m| m == "gpt-35-turbo"));
        assert!(models.iter().any(|m| m == "cl100k_base"));
        assert!(models.iter().any(|m| m == WORD_COUNTER_MODEL));
    }

    #[test]
    fn test_register_custom_counter() {
        let mut registry = TokenCounterRegistry::new();
        let custom: TokenCounterRef = Arc::new(WordTokenCounter::new(64));
        registry.register("my-words".to_string(), custom);

        let counter = registry.for_model("my-words").expect("registered");
        assert_eq!(counter.max_tokens(), 64);
        assert!(registry.list_models().contains(&"my-words".to_string()));
    }
}
