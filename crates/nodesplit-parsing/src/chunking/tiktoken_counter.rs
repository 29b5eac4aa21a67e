//! Tiktoken-based token counter for OpenAI models

use super::traits::{TokenCounter, TokenSpan};
use crate::{SegmentationError, SegmentationResult};
use nodesplit_config::ConfigError;
use tiktoken_rs::{CoreBPE, cl100k_base, o200k_base, p50k_base, p50k_edit, r50k_base};

/// Context window assumed when a counter is selected by encoding name
const DEFAULT_MAX_TOKENS: usize = 8192;

/// OpenAI byte-pair encodings shipped with tiktoken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Cl100kBase,
    O200kBase,
    P50kBase,
    P50kEdit,
    R50kBase,
}

impl Encoding {
    /// All encodings, in the order they are listed to users
    pub const ALL: [Self; 5] = [
        Self::Cl100kBase,
        Self::O200kBase,
        Self::P50kBase,
        Self::P50kEdit,
        Self::R50kBase,
    ];

    /// Canonical encoding name (e.g. "cl100k_base")
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cl100kBase => "cl100k_base",
            Self::O200kBase => "o200k_base",
            Self::P50kBase => "p50k_base",
            Self::P50kEdit => "p50k_edit",
            Self::R50kBase => "r50k_base",
        }
    }

    /// Resolve a model identifier or encoding name
    ///
    /// Returns `None` for identifiers that match no known model family; the
    /// caller decides how to report that, it is never mapped to a default.
    pub fn for_model(model_name: &str) -> Option<Self> {
        if let Some(encoding) = Self::ALL.into_iter().find(|e| e.name() == model_name) {
            return Some(encoding);
        }

        let encoding = match model_name {
            // Edit models must be checked before the davinci/code families
            name if name.ends_with("-edit-001") || name.contains("-edit") => Self::P50kEdit,
            // Omni and reasoning models
            name if name.starts_with("gpt-4o")
                || name.starts_with("chatgpt-4o")
                || name.starts_with("gpt-4.1")
                || name.starts_with("gpt-4.5")
                || name.starts_with("gpt-5")
                || name.starts_with("o1")
                || name.starts_with("o3")
                || name.starts_with("o4") =>
            {
                Self::O200kBase
            }
            // GPT-4, GPT-3.5 (OpenAI and Azure spellings) and current embedding models
            name if name.starts_with("gpt-4")
                || name.starts_with("gpt-3.5")
                || name.starts_with("gpt-35")
                || name.starts_with("text-embedding-ada-002")
                || name.starts_with("text-embedding-3") =>
            {
                Self::Cl100kBase
            }
            // Later GPT-3 and Codex models
            name if name.starts_with("text-davinci-002")
                || name.starts_with("text-davinci-003")
                || name.starts_with("code-") =>
            {
                Self::P50kBase
            }
            // Original GPT-3 models
            name if name.starts_with("text-davinci")
                || name.starts_with("text-curie")
                || name.starts_with("text-babbage")
                || name.starts_with("text-ada")
                || name.starts_with("text-similarity-")
                || name.starts_with("text-search-")
                || matches!(name, "davinci" | "curie" | "babbage" | "ada") =>
            {
                Self::R50kBase
            }
            _ => return None,
        };

        Some(encoding)
    }

    fn load(self) -> SegmentationResult<CoreBPE> {
        let loaded = match self {
            Self::Cl100kBase => cl100k_base(),
            Self::O200kBase => o200k_base(),
            Self::P50kBase => p50k_base(),
            Self::P50kEdit => p50k_edit(),
            Self::R50kBase => r50k_base(),
        };
        loaded.map_err(|e| SegmentationError::tokenization(self.name(), e.to_string()))
    }
}

/// Best-known context window for a model family
fn context_window(model_name: &str, encoding: Encoding) -> usize {
    match encoding {
        Encoding::O200kBase => 128_000,
        Encoding::Cl100kBase if model_name.starts_with("text-embedding") => 8191,
        Encoding::Cl100kBase if model_name.starts_with("gpt-4-32k") => 32_768,
        Encoding::Cl100kBase if model_name.starts_with("gpt-4-turbo") => 128_000,
        Encoding::Cl100kBase
            if model_name.starts_with("gpt-3.5") || model_name.starts_with("gpt-35") =>
        {
            16_384
        }
        Encoding::P50kBase if model_name.starts_with("code-") => 8001,
        Encoding::P50kBase => 4097,
        Encoding::R50kBase => 2049,
        _ => DEFAULT_MAX_TOKENS,
    }
}

/// Token counter using tiktoken for OpenAI models
pub struct TiktokenCounter {
    /// Model name for identification
    model_name: String,
    /// Which BPE table backs `encoder`
    encoding: Encoding,
    /// The tiktoken encoder
    encoder: CoreBPE,
    /// Maximum tokens this model supports
    max_tokens: usize,
}

impl TiktokenCounter {
    /// Create a new tiktoken counter for the specified model
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownTokenizerModel` (wrapped) when the model
    /// matches no known encoding, or a tokenization error if the BPE table
    /// fails to load.
    pub fn new(model_name: &str, max_tokens: usize) -> SegmentationResult<Self> {
        let encoding =
            Encoding::for_model(model_name).ok_or_else(|| ConfigError::UnknownTokenizerModel {
                model: model_name.to_string(),
            })?;

        Ok(Self {
            model_name: model_name.to_string(),
            encoding,
            encoder: encoding.load()?,
            max_tokens,
        })
    }

    /// Create a counter using the model's known context window
    ///
    /// # Errors
    /// Same as [`TiktokenCounter::new`]
    pub fn for_model(model_name: &str) -> SegmentationResult<Self> {
        let encoding =
            Encoding::for_model(model_name).ok_or_else(|| ConfigError::UnknownTokenizerModel {
                model: model_name.to_string(),
            })?;
        Self::new(model_name, context_window(model_name, encoding))
    }

    /// Encoding backing this counter
    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl TokenCounter for TiktokenCounter {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    fn token_spans(&self, text: &str) -> SegmentationResult<Vec<TokenSpan>> {
        let tokens = self.encoder.encode_ordinary(text);
        let mut spans = Vec::with_capacity(tokens.len());

        // Tokens that end inside a multi-byte character are held back until
        // the group decodes; the whole group's bytes go to its first token.
        let mut pending = Vec::new();
        let mut offset = 0usize;

        for token in tokens {
            pending.push(token);
            let Ok(piece) = self.encoder.decode(pending.clone()) else {
                continue;
            };

            let end = offset.saturating_add(piece.len());
            spans.push(offset..end);
            spans.extend(std::iter::repeat_n(end..end, pending.len().saturating_sub(1)));
            offset = end;
            pending.clear();
        }

        if !pending.is_empty() || offset != text.len() {
            return Err(SegmentationError::tokenization(
                &self.model_name,
                format!(
                    "token bytes do not reassemble the input ({offset} of {} bytes decoded)",
                    text.len()
                ),
            ));
        }

        Ok(spans)
    }

    fn count(&self, text: &str) -> SegmentationResult<usize> {
        Ok(self.encoder.encode_ordinary(text).len())
    }
}
