//! Documents, segments and their rendered variants

use nodesplit_config::{DEFAULT_HEADER_SEPARATOR, SplitterSettings};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Sorted key/value metadata, so rendering order never depends on insertion
pub type Metadata = BTreeMap<String, String>;

/// A text to split, with metadata that every segment inherits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Metadata keys left out of the embedding rendering
    #[serde(default)]
    pub excluded_embed_metadata_keys: BTreeSet<String>,
    /// Metadata keys left out of the LLM rendering
    #[serde(default)]
    pub excluded_llm_metadata_keys: BTreeSet<String>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn exclude_from_embed(mut self, key: impl Into<String>) -> Self {
        self.excluded_embed_metadata_keys.insert(key.into());
        self
    }

    #[must_use]
    pub fn exclude_from_llm(mut self, key: impl Into<String>) -> Self {
        self.excluded_llm_metadata_keys.insert(key.into());
        self
    }

    /// Whether the text is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Which rendering of a segment to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataMode {
    /// The raw source slice
    None,
    /// Text as fed to an embedding model
    Embed,
    /// Text as fed to a language model
    Llm,
}

/// How header chains are rendered in front of segment text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub include_header_path: bool,
    pub header_separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_header_path: true,
            header_separator: DEFAULT_HEADER_SEPARATOR.to_string(),
        }
    }
}

impl From<&SplitterSettings> for RenderOptions {
    fn from(settings: &SplitterSettings) -> Self {
        Self {
            include_header_path: settings.include_header_path,
            header_separator: settings.header_separator.clone(),
        }
    }
}

/// One contiguous piece of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Literal slice of the source text
    pub raw_text: String,
    pub byte_start: usize,
    pub byte_end: usize,
    /// Ancestor headers, outermost first (structural splitting only)
    pub header_path: Vec<String>,
    pub metadata: Metadata,
    pub excluded_embed_metadata_keys: BTreeSet<String>,
    pub excluded_llm_metadata_keys: BTreeSet<String>,
    pub render_embed: String,
    pub render_llm: String,
}

impl Segment {
    /// Build the segment covering `span` of the document text
    ///
    /// `span` must lie on character boundaries of `document.text`.
    pub fn new(
        document: &Document,
        span: Range<usize>,
        header_path: Vec<String>,
        options: &RenderOptions,
    ) -> Self {
        debug_assert!(document.text.get(span.clone()).is_some());
        let raw_text = document
            .text
            .get(span.clone())
            .map(ToString::to_string)
            .unwrap_or_default();

        let render_embed = render(
            &raw_text,
            &header_path,
            &document.metadata,
            &document.excluded_embed_metadata_keys,
            options,
        );
        let render_llm = render(
            &raw_text,
            &header_path,
            &document.metadata,
            &document.excluded_llm_metadata_keys,
            options,
        );

        Self {
            raw_text,
            byte_start: span.start,
            byte_end: span.end,
            header_path,
            metadata: document.metadata.clone(),
            excluded_embed_metadata_keys: document.excluded_embed_metadata_keys.clone(),
            excluded_llm_metadata_keys: document.excluded_llm_metadata_keys.clone(),
            render_embed,
            render_llm,
        }
    }

    /// Text of the requested rendering
    pub fn content(&self, mode: MetadataMode) -> &str {
        match mode {
            MetadataMode::None => &self.raw_text,
            MetadataMode::Embed => &self.render_embed,
            MetadataMode::Llm => &self.render_llm,
        }
    }

    /// Source byte span
    pub const fn span(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }
}

fn render(
    raw_text: &str,
    header_path: &[String],
    metadata: &Metadata,
    excluded: &BTreeSet<String>,
    options: &RenderOptions,
) -> String {
    let mut prefix: Vec<String> = Vec::new();

    if options.include_header_path && !header_path.is_empty() {
        prefix.push(header_path.join(&options.header_separator));
    }
    prefix.extend(
        metadata
            .iter()
            .filter(|(key, _)| !excluded.contains(*key))
            .map(|(key, value)| format!("{key}: {value}")),
    );

    if prefix.is_empty() {
        raw_text.to_string()
    } else {
        format!("{}\n\n{raw_text}", prefix.join("\n"))
    }
}
