//! nodesplit segmentation crate
//!
//! Splits text documents into bounded-size segments ("nodes") using a
//! markdown-structure-aware strategy or one of two token-budget strategies,
//! and provides the token counters those strategies measure with.

pub mod chunking;
pub mod document;
pub mod engine;
pub mod error;
pub mod strategies;

// Re-export main types
pub use chunking::{
    Encoding, TiktokenCounter, TokenCounter, TokenCounterRef, TokenCounterRegistry, TokenSpan,
    WordTokenCounter,
};
pub use document::{Document, Metadata, MetadataMode, RenderOptions, Segment};
pub use engine::SegmentationEngine;
pub use error::{SegmentationError, SegmentationResult};
pub use strategies::{
    MarkdownSplitter, SentenceSplitter, SplitStrategy, StrategyRegistry, TokenSplitter,
};
