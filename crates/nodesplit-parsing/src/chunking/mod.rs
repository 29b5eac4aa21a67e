//! Token counting for segment sizing and statistics

pub mod registry;
pub mod tiktoken_counter;
pub mod traits;
pub mod word_counter;

pub use registry::TokenCounterRegistry;
pub use tiktoken_counter::{Encoding, TiktokenCounter};
pub use traits::{TokenCounter, TokenCounterRef, TokenSpan};
pub use word_counter::{WORD_COUNTER_MODEL, WordTokenCounter};
