//! Token statistics for segmented documents
//!
//! Counts tokens of every segment in its raw, embedding and LLM renderings,
//! totals them and estimates what embedding the document would cost.

pub mod report;

pub use report::{Report, SegmentStats, StatisticsReporter, summarize};
