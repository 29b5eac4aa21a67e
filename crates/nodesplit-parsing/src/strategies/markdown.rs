//! Markdown-structure-aware splitting
//!
//! Sections are delimited by ATX header lines (`#` to `######`). Each
//! section body becomes one segment that remembers its ancestor header
//! chain. Header-looking lines inside fenced code blocks are ordinary text.
//! A document with headers but no body text keeps its last header line as
//! the only segment.

use super::{SplitStrategy, trim_span};
use crate::document::{Document, RenderOptions, Segment};
use crate::{SegmentationError, SegmentationResult};
use nodesplit_config::SplitterConfig;
use regex::Regex;
use std::sync::OnceLock;

/// Registered name of the structural strategy
pub const NAME: &str = "MarkdownNodeParser";

fn header_regex() -> Option<&'static Regex> {
    static HEADER_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER_REGEX
        .get_or_init(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$").ok())
        .as_ref()
}

/// Opening or closing line of a fenced code block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn parse(line: &str) -> Option<Self> {
        let indent = line.len().saturating_sub(line.trim_start_matches(' ').len());
        if indent > 3 {
            return None;
        }

        let rest = line.trim_start_matches(' ');
        let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = rest.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    /// Whether `line` closes a block opened by `self`
    fn is_closed_by(self, line: &str) -> bool {
        Self::parse(line).is_some_and(|fence| {
            let tail = line
                .trim_start_matches(' ')
                .trim_start_matches(self.marker)
                .trim();
            fence.marker == self.marker && fence.len >= self.len && tail.is_empty()
        })
    }
}

struct Section {
    body_start: usize,
    path: Vec<String>,
}

/// Trimmed span of the most recent header line and the path it opened
struct HeaderLine {
    span: (usize, usize),
    path: Vec<String>,
}

/// Splits markdown at header lines, ignoring size parameters
pub struct MarkdownSplitter {
    render: RenderOptions,
}

impl MarkdownSplitter {
    pub const fn new(render: RenderOptions) -> Self {
        Self { render }
    }

    fn push_section(
        &self,
        document: &Document,
        section: &Section,
        body_end: usize,
        segments: &mut Vec<Segment>,
    ) {
        if let Some((start, end)) = trim_span(&document.text, section.body_start, body_end) {
            segments.push(Segment::new(
                document,
                start..end,
                section.path.clone(),
                &self.render,
            ));
        }
    }
}

impl Default for MarkdownSplitter {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl SplitStrategy for MarkdownSplitter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_config(&self) -> SplitterConfig {
        SplitterConfig::empty()
    }

    fn validate(&self, _config: &SplitterConfig) -> SegmentationResult<()> {
        Ok(())
    }

    fn split(
        &self,
        document: &Document,
        _config: &SplitterConfig,
    ) -> SegmentationResult<Vec<Segment>> {
        let header_regex = header_regex()
            .ok_or_else(|| SegmentationError::configuration("header pattern failed to compile"))?;

        let text = document.text.as_str();
        let mut segments = Vec::new();
        let mut stack: Vec<(usize, String)> = Vec::new();
        let mut section = Section {
            body_start: 0,
            path: Vec::new(),
        };
        let mut open_fence: Option<Fence> = None;
        let mut last_header: Option<HeaderLine> = None;
        let mut line_start = 0usize;

        for line in text.split_inclusive('\n') {
            let line_end = line_start.saturating_add(line.len());
            let content = line.trim_end_matches(['\n', '\r']);

            if let Some(fence) = open_fence {
                if fence.is_closed_by(content) {
                    open_fence = None;
                }
            } else if let Some(fence) = Fence::parse(content) {
                open_fence = Some(fence);
            } else if let Some(captures) = header_regex.captures(content) {
                let level = captures.get(1).map_or(1, |m| m.as_str().len());
                let title = captures.get(2).map_or("", |m| m.as_str()).trim().to_string();

                self.push_section(document, &section, line_start, &mut segments);

                while stack.last().is_some_and(|(open_level, _)| *open_level >= level) {
                    stack.pop();
                }
                stack.push((level, title));

                section = Section {
                    body_start: line_end,
                    path: stack
                        .iter()
                        .filter(|(_, title)| !title.is_empty())
                        .map(|(_, title)| title.clone())
                        .collect(),
                };
                if let Some(span) = trim_span(text, line_start, line_end) {
                    last_header = Some(HeaderLine {
                        span,
                        path: section.path.clone(),
                    });
                }
            }

            line_start = line_end;
        }

        self.push_section(document, &section, text.len(), &mut segments);

        if segments.is_empty() && !text.is_empty() {
            let (range, path) = last_header.map_or((0..text.len(), Vec::new()), |header| {
                (header.span.0..header.span.1, header.path)
            });
            segments.push(Segment::new(document, range, path, &self.render));
        }

        tracing::debug!(
            strategy = NAME,
            segments = segments.len(),
            headers_open = stack.len(),
            "Split markdown document"
        );
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<Segment> {
        MarkdownSplitter::default()
            .split(&Document::new(text), &SplitterConfig::empty())
            .expect("markdown split never fails")
    }

    fn raw(segments: &[Segment]) -> Vec<&str> {
        segments.iter().map(|s| s.raw_text.as_str()).collect()
    }

    #[test]
    fn test_two_top_level_sections() {
        let segments = split("# A\ntext1\n# B\ntext2");

        assert_eq!(raw(&segments), vec!["text1", "text2"]);
        assert_eq!(segments[0].render_embed, "A\n\ntext1");
        assert_eq!(segments[1].render_embed, "B\n\ntext2");
    }

    #[test]
    fn test_nested_header_path() {
        let text = "# Guide\nintro\n## Install\nsteps\n### Linux\napt\n## Usage\nrun it\n";
        let segments = split(text);

        let paths: Vec<Vec<String>> = segments.iter().map(|s| s.header_path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec!["Guide".to_string()],
                vec!["Guide".to_string(), "Install".to_string()],
                vec![
                    "Guide".to_string(),
                    "Install".to_string(),
                    "Linux".to_string()
                ],
                vec!["Guide".to_string(), "Usage".to_string()],
            ]
        );
        assert_eq!(segments[2].render_embed, "Guide > Install > Linux\n\napt");
    }

    #[test]
    fn test_empty_sections_still_extend_the_chain() {
        let segments = split("# Top\n\n## Child\nbody\n");

        assert_eq!(raw(&segments), vec!["body"]);
        assert_eq!(segments[0].header_path, vec!["Top", "Child"]);
    }

    #[test]
    fn test_preamble_has_empty_path() {
        let segments = split("Preface text.\n\n# One\nbody");

        assert_eq!(raw(&segments), vec!["Preface text.", "body"]);
        assert!(segments[0].header_path.is_empty());
        assert_eq!(segments[0].render_embed, "Preface text.");
    }

    #[test]
    fn test_no_headers_yields_whole_text() {
        let text = "  just a paragraph\nover two lines\n\n";
        let segments = split(text);

        assert_eq!(raw(&segments), vec![text.trim()]);
    }

    #[test]
    fn test_headers_inside_fences_are_text() {
        let text = "# Real\n```bash\n# not a header\necho hi\n```\nafter\n~~~\n## also not\n~~~\n";
        let segments = split(text);

        assert_eq!(segments.len(), 1);
        assert!(segments[0].raw_text.contains("# not a header"));
        assert!(segments[0].raw_text.contains("## also not"));
        assert_eq!(segments[0].header_path, vec!["Real"]);
    }

    #[test]
    fn test_closing_hashes_are_stripped() {
        let segments = split("## Title ##\nbody\n# C#\nsharp");

        assert_eq!(segments[0].header_path, vec!["Title"]);
        assert_eq!(segments[1].header_path, vec!["C#"]);
    }

    #[test]
    fn test_hash_without_space_is_not_a_header() {
        let segments = split("#hashtag\ntext");
        assert_eq!(raw(&segments), vec!["#hashtag\ntext"]);
    }

    #[test]
    fn test_bare_hashes_open_an_empty_header() {
        let segments = split("# Top\n##\nbody\n###\ndeep");

        assert_eq!(raw(&segments), vec!["body", "deep"]);
        assert_eq!(segments[0].header_path, vec!["Top"]);
        assert_eq!(segments[1].header_path, vec!["Top"]);
    }

    #[test]
    fn test_header_only_document_keeps_last_header() {
        let segments = split("# Title");
        assert_eq!(raw(&segments), vec!["# Title"]);
        assert_eq!(segments[0].header_path, vec!["Title"]);

        let segments = split("# A\n## B\n");
        assert_eq!(raw(&segments), vec!["## B"]);
        assert_eq!(segments[0].header_path, vec!["A", "B"]);
        assert_eq!(segments[0].render_embed, "A > B\n\n## B");
    }

    #[test]
    fn test_whitespace_only_document_is_one_segment() {
        let text = "   \n  ";
        let segments = split(text);

        assert_eq!(raw(&segments), vec![text]);
        assert!(segments[0].header_path.is_empty());
    }

    #[test]
    fn test_raw_text_matches_source_span() {
        let text = "# A\r\n first \r\n\r\n## B\nsecond\n";
        for segment in split(text) {
            assert_eq!(&text[segment.span()], segment.raw_text);
        }
    }

    #[test]
    fn test_custom_separator() {
        let splitter = MarkdownSplitter::new(RenderOptions {
            include_header_path: true,
            header_separator: " / ".to_string(),
        });
        let segments = splitter
            .split(&Document::new("# A\n## B\nbody"), &SplitterConfig::empty())
            .expect("splits");
        assert_eq!(segments[0].render_embed, "A / B\n\nbody");
    }
}
