use serde::{Deserialize, Serialize};

use crate::shared::time_span::TimeSpan;
use crate::transcript::word_token::WordToken;

/// An ordered run of words displayed together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub words: Vec<WordToken>,
}

impl Line {
    pub fn new(words: Vec<WordToken>) -> Self {
        Self { words }
    }
}

/// One transcript segment: ordered lines of words plus the aggregate
/// span (min word start to max word end).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub lines: Vec<Line>,
    pub span: TimeSpan,
}

impl TranscriptSegment {
    /// Build a segment from lines, deriving the aggregate span from the
    /// words. `fallback_span` is used when no line carries any words.
    pub fn from_lines(lines: Vec<Line>, fallback_span: TimeSpan) -> Self {
        let span = aggregate_span(&lines).unwrap_or(fallback_span);
        Self { lines, span }
    }

    pub fn words(&self) -> impl Iterator<Item = &WordToken> {
        self.lines.iter().flat_map(|l| l.words.iter())
    }

    /// Per-segment text used by the hallucination detectors: all words
    /// joined by single spaces.
    pub fn flattened_text(&self) -> String {
        self.words()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words.len()).sum()
    }

    /// Drop words whose text was emptied by a rewrite stage, then refresh
    /// the aggregate span from the surviving words.
    pub fn prune_empty_words(&mut self) {
        for line in &mut self.lines {
            line.words.retain(|w| !w.text.is_empty());
        }
        self.lines.retain(|l| !l.words.is_empty());
        if let Some(span) = aggregate_span(&self.lines) {
            self.span = span;
        }
    }
}

fn aggregate_span(lines: &[Line]) -> Option<TimeSpan> {
    let mut start = f64::INFINITY;
    let mut end = f64::NEG_INFINITY;
    for line in lines {
        for word in &line.words {
            start = start.min(word.span.start);
            end = end.max(word.span.end);
        }
    }
    if start.is_finite() && end.is_finite() {
        Some(TimeSpan::new(start, end))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn word(text: &str, start: f64, end: f64) -> WordToken {
        WordToken::new(text, TimeSpan::new(start, end))
    }

    #[test]
    fn test_from_lines_aggregates_span() {
        let seg = TranscriptSegment::from_lines(
            vec![Line::new(vec![word("a", 1.0, 1.5), word("b", 1.5, 2.2)])],
            TimeSpan::new(0.0, 0.01),
        );
        assert_relative_eq!(seg.span.start, 1.0);
        assert_relative_eq!(seg.span.end, 2.2);
    }

    #[test]
    fn test_from_lines_without_words_uses_fallback() {
        let seg = TranscriptSegment::from_lines(vec![], TimeSpan::new(3.0, 4.0));
        assert_relative_eq!(seg.span.start, 3.0);
        assert_relative_eq!(seg.span.end, 4.0);
    }

    #[test]
    fn test_flattened_text_joins_words_across_lines() {
        let seg = TranscriptSegment::from_lines(
            vec![
                Line::new(vec![word("hello", 0.0, 0.5)]),
                Line::new(vec![word("world", 0.5, 1.0)]),
            ],
            TimeSpan::new(0.0, 1.0),
        );
        assert_eq!(seg.flattened_text(), "hello world");
    }

    #[test]
    fn test_prune_empty_words_drops_blanks_and_refreshes_span() {
        let mut seg = TranscriptSegment::from_lines(
            vec![Line::new(vec![
                word("keep", 1.0, 1.5),
                word("", 1.5, 3.0),
                word("tail", 1.6, 2.0),
            ])],
            TimeSpan::new(0.0, 0.01),
        );
        seg.prune_empty_words();
        assert_eq!(seg.word_count(), 2);
        assert_relative_eq!(seg.span.end, 2.0);
    }

    #[test]
    fn test_prune_empty_words_drops_emptied_lines() {
        let mut seg = TranscriptSegment::from_lines(
            vec![
                Line::new(vec![word("", 0.0, 0.5)]),
                Line::new(vec![word("stay", 0.5, 1.0)]),
            ],
            TimeSpan::new(0.0, 1.0),
        );
        seg.prune_empty_words();
        assert_eq!(seg.lines.len(), 1);
    }
}
