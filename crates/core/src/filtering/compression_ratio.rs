use std::collections::HashSet;

use crate::filtering::detector::{HallucinationDetector, SegmentText};

/// Expected average encoded word length, spaces included.
const AVERAGE_WORD_LENGTH: usize = 5;

/// Segments shorter than this (in characters) are never marked; short
/// fragments produce noisy ratios.
const MIN_TEXT_CHARS: usize = 20;

/// Flags segments whose encoded byte length far exceeds what their word
/// count predicts. Degenerate decoding tends to produce unnaturally
/// dense or garbled runs with very high ratios.
pub struct CompressionRatioDetector {
    threshold: f64,
}

impl CompressionRatioDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl HallucinationDetector for CompressionRatioDetector {
    fn name(&self) -> &'static str {
        "compression ratio"
    }

    fn detect(&self, segments: &[SegmentText]) -> HashSet<usize> {
        let mut marked = HashSet::new();

        for (i, segment) in segments.iter().enumerate() {
            if segment.text.chars().count() <= MIN_TEXT_CHARS {
                continue;
            }
            let ratio = compression_ratio(&segment.text);
            if ratio > self.threshold {
                let preview: String = segment.text.chars().take(50).collect();
                log::debug!(
                    "Segment {i} over compression threshold (ratio {ratio:.2}): '{preview}'"
                );
                marked.insert(i);
            }
        }

        marked
    }
}

pub fn compression_ratio(text: &str) -> f64 {
    let words = text.split_whitespace().count();
    let expected = (words * AVERAGE_WORD_LENGTH).max(1);
    text.len() as f64 / expected as f64
}
