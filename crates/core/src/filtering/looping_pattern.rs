use std::collections::HashSet;

use crate::filtering::detector::{HallucinationDetector, SegmentText};

const MIN_PATTERN_LEN: usize = 2;
const MAX_PATTERN_LEN: usize = 5;

/// Fraction of pattern elements that must match (case-insensitive) for a
/// block to count as a repeat.
const MATCH_TOLERANCE: f64 = 0.8;

/// Detects decoder loops: a contiguous block of segments immediately
/// repeating two or more times. Every occurrence after the first block
/// is marked.
pub struct LoopingPatternDetector;

impl HallucinationDetector for LoopingPatternDetector {
    fn name(&self) -> &'static str {
        "looping pattern"
    }

    fn detect(&self, segments: &[SegmentText]) -> HashSet<usize> {
        let mut marked = HashSet::new();
        let n = segments.len();

        let max_len = MAX_PATTERN_LEN.min(n / 3);
        for pattern_len in MIN_PATTERN_LEN..=max_len {
            // Room for the pattern plus at least two repeats
            for start in 0..=(n - pattern_len * 3) {
                let pattern = &segments[start..start + pattern_len];

                let mut repeats = 0;
                let mut pos = start + pattern_len;
                while pos + pattern_len <= n {
                    let candidate = &segments[pos..pos + pattern_len];
                    if !blocks_match(pattern, candidate) {
                        break;
                    }
                    repeats += 1;
                    pos += pattern_len;
                }

                if repeats >= 2 {
                    log::debug!(
                        "Detected looping pattern (length {pattern_len}, {repeats} repetitions) at segment {start}"
                    );
                    for rep in 1..=repeats {
                        let rep_start = start + rep * pattern_len;
                        for idx in rep_start..(rep_start + pattern_len).min(n) {
                            marked.insert(idx);
                        }
                    }
                }
            }
        }

        marked
    }
}

fn blocks_match(pattern: &[SegmentText], candidate: &[SegmentText]) -> bool {
    let matches = pattern
        .iter()
        .zip(candidate)
        .filter(|(a, b)| a.text.trim().to_lowercase() == b.text.trim().to_lowercase())
        .count();
    matches as f64 / pattern.len() as f64 >= MATCH_TOLERANCE
}
