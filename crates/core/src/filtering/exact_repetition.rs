use std::collections::HashSet;

use crate::filtering::detector::{HallucinationDetector, SegmentText};

/// Marks runs of consecutive byte-identical segments beyond the allowed
/// repetition count. The first `max_consecutive` occurrences are kept.
pub struct ExactRepetitionDetector {
    max_consecutive: usize,
}

impl ExactRepetitionDetector {
    pub fn new(max_consecutive: usize) -> Self {
        Self {
            max_consecutive: max_consecutive.max(1),
        }
    }
}

impl HallucinationDetector for ExactRepetitionDetector {
    fn name(&self) -> &'static str {
        "exact repetition"
    }

    fn detect(&self, segments: &[SegmentText]) -> HashSet<usize> {
        let mut marked = HashSet::new();

        let mut i = 0;
        while i < segments.len() {
            let current = &segments[i].text;
            if current.is_empty() {
                i += 1;
                continue;
            }

            let mut run_end = i + 1;
            while run_end < segments.len() && segments[run_end].text == *current {
                run_end += 1;
            }

            let run_len = run_end - i;
            if run_len > self.max_consecutive {
                log::debug!(
                    "Found {run_len} consecutive identical segments: '{}'",
                    truncate(current)
                );
                for idx in (i + self.max_consecutive)..run_end {
                    marked.insert(idx);
                }
            }
            i = run_end;
        }

        marked
    }
}

fn truncate(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(50)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}
