use std::collections::HashSet;

use crate::transcript::transcript::Transcript;

/// Immutable per-segment view handed to every detector: the flattened
/// text (words joined by spaces) and the segment duration in seconds.
///
/// The snapshot is taken once before filtering begins, so one detector's
/// decisions can never change what another detector sees.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentText {
    pub text: String,
    pub duration: f64,
}

pub fn snapshot(transcript: &Transcript) -> Vec<SegmentText> {
    transcript
        .segments
        .iter()
        .map(|s| SegmentText {
            text: s.flattened_text(),
            duration: s.span.duration(),
        })
        .collect()
}

/// One independent hallucination heuristic. Returns the indices of
/// segments it wants discarded; decisions across detectors are unioned.
pub trait HallucinationDetector {
    fn name(&self) -> &'static str;

    fn detect(&self, segments: &[SegmentText]) -> HashSet<usize>;
}

#[cfg(test)]
pub(crate) fn texts(values: &[&str]) -> Vec<SegmentText> {
    values
        .iter()
        .map(|v| SegmentText {
            text: v.to_string(),
            duration: 1.0,
        })
        .collect()
}
