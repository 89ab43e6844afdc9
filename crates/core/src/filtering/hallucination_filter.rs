use std::collections::HashSet;

use crate::filtering::compression_ratio::CompressionRatioDetector;
use crate::filtering::detector::{snapshot, HallucinationDetector};
use crate::filtering::exact_repetition::ExactRepetitionDetector;
use crate::filtering::known_phrases::KnownPhraseDetector;
use crate::filtering::looping_pattern::LoopingPatternDetector;
use crate::filtering::semantic_similarity::SemanticSimilarityDetector;
use crate::pipeline::tuning_profile::TuningProfile;
use crate::transcript::transcript::Transcript;

/// Runs the enabled detectors over one immutable snapshot of the
/// transcript and drops the union of their decisions in a single pass.
/// Because every detector sees the same snapshot, the result is
/// deterministic regardless of detector ordering, and re-running the
/// filter on its own output changes nothing.
pub struct HallucinationFilter {
    detectors: Vec<Box<dyn HallucinationDetector>>,
}

impl HallucinationFilter {
    pub fn from_profile(profile: &TuningProfile) -> Self {
        let mut detectors: Vec<Box<dyn HallucinationDetector>> = Vec::new();

        if profile.enable_repetition_filter {
            detectors.push(Box::new(ExactRepetitionDetector::new(
                profile.max_consecutive_repetitions,
            )));
        }
        if profile.enable_compression_filter {
            detectors.push(Box::new(CompressionRatioDetector::new(
                profile.compression_ratio_threshold,
            )));
        }
        if profile.enable_semantic_filter {
            detectors.push(Box::new(SemanticSimilarityDetector::new(
                profile.semantic_similarity_threshold,
            )));
        }
        if profile.enable_looping_filter {
            detectors.push(Box::new(LoopingPatternDetector));
        }
        if profile.enable_known_phrase_filter {
            detectors.push(Box::new(KnownPhraseDetector));
        }

        Self { detectors }
    }

    pub fn apply(&self, transcript: Transcript) -> Transcript {
        if transcript.is_empty() || self.detectors.is_empty() {
            return transcript;
        }

        let segments = snapshot(&transcript);

        let mut discard: HashSet<usize> = HashSet::new();
        for detector in &self.detectors {
            let marked = detector.detect(&segments);
            if !marked.is_empty() {
                log::debug!("{} marked {} segments", detector.name(), marked.len());
            }
            discard.extend(marked);
        }

        if discard.is_empty() {
            return transcript;
        }

        log::debug!(
            "Removing {} of {} segments flagged as hallucinations",
            discard.len(),
            transcript.len()
        );

        let kept = transcript
            .segments
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !discard.contains(i))
            .map(|(_, s)| s)
            .collect();
        Transcript::new(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::time_span::TimeSpan;
    use crate::transcript::segment::{Line, TranscriptSegment};
    use crate::transcript::word_token::WordToken;

    fn segment(text: &str, start: f64) -> TranscriptSegment {
        let words = text
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| {
                let s = start + i as f64 * 0.3;
                WordToken::new(w, TimeSpan::new(s, s + 0.3))
            })
            .collect();
        TranscriptSegment::from_lines(
            vec![Line::new(words)],
            TimeSpan::new(start, start + 0.01),
        )
    }

    fn transcript_of(texts: &[&str]) -> Transcript {
        Transcript::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| segment(t, i as f64))
                .collect(),
        )
    }

    #[test]
    fn test_exact_repetition_five_times_keeps_two() {
        let transcript = transcript_of(&["X", "X", "X", "X", "X"]);
        let filter = HallucinationFilter::from_profile(&TuningProfile::balanced());
        let filtered = filter.apply(transcript);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_looping_pattern_removed() {
        let transcript = transcript_of(&["A", "B", "A", "B", "A", "B"]);
        let filter = HallucinationFilter::from_profile(&TuningProfile::balanced());
        let filtered = filter.apply(transcript);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.segments[0].flattened_text(), "A");
        assert_eq!(filtered.segments[1].flattened_text(), "B");
    }

    #[test]
    fn test_disabled_detectors_do_nothing() {
        let profile = TuningProfile {
            enable_repetition_filter: false,
            enable_compression_filter: false,
            enable_semantic_filter: false,
            enable_looping_filter: false,
            enable_known_phrase_filter: false,
            ..TuningProfile::balanced()
        };
        let transcript = transcript_of(&["X", "X", "X", "X", "X"]);
        let filter = HallucinationFilter::from_profile(&profile);
        assert_eq!(filter.apply(transcript).len(), 5);
    }

    #[test]
    fn test_clean_transcript_untouched() {
        let transcript = transcript_of(&[
            "welcome back everyone",
            "today we talk about rust",
            "ownership makes this safe",
        ]);
        let filter = HallucinationFilter::from_profile(&TuningProfile::balanced());
        let filtered = filter.apply(transcript.clone());
        assert_eq!(filtered, transcript);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let transcript = transcript_of(&[
            "X", "X", "X", "X", "X", // exact repetition
            "A", "B", "A", "B", "A", "B", // loop
            "normal closing remark here",
        ]);
        let filter = HallucinationFilter::from_profile(&TuningProfile::balanced());
        let once = filter.apply(transcript);
        let twice = filter.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_transcript_passthrough() {
        let filter = HallucinationFilter::from_profile(&TuningProfile::balanced());
        assert!(filter.apply(Transcript::default()).is_empty());
    }
}
