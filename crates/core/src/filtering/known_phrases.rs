use std::collections::HashSet;

use crate::filtering::detector::{HallucinationDetector, SegmentText};

/// Sign-off and credit boilerplate that recognition models emit on
/// silence or music, collected from widely reported degenerate output.
const KNOWN_SPURIOUS_PHRASES: &[&str] = &[
    "thank you for watching",
    "thanks for watching",
    "please subscribe",
    "like and subscribe",
    "see you in the next video",
    "see you next time",
    "subtitles by the amara.org community",
    "subtitles created by",
    "copyright",
];

/// How much longer than the phrase a segment may be and still count as
/// boilerplate rather than real speech quoting it.
const LENGTH_SLACK: usize = 15;

/// Marks the third and later occurrences of a known spurious phrase.
/// Two occurrences are tolerated: real recordings do sometimes end with
/// a sign-off.
pub struct KnownPhraseDetector;

impl HallucinationDetector for KnownPhraseDetector {
    fn name(&self) -> &'static str {
        "known phrases"
    }

    fn detect(&self, segments: &[SegmentText]) -> HashSet<usize> {
        let mut marked = HashSet::new();
        let lowered: Vec<String> = segments.iter().map(|s| s.text.to_lowercase()).collect();

        for phrase in KNOWN_SPURIOUS_PHRASES {
            let mut occurrences = 0usize;
            for (i, text) in lowered.iter().enumerate() {
                if !is_boilerplate(text, phrase) {
                    continue;
                }
                occurrences += 1;
                if occurrences > 2 {
                    log::debug!("Marking repeated spurious phrase at segment {i}: '{phrase}'");
                    marked.insert(i);
                }
            }
        }

        marked
    }
}

fn is_boilerplate(text: &str, phrase: &str) -> bool {
    text.contains(phrase) && text.chars().count() < phrase.chars().count() + LENGTH_SLACK
}
