use std::collections::HashSet;

use crate::filtering::detector::{HallucinationDetector, SegmentText};

/// Texts shorter than this are skipped; trivial phrases ("yes", "okay")
/// legitimately repeat in real speech.
const MIN_TEXT_CHARS: usize = 20;

/// Marks near-duplicate segments using normalized edit-distance
/// similarity. For every pair above the threshold the later segment is
/// marked and the earlier occurrence kept.
pub struct SemanticSimilarityDetector {
    threshold: f64,
}

impl SemanticSimilarityDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl HallucinationDetector for SemanticSimilarityDetector {
    fn name(&self) -> &'static str {
        "semantic similarity"
    }

    fn detect(&self, segments: &[SegmentText]) -> HashSet<usize> {
        let mut marked = HashSet::new();

        let lowered: Vec<Option<String>> = segments
            .iter()
            .map(|s| {
                if s.text.chars().count() < MIN_TEXT_CHARS {
                    None
                } else {
                    Some(s.text.to_lowercase())
                }
            })
            .collect();

        for i in 0..lowered.len() {
            let Some(a) = lowered[i].as_ref() else {
                continue;
            };
            for (j, entry) in lowered.iter().enumerate().skip(i + 1) {
                let Some(b) = entry.as_ref() else {
                    continue;
                };
                if marked.contains(&j) {
                    continue;
                }
                let similarity = text_similarity(a, b);
                if similarity > self.threshold {
                    log::debug!(
                        "Segment {j} is a near-duplicate of {i} (similarity {similarity:.2})"
                    );
                    marked.insert(j);
                }
            }
        }

        marked
    }
}

/// Normalized similarity in [0, 1]: 1 minus the Levenshtein distance
/// divided by the longer length.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let longest = a_chars.len().max(b_chars.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a_chars, &b_chars) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}
