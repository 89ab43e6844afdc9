use crate::transcript::transcript::Transcript;

/// Repairs compound words the recognition engine split into separate
/// tokens, guided by hyphenated vocabulary hints: the hint
/// "bem-aventurança" turns the adjacent tokens "bem aventurança" back
/// into one token. Only token text is rewritten; spans stay with the
/// tokens that own them, and tokens emptied by a join are pruned.
pub struct VocabularyCorrector {
    compounds: Vec<CompoundHint>,
}

struct CompoundHint {
    /// Lowercased hyphen-separated parts, in order.
    parts: Vec<String>,
    /// The hint as supplied, used as the replacement text.
    replacement: String,
}

impl VocabularyCorrector {
    pub fn new(hints: &[String]) -> Self {
        let compounds = hints
            .iter()
            .filter(|h| h.contains('-'))
            .map(|h| CompoundHint {
                parts: h.split('-').map(|p| p.to_lowercase()).collect(),
                replacement: h.clone(),
            })
            .filter(|c| c.parts.len() >= 2 && c.parts.iter().all(|p| !p.is_empty()))
            .collect();
        Self { compounds }
    }

    pub fn apply(&self, mut transcript: Transcript) -> Transcript {
        if self.compounds.is_empty() {
            return transcript;
        }

        for segment in &mut transcript.segments {
            let mut rewritten = false;
            for line in &mut segment.lines {
                for hint in &self.compounds {
                    rewritten |= join_matches(&mut line.words, hint);
                }
            }
            if rewritten {
                segment.prune_empty_words();
            }
        }
        transcript
    }
}

/// Find runs of words matching the hint's parts and collapse each run
/// into its first token. Returns true if anything was rewritten.
fn join_matches(
    words: &mut [crate::transcript::word_token::WordToken],
    hint: &CompoundHint,
) -> bool {
    let n = hint.parts.len();
    if words.len() < n {
        return false;
    }

    let mut rewritten = false;
    let mut i = 0;
    while i + n <= words.len() {
        let matches = (0..n).all(|k| {
            let text = words[i + k].text.to_lowercase();
            text.trim_matches(|c: char| c.is_ascii_punctuation()) == hint.parts[k]
        });
        if matches {
            log::debug!(
                "Vocabulary correction: rejoining split compound as '{}'",
                hint.replacement
            );
            words[i].text = hint.replacement.clone();
            for k in 1..n {
                words[i + k].text.clear();
            }
            i += n;
            rewritten = true;
        } else {
            i += 1;
        }
    }
    rewritten
}
