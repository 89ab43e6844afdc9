/// Builds the initial prompt used to prime the engine's vocabulary.
///
/// Whisper truncates prompts past 244 tokens; the caps here stay
/// conservatively below that using a word-count estimate.
const MAX_HINTS: usize = 15;
const REDUCED_HINTS: usize = 8;
const MAX_PROMPT_WORDS: usize = 200;

pub fn build_prompt(prompt_text: Option<&str>, vocabulary_hints: &[String]) -> Option<String> {
    let base = prompt_text.map(str::trim).filter(|p| !p.is_empty());

    if vocabulary_hints.is_empty() {
        return base.map(str::to_string);
    }

    let prompt = compose(base, vocabulary_hints, MAX_HINTS);
    if prompt.split_whitespace().count() > MAX_PROMPT_WORDS {
        Some(compose(base, vocabulary_hints, REDUCED_HINTS))
    } else {
        Some(prompt)
    }
}

fn compose(base: Option<&str>, hints: &[String], max_hints: usize) -> String {
    let examples = hints
        .iter()
        .take(max_hints)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match base {
        Some(text) => format!("{text} Vocabulary: {examples}."),
        None => format!("Vocabulary: {examples}."),
    }
}
