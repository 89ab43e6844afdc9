pub mod compression_ratio;
pub mod detector;
pub mod exact_repetition;
pub mod hallucination_filter;
pub mod known_phrases;
pub mod looping_pattern;
pub mod semantic_similarity;
