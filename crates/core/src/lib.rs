//! Word-level-timestamped speech transcription with hallucination
//! suppression: voice-activity-aware chunking, duration-tuned decoding,
//! model fallback chains, overlap merging and post-hoc text filtering.

pub mod audio;
pub mod filtering;
pub mod pipeline;
pub mod recognition;
pub mod shared;
pub mod transcript;
pub mod vad;
