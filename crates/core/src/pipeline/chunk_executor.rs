use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::audio::domain::audio_reader::AudioReader;
use crate::pipeline::chunk_planner::AudioChunkPlan;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::recognition::domain::speech_recognizer::{DecodingRequest, RawSegment, SpeechRecognizer};
use crate::transcript::segment::{Line, TranscriptSegment};
use crate::transcript::word_token::WordToken;

/// Per-chunk output tagged with the originating plan index, so temporal
/// order is reconstructable regardless of completion order.
#[derive(Clone, Debug)]
pub struct ChunkResult {
    pub index: usize,
    pub segments: Vec<TranscriptSegment>,
}

/// Abstracts how planned chunks are extracted and decoded.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations; the shipped one overlaps extraction with
/// serial decoding. Chunk failures are recoverable by contract: a chunk
/// that errors is logged and skipped, never fatal, so `execute` returns
/// only the successful results.
pub trait ChunkExecutor: Send {
    #[allow(clippy::too_many_arguments)]
    fn execute(
        &self,
        audio_path: &Path,
        plans: &[AudioChunkPlan],
        reader: &dyn AudioReader,
        recognizer: &mut dyn SpeechRecognizer,
        request: &DecodingRequest,
        logger: &mut dyn PipelineLogger,
        cancelled: &Arc<AtomicBool>,
    ) -> Vec<ChunkResult>;
}

/// Shift engine output from chunk-relative to global time and widen
/// degenerate zero-length spans.
pub fn materialize_segments(raw: Vec<RawSegment>, offset: f64) -> Vec<TranscriptSegment> {
    raw.into_iter()
        .map(|segment| {
            let words = segment
                .words
                .into_iter()
                .filter(|w| !w.text.is_empty())
                .map(|w| WordToken::new(w.text, w.span.shifted(offset).widened_to_min()))
                .collect();
            let fallback = segment.span.shifted(offset).widened_to_min();
            TranscriptSegment::from_lines(vec![Line::new(words)], fallback)
        })
        .collect()
}
