use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;
use crate::pipeline::chunk_executor::{materialize_segments, ChunkExecutor, ChunkResult};
use crate::pipeline::chunk_planner::AudioChunkPlan;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::recognition::domain::speech_recognizer::{DecodingRequest, SpeechRecognizer};
use crate::shared::constants::PIPELINE_SAMPLE_RATE;

const DEFAULT_CHANNEL_CAPACITY: usize = 2;

/// One extracted chunk in flight between the reader thread and the
/// decoding loop.
struct Extracted {
    index: usize,
    offset: f64,
    extract_ms: f64,
    result: Result<Option<AudioSegment>, String>,
}

/// Executes chunk work with a dedicated extraction thread.
///
/// Layout: `extract → bounded channel → decode (serial)`.
///
/// Extraction overlaps decoding, but decoding itself stays serial: the
/// recognition engine is not assumed to be safe for concurrent use.
/// Cancellation is checked at chunk boundaries on both sides.
pub struct ThreadedChunkExecutor {
    channel_capacity: usize,
}

impl ThreadedChunkExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for ThreadedChunkExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkExecutor for ThreadedChunkExecutor {
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
    ) -> Vec<ChunkResult> {
        let total = plans.len();
        let (tx, rx) = crossbeam_channel::bounded::<Extracted>(self.channel_capacity);

        std::thread::scope(|scope| {
            let producer_cancelled = cancelled.clone();
            scope.spawn(move || {
                for plan in plans {
                    if producer_cancelled.load(Ordering::Relaxed) {
                        break;
                    }
                    let started = Instant::now();
                    let result = reader
                        .read_span(audio_path, plan.span, PIPELINE_SAMPLE_RATE)
                        .map_err(|e| e.to_string());
                    let message = Extracted {
                        index: plan.index,
                        offset: plan.span.start,
                        extract_ms: started.elapsed().as_secs_f64() * 1000.0,
                        result,
                    };
                    if tx.send(message).is_err() {
                        break;
                    }
                }
                drop(tx);
            });

            let mut results = Vec::with_capacity(total);
            let mut processed = 0usize;

            for extracted in rx {
                if cancelled.load(Ordering::Relaxed) {
                    break;
                }
                processed += 1;
                logger.progress(processed, total);
                logger.timing("extract", extracted.extract_ms);

                let audio = match extracted.result {
                    Ok(Some(audio)) if !audio.is_empty() => audio,
                    Ok(_) => {
                        log::warn!(
                            "Chunk {} produced no audio samples, skipping",
                            extracted.index
                        );
                        continue;
                    }
                    Err(e) => {
                        log::warn!("Failed to extract chunk {}: {e}", extracted.index);
                        continue;
                    }
                };

                let started = Instant::now();
                match recognizer.transcribe(&audio, request) {
                    Ok(raw) => {
                        logger.timing("decode", started.elapsed().as_secs_f64() * 1000.0);
                        let segments = materialize_segments(raw, extracted.offset);
                        logger.metric("segments_per_chunk", segments.len() as f64);
                        results.push(ChunkResult {
                            index: extracted.index,
                            segments,
                        });
                    }
                    Err(e) => {
                        log::warn!("Failed to transcribe chunk {}: {e}", extracted.index);
                    }
                }
                // Chunk audio buffer dropped here, success or not
            }

            results
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::recognition::domain::speech_recognizer::{
        DecodingParams, RawSegment, RawWord,
    };
    use crate::shared::time_span::TimeSpan;
    use std::sync::Mutex;

    /// Reader producing one second of silence per requested span.
    struct StubReader {
        fail_spans_starting_at: Vec<f64>,
        requested: Arc<Mutex<Vec<TimeSpan>>>,
    }

    impl AudioReader for StubReader {
        fn duration(&self, _: &Path) -> Result<f64, Box<dyn std::error::Error>> {
            Ok(60.0)
        }

        fn read_span(
            &self,
            _: &Path,
            span: TimeSpan,
            sample_rate: u32,
        ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
            self.requested.lock().unwrap().push(span);
            if self
                .fail_spans_starting_at
                .iter()
                .any(|s| (s - span.start).abs() < 1e-9)
            {
                return Err("decode failed".into());
            }
            let len = (span.duration() * sample_rate as f64) as usize;
            Ok(Some(AudioSegment::new(vec![0.1; len], sample_rate, 1)))
        }
    }

    /// Recognizer returning one chunk-relative segment per call.
    struct StubRecognizer {
        fail: bool,
    }

    impl SpeechRecognizer for StubRecognizer {
        fn transcribe(
            &mut self,
            _: &AudioSegment,
            _: &DecodingRequest,
        ) -> Result<Vec<RawSegment>, Box<dyn std::error::Error>> {
            if self.fail {
                return Err("inference failed".into());
            }
            Ok(vec![RawSegment {
                text: "word".to_string(),
                span: TimeSpan::new(0.0, 1.0),
                words: vec![RawWord {
                    text: "word".to_string(),
                    span: TimeSpan::new(0.2, 0.8),
                }],
            }])
        }
    }

    fn plans(spans: &[(f64, f64)]) -> Vec<AudioChunkPlan> {
        spans
            .iter()
            .enumerate()
            .map(|(index, (s, e))| AudioChunkPlan {
                span: TimeSpan::new(*s, *e),
                index,
            })
            .collect()
    }

    fn request() -> DecodingRequest {
        DecodingRequest {
            language: None,
            initial_prompt: None,
            params: DecodingParams {
                compression_ratio_threshold: 2.4,
                log_prob_threshold: -1.0,
                no_speech_threshold: 0.6,
            },
        }
    }

    #[test]
    fn test_all_chunks_decoded_and_shifted() {
        let reader = StubReader {
            fail_spans_starting_at: vec![],
            requested: Arc::new(Mutex::new(Vec::new())),
        };
        let mut recognizer = StubRecognizer { fail: false };
        let executor = ThreadedChunkExecutor::new();
        let plans = plans(&[(0.0, 30.0), (28.0, 58.0)]);

        let results = executor.execute(
            Path::new("audio.wav"),
            &plans,
            &reader,
            &mut recognizer,
            &request(),
            &mut NullPipelineLogger,
            &Arc::new(AtomicBool::new(false)),
        );

        assert_eq!(results.len(), 2);
        let second = results.iter().find(|r| r.index == 1).unwrap();
        // Chunk-relative word at 0.2s shifted by the chunk start 28.0
        let word_start = second.segments[0].words().next().unwrap().span.start;
        assert!((word_start - 28.2).abs() < 1e-9);
    }

    #[test]
    fn test_failed_extraction_skips_only_that_chunk() {
        let reader = StubReader {
            fail_spans_starting_at: vec![28.0],
            requested: Arc::new(Mutex::new(Vec::new())),
        };
        let mut recognizer = StubRecognizer { fail: false };
        let executor = ThreadedChunkExecutor::new();
        let plans = plans(&[(0.0, 30.0), (28.0, 58.0), (56.0, 86.0)]);

        let results = executor.execute(
            Path::new("audio.wav"),
            &plans,
            &reader,
            &mut recognizer,
            &request(),
            &mut NullPipelineLogger,
            &Arc::new(AtomicBool::new(false)),
        );

        let indices: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_failed_decoding_never_aborts_run() {
        let reader = StubReader {
            fail_spans_starting_at: vec![],
            requested: Arc::new(Mutex::new(Vec::new())),
        };
        let mut recognizer = StubRecognizer { fail: true };
        let executor = ThreadedChunkExecutor::new();
        let plans = plans(&[(0.0, 30.0), (28.0, 58.0)]);

        let results = executor.execute(
            Path::new("audio.wav"),
            &plans,
            &reader,
            &mut recognizer,
            &request(),
            &mut NullPipelineLogger,
            &Arc::new(AtomicBool::new(false)),
        );

        assert!(results.is_empty());
    }

    #[test]
    fn test_cancellation_stops_before_first_chunk() {
        let reader = StubReader {
            fail_spans_starting_at: vec![],
            requested: Arc::new(Mutex::new(Vec::new())),
        };
        let mut recognizer = StubRecognizer { fail: false };
        let executor = ThreadedChunkExecutor::new();
        let plans = plans(&[(0.0, 30.0), (28.0, 58.0)]);

        let results = executor.execute(
            Path::new("audio.wav"),
            &plans,
            &reader,
            &mut recognizer,
            &request(),
            &mut NullPipelineLogger,
            &Arc::new(AtomicBool::new(true)),
        );

        assert!(results.is_empty());
    }

    #[test]
    fn test_every_plan_span_requested() {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let reader = StubReader {
            fail_spans_starting_at: vec![],
            requested: requested.clone(),
        };
        let mut recognizer = StubRecognizer { fail: false };
        let executor = ThreadedChunkExecutor::new();
        let plans = plans(&[(0.0, 30.0), (28.0, 58.0), (56.0, 60.0)]);

        executor.execute(
            Path::new("audio.wav"),
            &plans,
            &reader,
            &mut recognizer,
            &request(),
            &mut NullPipelineLogger,
            &Arc::new(AtomicBool::new(false)),
        );

        assert_eq!(requested.lock().unwrap().len(), 3);
    }
}
