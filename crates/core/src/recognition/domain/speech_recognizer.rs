use thiserror::Error;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::recognition::domain::model::WhisperModel;
use crate::shared::model_resolver::ModelResolveError;
use crate::shared::time_span::TimeSpan;

/// Decoding thresholds tuned per request duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodingParams {
    pub compression_ratio_threshold: f64,
    pub log_prob_threshold: f64,
    pub no_speech_threshold: f64,
}

/// Everything the engine needs for one chunk besides the audio itself.
#[derive(Clone, Debug)]
pub struct DecodingRequest {
    pub language: Option<String>,
    pub initial_prompt: Option<String>,
    pub params: DecodingParams,
}

/// One word as reported by the engine, times relative to the chunk start.
#[derive(Clone, Debug, PartialEq)]
pub struct RawWord {
    pub text: String,
    pub span: TimeSpan,
}

/// One engine segment with its word-level timestamps, times relative to
/// the chunk start.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSegment {
    pub text: String,
    pub span: TimeSpan,
    pub words: Vec<RawWord>,
}

/// Domain interface for the speech-recognition engine.
///
/// Implementations decode one audio span at a time; they are not assumed
/// to be safe for concurrent decoding, hence `&mut self`.
pub trait SpeechRecognizer: Send {
    fn transcribe(
        &mut self,
        audio: &AudioSegment,
        request: &DecodingRequest,
    ) -> Result<Vec<RawSegment>, Box<dyn std::error::Error>>;
}

/// Loads recognition engines by model tier. Load failures are typed so
/// they stay distinguishable from decode failures.
pub trait RecognizerFactory: Send {
    fn load(&self, model: WhisperModel) -> Result<Box<dyn SpeechRecognizer>, ModelLoadError>;
}

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("failed to resolve weights for {model}: {source}")]
    Resolve {
        model: WhisperModel,
        #[source]
        source: ModelResolveError,
    },
    #[error("failed to load model {model}: {message}")]
    Load { model: WhisperModel, message: String },
    #[error("all models in fallback chain {chain:?} failed: {source}")]
    ChainExhausted {
        chain: Vec<WhisperModel>,
        #[source]
        source: Box<ModelLoadError>,
    },
}

/// Walk a fallback chain until a model loads. Returns the active model
/// alongside the engine; errors only when the entire chain is exhausted.
pub fn load_with_chain(
    factory: &dyn RecognizerFactory,
    chain: &[WhisperModel],
) -> Result<(WhisperModel, Box<dyn SpeechRecognizer>), ModelLoadError> {
    let mut last_error: Option<ModelLoadError> = None;

    for model in chain {
        log::debug!("Attempting to load model: {model}");
        match factory.load(*model) {
            Ok(recognizer) => {
                if *model != chain[0] {
                    log::info!("Using fallback model {model} instead of {}", chain[0]);
                }
                return Ok((*model, recognizer));
            }
            Err(e) => {
                log::warn!("Failed to load model {model}: {e}");
                last_error = Some(e);
            }
        }
    }

    Err(ModelLoadError::ChainExhausted {
        chain: chain.to_vec(),
        source: Box::new(last_error.unwrap_or(ModelLoadError::Load {
            model: WhisperModel::Tiny,
            message: "empty fallback chain".to_string(),
        })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NullRecognizer;

    impl SpeechRecognizer for NullRecognizer {
        fn transcribe(
            &mut self,
            _: &AudioSegment,
            _: &DecodingRequest,
        ) -> Result<Vec<RawSegment>, Box<dyn std::error::Error>> {
            Ok(Vec::new())
        }
    }

    /// Factory failing every model except those in `succeeds`.
    struct SelectiveFactory {
        succeeds: Vec<WhisperModel>,
        attempts: Arc<AtomicUsize>,
    }

    impl RecognizerFactory for SelectiveFactory {
        fn load(
            &self,
            model: WhisperModel,
        ) -> Result<Box<dyn SpeechRecognizer>, ModelLoadError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.succeeds.contains(&model) {
                Ok(Box::new(NullRecognizer))
            } else {
                Err(ModelLoadError::Load {
                    model,
                    message: "weights unavailable".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_first_model_loads_without_fallback() {
        let factory = SelectiveFactory {
            succeeds: vec![WhisperModel::Medium],
            attempts: Arc::new(AtomicUsize::new(0)),
        };
        let attempts = factory.attempts.clone();
        let (model, _) =
            load_with_chain(&factory, &WhisperModel::Medium.fallback_chain()).unwrap();
        assert_eq!(model, WhisperModel::Medium);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_only_last_entry_succeeds_after_three_failed_attempts() {
        // 4-entry chain where only the final entry loads
        let chain = WhisperModel::LargeV3.fallback_chain();
        assert_eq!(chain.len(), 4);

        let factory = SelectiveFactory {
            succeeds: vec![WhisperModel::Medium],
            attempts: Arc::new(AtomicUsize::new(0)),
        };
        let attempts = factory.attempts.clone();

        let (model, _) = load_with_chain(&factory, &chain).unwrap();
        assert_eq!(model, WhisperModel::Medium);
        // 3 failed fallback attempts before the final success
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_exhausted_chain_reports_chain_and_last_cause() {
        let factory = SelectiveFactory {
            succeeds: vec![],
            attempts: Arc::new(AtomicUsize::new(0)),
        };
        let chain = WhisperModel::Medium.fallback_chain();
        let err = load_with_chain(&factory, &chain).unwrap_err();
        match err {
            ModelLoadError::ChainExhausted { chain: c, source } => {
                assert_eq!(c, chain);
                assert!(matches!(
                    *source,
                    ModelLoadError::Load {
                        model: WhisperModel::Base,
                        ..
                    }
                ));
            }
            other => panic!("expected ChainExhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_error_display_names_chain() {
        let err = ModelLoadError::ChainExhausted {
            chain: vec![WhisperModel::Medium, WhisperModel::Base],
            source: Box::new(ModelLoadError::Load {
                model: WhisperModel::Base,
                message: "no disk space".to_string(),
            }),
        };
        let text = err.to_string();
        assert!(text.contains("Medium"));
        assert!(text.contains("no disk space"));
    }
}
