use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::audio::domain::audio_reader::AudioReader;
use crate::filtering::hallucination_filter::HallucinationFilter;
use crate::pipeline::chunk_executor::ChunkExecutor;
use crate::pipeline::chunk_merger::ChunkMerger;
use crate::pipeline::chunk_planner::ChunkPlanner;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::tuning_profile::TuningProfile;
use crate::recognition::domain::model::WhisperModel;
use crate::recognition::domain::model_selector::ModelSelector;
use crate::recognition::domain::prompt_builder::build_prompt;
use crate::recognition::domain::speech_recognizer::{
    load_with_chain, DecodingRequest, RecognizerFactory,
};
use crate::shared::constants::PIPELINE_SAMPLE_RATE;
use crate::shared::time_span::TimeSpan;
use crate::transcript::transcript::Transcript;
use crate::transcript::vocabulary_corrector::VocabularyCorrector;
use crate::vad::domain::voice_activity::{detect_with_fallback, VoiceActivityDetector};

/// How the tuning profile for a request is chosen.
#[derive(Clone, Debug, Default)]
pub enum TuningSelection {
    /// Derive from the measured audio duration.
    #[default]
    Auto,
    /// Use a named preset; unknown names fall back to `balanced`.
    Preset(String),
    /// Use the given profile verbatim, no duration-based override.
    Custom(TuningProfile),
}

/// Everything a caller can specify for one transcription.
#[derive(Clone, Debug)]
pub struct TranscriptionRequest {
    pub model: WhisperModel,
    pub language: Option<String>,
    pub prompt_text: Option<String>,
    pub vocabulary_hints: Vec<String>,
    pub tuning: TuningSelection,
}

impl Default for TranscriptionRequest {
    fn default() -> Self {
        Self {
            model: WhisperModel::Medium,
            language: None,
            prompt_text: None,
            vocabulary_hints: Vec::new(),
            tuning: TuningSelection::Auto,
        }
    }
}

/// Orchestrates the full anti-hallucination transcription pipeline:
/// profile resolution → VAD → chunk planning → model selection → chunked
/// decoding → overlap merging → vocabulary correction → hallucination
/// filtering.
pub struct TranscribeUseCase {
    reader: Box<dyn AudioReader>,
    factory: Box<dyn RecognizerFactory>,
    vad_detectors: Vec<Box<dyn VoiceActivityDetector>>,
    executor: Box<dyn ChunkExecutor>,
    logger: Box<dyn PipelineLogger>,
    cancelled: Arc<AtomicBool>,
}

impl TranscribeUseCase {
    pub fn new(
        reader: Box<dyn AudioReader>,
        factory: Box<dyn RecognizerFactory>,
        vad_detectors: Vec<Box<dyn VoiceActivityDetector>>,
        executor: Box<dyn ChunkExecutor>,
        logger: Box<dyn PipelineLogger>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            reader,
            factory,
            vad_detectors,
            executor,
            logger,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn run(
        &mut self,
        audio_path: &Path,
        request: &TranscriptionRequest,
    ) -> Result<Transcript, Box<dyn std::error::Error>> {
        let duration = self.reader.duration(audio_path)?;

        let profile = match &request.tuning {
            TuningSelection::Custom(profile) => profile.clone(),
            TuningSelection::Preset(name) => TuningProfile::from_preset_name(name),
            TuningSelection::Auto => TuningProfile::for_duration(duration),
        };
        profile.log_configuration(duration);

        // 1. Plan the chunks, using VAD only when chunking is active
        let plans = if profile.should_chunk(duration) {
            let intervals = if profile.enable_vad {
                self.detect_speech(audio_path, duration)
            } else {
                vec![TimeSpan::new(0.0, duration)]
            };
            self.logger.metric("speech_intervals", intervals.len() as f64);
            ChunkPlanner::plan(&intervals, duration, &profile)
        } else {
            ChunkPlanner::plan(&[], duration, &profile)
        };

        if plans.is_empty() {
            log::warn!("No audio to transcribe in {}", audio_path.display());
            return Ok(Transcript::default());
        }
        self.logger
            .info(&format!("Planned {} chunks for {duration:.1}s of audio", plans.len()));

        // 2. Select and load the engine, walking the fallback chain
        let selector = ModelSelector::new(&profile);
        let target = selector.select(request.model, duration);
        let (active_model, mut recognizer) =
            load_with_chain(&*self.factory, &selector.chain(target))?;
        self.logger.info(&format!("Model ready: {active_model}"));

        // 3. Decode every chunk with duration-tuned parameters
        let decoding = DecodingRequest {
            language: request.language.clone(),
            initial_prompt: build_prompt(
                request.prompt_text.as_deref(),
                &request.vocabulary_hints,
            ),
            params: profile.decoding_params(duration),
        };

        let results = self.executor.execute(
            audio_path,
            &plans,
            &*self.reader,
            recognizer.as_mut(),
            &decoding,
            self.logger.as_mut(),
            &self.cancelled,
        );

        // 4. Merge, correct, filter
        let merged = ChunkMerger::merge(results, &plans);
        let corrected = VocabularyCorrector::new(&request.vocabulary_hints).apply(merged);
        let filtered = HallucinationFilter::from_profile(&profile).apply(corrected);

        if filtered.is_empty() {
            log::warn!("No speech detected in {}", audio_path.display());
        }
        self.logger.summary(duration);

        Ok(filtered)
    }

    /// VAD never fails past this point: detector errors fall back down
    /// the chain, and an exhausted chain degrades to one full-clip
    /// interval inside `detect_with_fallback`.
    fn detect_speech(&mut self, audio_path: &Path, duration: f64) -> Vec<TimeSpan> {
        let audio = match self
            .reader
            .read_span(audio_path, TimeSpan::new(0.0, duration), PIPELINE_SAMPLE_RATE)
        {
            Ok(Some(audio)) => audio,
            Ok(None) => {
                log::warn!("No audio track for VAD; treating the whole clip as speech");
                return vec![TimeSpan::new(0.0, duration)];
            }
            Err(e) => {
                log::warn!("Audio read for VAD failed: {e}; treating the whole clip as speech");
                return vec![TimeSpan::new(0.0, duration)];
            }
        };

        detect_with_fallback(&mut self.vad_detectors, &audio)
    }
}
