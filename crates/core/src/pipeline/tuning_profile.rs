use crate::recognition::domain::speech_recognizer::DecodingParams;

/// The full set of thresholds and chunk geometry governing one
/// transcription request.
///
/// Constructed once (named preset, duration-derived, or supplied
/// verbatim) and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct TuningProfile {
    // Voice activity detection
    pub enable_vad: bool,

    // Chunk geometry (seconds)
    pub chunk_length: f64,
    pub overlap: f64,
    pub min_chunk_duration: f64,
    /// Chunking activates for audio longer than this.
    pub chunking_threshold: f64,

    // Engine decoding thresholds
    pub adaptive_thresholds: bool,
    pub compression_ratio_base: f64,
    pub log_prob_base: f64,
    pub no_speech_base: f64,

    // Model selection
    pub auto_model_selection: bool,
    pub prefer_stable_for_long: bool,

    // Post-hoc filters
    pub enable_repetition_filter: bool,
    pub enable_compression_filter: bool,
    pub enable_semantic_filter: bool,
    pub enable_looping_filter: bool,
    pub enable_known_phrase_filter: bool,
    pub semantic_similarity_threshold: f64,
    pub compression_ratio_threshold: f64,
    pub max_consecutive_repetitions: usize,
}

impl Default for TuningProfile {
    fn default() -> Self {
        Self::balanced()
    }
}

impl TuningProfile {
    /// Good quality with reasonable processing cost.
    pub fn balanced() -> Self {
        Self {
            enable_vad: true,
            chunk_length: 30.0,
            overlap: 2.0,
            min_chunk_duration: 5.0,
            chunking_threshold: 90.0,
            adaptive_thresholds: true,
            compression_ratio_base: 2.4,
            log_prob_base: -1.0,
            no_speech_base: 0.6,
            auto_model_selection: true,
            prefer_stable_for_long: true,
            enable_repetition_filter: true,
            enable_compression_filter: true,
            enable_semantic_filter: true,
            enable_looping_filter: true,
            enable_known_phrase_filter: true,
            semantic_similarity_threshold: 0.8,
            compression_ratio_threshold: 4.0,
            max_consecutive_repetitions: 2,
        }
    }

    /// Best output for important content, regardless of processing time.
    pub fn maximum_quality() -> Self {
        Self {
            chunk_length: 20.0,
            overlap: 3.0,
            compression_ratio_base: 2.0,
            log_prob_base: -0.7,
            no_speech_base: 0.75,
            semantic_similarity_threshold: 0.75,
            compression_ratio_threshold: 3.0,
            max_consecutive_repetitions: 1,
            ..Self::balanced()
        }
    }

    /// Speed over quality: no VAD, long chunks, fixed thresholds.
    pub fn fast_processing() -> Self {
        Self {
            enable_vad: false,
            chunk_length: 60.0,
            overlap: 1.0,
            adaptive_thresholds: false,
            auto_model_selection: false,
            enable_semantic_filter: false,
            enable_looping_filter: false,
            chunking_threshold: 300.0,
            ..Self::balanced()
        }
    }

    /// Long-form speech: chunk early, filter repetition hard.
    pub fn podcasts() -> Self {
        Self {
            chunk_length: 45.0,
            overlap: 3.0,
            compression_ratio_base: 2.2,
            log_prob_base: -0.8,
            no_speech_base: 0.65,
            chunking_threshold: 60.0,
            max_consecutive_repetitions: 1,
            ..Self::balanced()
        }
    }

    /// Short-form clips: hallucinations are rare, keep the fixed cost low.
    pub fn short_videos() -> Self {
        Self {
            enable_vad: false,
            chunk_length: 30.0,
            overlap: 1.0,
            adaptive_thresholds: false,
            auto_model_selection: false,
            chunking_threshold: 120.0,
            enable_semantic_filter: false,
            enable_looping_filter: false,
            ..Self::balanced()
        }
    }

    /// Look up a preset by name. Unknown names fail soft: a warning is
    /// logged and `balanced` is used.
    pub fn from_preset_name(name: &str) -> Self {
        match name {
            "maximum_quality" => Self::maximum_quality(),
            "balanced" => Self::balanced(),
            "fast_processing" => Self::fast_processing(),
            "podcasts" => Self::podcasts(),
            "short_videos" => Self::short_videos(),
            other => {
                log::warn!("Unknown preset '{other}', using balanced configuration");
                Self::balanced()
            }
        }
    }

    /// Derive a profile from the measured audio duration. Longer audio
    /// gets shorter chunks, more overlap and more aggressive filtering.
    pub fn for_duration(duration: f64) -> Self {
        if duration > 300.0 {
            Self {
                chunk_length: 25.0,
                overlap: 3.0,
                compression_ratio_base: 2.1,
                log_prob_base: -0.8,
                no_speech_base: 0.7,
                compression_ratio_threshold: 3.5,
                semantic_similarity_threshold: 0.75,
                max_consecutive_repetitions: 1,
                ..Self::balanced()
            }
        } else if duration > 120.0 {
            Self {
                chunk_length: 30.0,
                overlap: 2.0,
                compression_ratio_base: 2.2,
                log_prob_base: -0.9,
                no_speech_base: 0.65,
                compression_ratio_threshold: 3.8,
                ..Self::balanced()
            }
        } else if duration > 60.0 {
            Self {
                chunk_length: 45.0,
                overlap: 2.0,
                compression_ratio_base: 2.3,
                log_prob_base: -0.95,
                no_speech_base: 0.62,
                prefer_stable_for_long: false,
                ..Self::balanced()
            }
        } else {
            // Short clips rarely hallucinate; the fixed cost of VAD and
            // pairwise similarity isn't worth it.
            Self {
                enable_vad: false,
                chunk_length: 60.0,
                overlap: 1.0,
                adaptive_thresholds: false,
                chunking_threshold: 120.0,
                prefer_stable_for_long: false,
                enable_semantic_filter: false,
                max_consecutive_repetitions: 3,
                ..Self::balanced()
            }
        }
    }

    pub fn should_chunk(&self, duration: f64) -> bool {
        duration > self.chunking_threshold
    }

    /// Engine decoding thresholds for the given duration. With adaptive
    /// thresholds on, longer audio is decoded more strictly.
    pub fn decoding_params(&self, duration: f64) -> DecodingParams {
        let (compression_offset, log_prob_offset, no_speech_offset) =
            if self.adaptive_thresholds && duration > 300.0 {
                (-0.3, 0.2, 0.1)
            } else if self.adaptive_thresholds && duration > 120.0 {
                (-0.2, 0.1, 0.05)
            } else {
                (0.0, 0.0, 0.0)
            };

        DecodingParams {
            compression_ratio_threshold: self.compression_ratio_base + compression_offset,
            log_prob_threshold: self.log_prob_base + log_prob_offset,
            no_speech_threshold: self.no_speech_base + no_speech_offset,
        }
    }

    pub fn log_configuration(&self, duration: f64) {
        log::info!("Tuning profile for {duration:.1}s of audio:");
        log::info!("  VAD: {}", self.enable_vad);
        log::info!(
            "  Chunking: {} (chunk_length={}s, overlap={}s)",
            self.should_chunk(duration),
            self.chunk_length,
            self.overlap
        );
        let params = self.decoding_params(duration);
        log::info!(
            "  Decoding thresholds: compression_ratio={:.2}, log_prob={:.2}, no_speech={:.2}",
            params.compression_ratio_threshold,
            params.log_prob_threshold,
            params.no_speech_threshold
        );
        log::info!(
            "  Filters: repetition={}, compression={}, semantic={}, looping={}, phrases={}",
            self.enable_repetition_filter,
            self.enable_compression_filter,
            self.enable_semantic_filter,
            self.enable_looping_filter,
            self.enable_known_phrase_filter
        );
    }
}
