use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::recognition::domain::model::WhisperModel;
use crate::recognition::domain::speech_recognizer::{
    DecodingRequest, ModelLoadError, RawSegment, RawWord, RecognizerFactory, SpeechRecognizer,
};
use crate::shared::model_resolver;
use crate::shared::time_span::TimeSpan;

/// Loads whisper.cpp engines, resolving ggml weights through the model
/// cache on first use.
pub struct WhisperRecognizerFactory;

impl RecognizerFactory for WhisperRecognizerFactory {
    fn load(&self, model: WhisperModel) -> Result<Box<dyn SpeechRecognizer>, ModelLoadError> {
        let path = model_resolver::resolve(model.file_name(), &model.download_url(), None)
            .map_err(|e| ModelLoadError::Resolve { model, source: e })?;

        let path_str = path.to_str().ok_or_else(|| ModelLoadError::Load {
            model,
            message: format!("model path is not valid UTF-8: {}", path.display()),
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| ModelLoadError::Load {
                model,
                message: e.to_string(),
            })?;

        Ok(Box::new(WhisperRecognizer { ctx }))
    }
}

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// Decoding runs with temperature 0 and without conditioning on previous
/// text, which measurably reduces repetition loops on long inputs.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(
        &mut self,
        audio: &AudioSegment,
        request: &DecodingRequest,
    ) -> Result<Vec<RawSegment>, Box<dyn std::error::Error>> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let language = request.language.as_deref();
        let prompt = request.initial_prompt.as_deref();

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        params.set_language(language);
        params.set_translate(false);
        params.set_token_timestamps(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(4) as i32);
        params.set_temperature(0.0);
        params.set_no_context(true);
        params.set_suppress_blank(true);
        // entropy_thold is whisper.cpp's compression-ratio analog
        params.set_entropy_thold(request.params.compression_ratio_threshold as f32);
        params.set_logprob_thold(request.params.log_prob_threshold as f32);
        params.set_no_speech_thold(request.params.no_speech_threshold as f32);
        if let Some(text) = prompt {
            params.set_initial_prompt(text);
        }

        state
            .full(params, audio.samples())
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut segments = Vec::new();
        let num_segments = state.full_n_segments();

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let seg_span = TimeSpan::new(
                segment.start_timestamp() as f64 / 100.0,
                segment.end_timestamp() as f64 / 100.0,
            );

            // Aggregate whisper's subword tokens into words. A token with
            // leading whitespace starts a new word; other tokens (suffixes,
            // punctuation) extend the current one.
            let mut words: Vec<RawWord> = Vec::new();
            let n_tokens = segment.n_tokens();
            for tok_idx in 0..n_tokens {
                let token = match segment.get_token(tok_idx) {
                    Some(t) => t,
                    None => continue,
                };

                let text = match token.to_str() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                // Skip special tokens (start with [, like [_BEG_], [_SOT_], etc.)
                let trimmed = text.trim();
                if trimmed.is_empty() || trimmed.starts_with('[') || trimmed.starts_with('<') {
                    continue;
                }

                let token_data = token.token_data();
                // Token timestamps are in centiseconds (10ms units)
                let start_time = token_data.t0 as f64 / 100.0;
                let end_time = token_data.t1 as f64 / 100.0;
                if end_time < start_time {
                    continue;
                }

                let starts_word = text.starts_with(char::is_whitespace) || words.is_empty();
                if starts_word {
                    words.push(RawWord {
                        text: trimmed.to_string(),
                        span: TimeSpan::new(start_time, end_time),
                    });
                } else if let Some(last) = words.last_mut() {
                    last.text.push_str(trimmed);
                    last.span.end = last.span.end.max(end_time);
                }
            }

            let text = words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            segments.push(RawSegment {
                text,
                span: seg_span,
                words,
            });
        }

        Ok(segments)
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
