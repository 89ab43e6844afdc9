use std::path::Path;

use ndarray::{Array1, Array2, ArrayD};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::constants::VAD_MERGE_GAP;
use crate::shared::time_span::TimeSpan;
use crate::vad::domain::voice_activity::{merge_close_intervals, VoiceActivityDetector};

/// Samples per inference window at 16 kHz.
const WINDOW_SIZE: usize = 512;

pub const DEFAULT_SPEECH_THRESHOLD: f32 = 0.5;

/// Voice activity detection using the Silero VAD model via ONNX Runtime.
///
/// The model is recurrent: a state tensor of shape [2, 1, 128] is carried
/// across 512-sample windows and reset per clip.
pub struct SileroVad {
    session: ort::session::Session,
    state: ArrayD<f32>,
    sample_rate_tensor: ArrayD<i64>,
    threshold: f32,
}

impl SileroVad {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Silero VAD model not found at: {}", model_path.display()).into());
        }

        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        log::debug!("Silero VAD model loaded from {}", model_path.display());

        Ok(Self {
            session,
            state: ArrayD::zeros(vec![2, 1, 128]),
            sample_rate_tensor: Array1::from_vec(vec![16000i64]).into_dyn(),
            threshold: DEFAULT_SPEECH_THRESHOLD,
        })
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    fn reset_state(&mut self) {
        self.state = ArrayD::zeros(vec![2, 1, 128]);
    }

    /// Speech probability for one 512-sample window.
    fn window_probability(
        &mut self,
        window: &[f32; WINDOW_SIZE],
    ) -> Result<f32, Box<dyn std::error::Error>> {
        let frame = Array2::from_shape_vec((1, WINDOW_SIZE), window.to_vec())?.into_dyn();

        let (next_state, prob) = {
            let inputs = ort::inputs![
                "input" => ort::value::TensorRef::from_array_view(frame.view())?,
                "state" => ort::value::TensorRef::from_array_view(self.state.view())?,
                "sr" => ort::value::TensorRef::from_array_view(self.sample_rate_tensor.view())?,
            ];
            let outputs = self.session.run(inputs)?;

            let next_state = match outputs.get("stateN") {
                Some(state_out) => Some(state_out.try_extract_array::<f32>()?.to_owned()),
                None => None,
            };
            let prob = match outputs.get("output") {
                Some(output) => *output
                    .try_extract_array::<f32>()?
                    .iter()
                    .next()
                    .unwrap_or(&0.0),
                None => 0.0,
            };
            (next_state, prob)
        };

        if let Some(state) = next_state {
            self.state = state;
        }
        Ok(prob)
    }
}

impl VoiceActivityDetector for SileroVad {
    fn detect(
        &mut self,
        audio: &AudioSegment,
    ) -> Result<Vec<TimeSpan>, Box<dyn std::error::Error>> {
        self.reset_state();

        let samples = audio.samples();
        let sample_rate = audio.sample_rate() as f64;
        let window_seconds = WINDOW_SIZE as f64 / sample_rate;

        let mut intervals: Vec<TimeSpan> = Vec::new();
        let mut start: Option<f64> = None;
        let mut window = [0.0f32; WINDOW_SIZE];

        for (i, chunk) in samples.chunks(WINDOW_SIZE).enumerate() {
            window[..chunk.len()].copy_from_slice(chunk);
            window[chunk.len()..].fill(0.0);

            let prob = self.window_probability(&window)?;
            let time = i as f64 * window_seconds;

            if prob >= self.threshold {
                if start.is_none() {
                    start = Some(time);
                }
            } else if let Some(s) = start.take() {
                intervals.push(TimeSpan::new(s, time));
            }
        }
        if let Some(s) = start {
            intervals.push(TimeSpan::new(s, audio.duration()));
        }

        Ok(merge_close_intervals(intervals, VAD_MERGE_GAP))
    }

    fn name(&self) -> &'static str {
        "Silero VAD"
    }
}
