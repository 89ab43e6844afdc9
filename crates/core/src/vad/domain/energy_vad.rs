use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::time_span::TimeSpan;
use crate::vad::domain::voice_activity::{merge_close_intervals, VoiceActivityDetector};

const WINDOW_SECONDS: f64 = 0.1;
const ENERGY_PERCENTILE: f64 = 0.30;
const MIN_INTERVAL_SECONDS: f64 = 0.3;
const MERGE_GAP_SECONDS: f64 = 1.0;

/// Deterministic energy-based voice activity detection.
///
/// Short-time energy in 100 ms windows, thresholded at the 30th
/// percentile of the energy distribution. Intervals under 0.3 s are
/// dropped and survivors closer than 1.0 s apart are merged.
pub struct EnergyVad;

impl VoiceActivityDetector for EnergyVad {
    fn detect(
        &mut self,
        audio: &AudioSegment,
    ) -> Result<Vec<TimeSpan>, Box<dyn std::error::Error>> {
        let samples = audio.samples();
        let window = (WINDOW_SECONDS * audio.sample_rate() as f64) as usize;
        if samples.len() < window || window == 0 {
            return Ok(Vec::new());
        }

        let energies: Vec<f64> = samples
            .chunks_exact(window)
            .map(|w| w.iter().map(|s| (*s as f64) * (*s as f64)).sum())
            .collect();

        let threshold = percentile(&energies, ENERGY_PERCENTILE);

        // Group consecutive above-threshold windows into raw intervals
        let mut raw: Vec<TimeSpan> = Vec::new();
        let mut start: Option<f64> = None;
        for (i, energy) in energies.iter().enumerate() {
            let time = i as f64 * WINDOW_SECONDS;
            if *energy > threshold {
                if start.is_none() {
                    start = Some(time);
                }
            } else if let Some(s) = start.take() {
                raw.push(TimeSpan::new(s, time));
            }
        }
        if let Some(s) = start {
            raw.push(TimeSpan::new(s, audio.duration()));
        }

        raw.retain(|i| i.duration() >= MIN_INTERVAL_SECONDS);
        Ok(merge_close_intervals(raw, MERGE_GAP_SECONDS))
    }

    fn name(&self) -> &'static str {
        "energy VAD"
    }
}

/// Linear-interpolated percentile of an unsorted sample, `q` in [0, 1].
fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}
