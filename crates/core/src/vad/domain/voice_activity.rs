use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::time_span::TimeSpan;

/// Domain interface for voice activity detection.
///
/// Implementations classify a mono 16 kHz signal into speech intervals.
/// An empty result is a valid answer ("no speech"); errors are reserved
/// for detectors that could not run at all.
pub trait VoiceActivityDetector: Send {
    fn detect(
        &mut self,
        audio: &AudioSegment,
    ) -> Result<Vec<TimeSpan>, Box<dyn std::error::Error>>;

    /// Short identifier used in fallback logging.
    fn name(&self) -> &'static str;
}

/// Merge intervals separated by a gap under `max_gap` seconds.
/// Input must be ordered by start time.
pub fn merge_close_intervals(intervals: Vec<TimeSpan>, max_gap: f64) -> Vec<TimeSpan> {
    let mut merged: Vec<TimeSpan> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start - last.end < max_gap => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Run detectors in order until one succeeds. VAD is advisory: if every
/// detector errors, the whole clip is treated as one speech interval, so
/// this never fails past the caller.
pub fn detect_with_fallback(
    detectors: &mut [Box<dyn VoiceActivityDetector>],
    audio: &AudioSegment,
) -> Vec<TimeSpan> {
    for detector in detectors.iter_mut() {
        match detector.detect(audio) {
            Ok(intervals) => {
                log::debug!(
                    "{} detected {} speech intervals",
                    detector.name(),
                    intervals.len()
                );
                return intervals;
            }
            Err(e) => {
                log::warn!("{} failed: {e}. Trying next detector.", detector.name());
            }
        }
    }

    let duration = audio.duration();
    log::warn!("All voice activity detectors failed; treating the whole clip as speech");
    if duration > 0.0 {
        vec![TimeSpan::new(0.0, duration)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct FixedDetector {
        intervals: Vec<TimeSpan>,
    }

    impl VoiceActivityDetector for FixedDetector {
        fn detect(
            &mut self,
            _: &AudioSegment,
        ) -> Result<Vec<TimeSpan>, Box<dyn std::error::Error>> {
            Ok(self.intervals.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingDetector;

    impl VoiceActivityDetector for FailingDetector {
        fn detect(
            &mut self,
            _: &AudioSegment,
        ) -> Result<Vec<TimeSpan>, Box<dyn std::error::Error>> {
            Err("model unavailable".into())
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn one_second_audio() -> AudioSegment {
        AudioSegment::new(vec![0.0; 16000], 16000, 1)
    }

    #[test]
    fn test_merge_close_intervals_merges_under_gap() {
        let merged = merge_close_intervals(
            vec![TimeSpan::new(0.0, 1.0), TimeSpan::new(1.3, 2.0)],
            0.5,
        );
        assert_eq!(merged.len(), 1);
        assert_relative_eq!(merged[0].start, 0.0);
        assert_relative_eq!(merged[0].end, 2.0);
    }

    #[test]
    fn test_merge_close_intervals_keeps_wide_gaps() {
        let merged = merge_close_intervals(
            vec![TimeSpan::new(0.0, 1.0), TimeSpan::new(2.0, 3.0)],
            0.5,
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_close_intervals_empty() {
        assert!(merge_close_intervals(vec![], 0.5).is_empty());
    }

    #[test]
    fn test_fallback_uses_first_successful_detector() {
        let mut detectors: Vec<Box<dyn VoiceActivityDetector>> = vec![
            Box::new(FailingDetector),
            Box::new(FixedDetector {
                intervals: vec![TimeSpan::new(0.1, 0.5)],
            }),
        ];
        let intervals = detect_with_fallback(&mut detectors, &one_second_audio());
        assert_eq!(intervals.len(), 1);
        assert_relative_eq!(intervals[0].start, 0.1);
    }

    #[test]
    fn test_fallback_degrades_to_full_clip() {
        let mut detectors: Vec<Box<dyn VoiceActivityDetector>> =
            vec![Box::new(FailingDetector), Box::new(FailingDetector)];
        let intervals = detect_with_fallback(&mut detectors, &one_second_audio());
        assert_eq!(intervals.len(), 1);
        assert_relative_eq!(intervals[0].start, 0.0);
        assert_relative_eq!(intervals[0].end, 1.0);
    }

    #[test]
    fn test_fallback_empty_result_is_valid() {
        let mut detectors: Vec<Box<dyn VoiceActivityDetector>> = vec![Box::new(FixedDetector {
            intervals: vec![],
        })];
        let intervals = detect_with_fallback(&mut detectors, &one_second_audio());
        assert!(intervals.is_empty());
    }
}
