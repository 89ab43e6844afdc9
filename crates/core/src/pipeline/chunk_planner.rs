use crate::pipeline::tuning_profile::TuningProfile;
use crate::shared::time_span::TimeSpan;

/// One unit of transcription work: an audio span and its position in the
/// plan. Created here, consumed once by the executor, then discarded.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioChunkPlan {
    pub span: TimeSpan,
    pub index: usize,
}

/// Converts speech intervals into an ordered list of overlapping chunk
/// spans.
///
/// Chunk boundaries align with speech-interval ends where possible, but
/// the union of all chunks always covers `[0, duration)`; a gap would
/// silently lose audio. Consecutive sub-chunks inside one coverage
/// region overlap by exactly the configured overlap.
pub struct ChunkPlanner;

impl ChunkPlanner {
    pub fn plan(
        intervals: &[TimeSpan],
        duration: f64,
        profile: &TuningProfile,
    ) -> Vec<AudioChunkPlan> {
        if duration <= 0.0 {
            return Vec::new();
        }

        // Short clip: one chunk, no VAD alignment needed
        if duration <= profile.chunk_length {
            return vec![AudioChunkPlan {
                span: TimeSpan::new(0.0, duration),
                index: 0,
            }];
        }

        let spans = if intervals.is_empty() {
            uniform_spans(duration, profile)
        } else {
            aligned_spans(intervals, duration, profile)
        };

        spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| AudioChunkPlan { span, index })
            .collect()
    }
}

/// Time-based chunking: length L advancing by L - O each step.
fn uniform_spans(duration: f64, profile: &TuningProfile) -> Vec<TimeSpan> {
    let mut spans = Vec::new();
    split_region(&mut spans, 0.0, duration, profile);
    fold_short_tail(&mut spans, profile.min_chunk_duration);
    spans
}

/// Chunking aligned to speech-interval boundaries. Each coverage region
/// runs from the previous region's end to the current interval's end, so
/// regions tile `[0, duration)`; each region is then split into
/// overlapping sub-chunks of at most the configured length.
fn aligned_spans(intervals: &[TimeSpan], duration: f64, profile: &TuningProfile) -> Vec<TimeSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0.0;

    for interval in intervals {
        let region_end = interval.end.min(duration);
        if region_end <= cursor {
            continue;
        }
        split_region(&mut spans, cursor, region_end, profile);
        cursor = region_end;
    }

    // Trailing audio not covered by any speech interval
    if cursor < duration {
        split_region(&mut spans, cursor, duration, profile);
    }

    fold_short_tail(&mut spans, profile.min_chunk_duration);
    spans
}

fn split_region(
    spans: &mut Vec<TimeSpan>,
    region_start: f64,
    region_end: f64,
    profile: &TuningProfile,
) {
    let chunk_length = profile.chunk_length.max(1.0);
    let mut start = region_start;
    loop {
        let end = (start + chunk_length).min(region_end);
        spans.push(TimeSpan::new(start, end));
        if end >= region_end {
            break;
        }
        // An overlap at or above the chunk length cannot advance; fall
        // back to back-to-back chunks rather than stalling
        let next_start = end - profile.overlap;
        start = if next_start > start { next_start } else { end };
    }
}

/// A trailing chunk under the minimum duration is folded into its
/// predecessor when the two are contiguous, preserving coverage.
fn fold_short_tail(spans: &mut Vec<TimeSpan>, min_duration: f64) {
    let mut i = 1;
    while i < spans.len() {
        if spans[i].duration() < min_duration && spans[i - 1].end >= spans[i].start {
            let end = spans[i].end.max(spans[i - 1].end);
            spans[i - 1].end = end;
            spans.remove(i);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile(chunk_length: f64, overlap: f64) -> TuningProfile {
        TuningProfile {
            chunk_length,
            overlap,
            ..TuningProfile::balanced()
        }
    }

    /// Chunks must union-cover [0, duration) without gaps.
    fn assert_covers(plans: &[AudioChunkPlan], duration: f64) {
        assert!(!plans.is_empty());
        assert_relative_eq!(plans[0].span.start, 0.0);
        assert_relative_eq!(plans.last().unwrap().span.end, duration, epsilon = 1e-9);
        for pair in plans.windows(2) {
            assert!(
                pair[1].span.start <= pair[0].span.end + 1e-9,
                "gap between {:?} and {:?}",
                pair[0].span,
                pair[1].span
            );
        }
    }

    #[test]
    fn test_short_clip_yields_single_chunk() {
        let plans = ChunkPlanner::plan(&[], 45.0, &profile(60.0, 1.0));
        assert_eq!(plans.len(), 1);
        assert_relative_eq!(plans[0].span.start, 0.0);
        assert_relative_eq!(plans[0].span.end, 45.0);
    }

    #[test]
    fn test_uniform_chunking_covers_duration_with_exact_overlap() {
        let plans = ChunkPlanner::plan(&[], 100.0, &profile(30.0, 2.0));
        assert_covers(&plans, 100.0);
        for pair in plans.windows(2) {
            assert_relative_eq!(pair[0].span.end - pair[1].span.start, 2.0);
        }
    }

    #[test]
    fn test_single_full_interval_chunks_with_exact_overlap() {
        let intervals = [TimeSpan::new(0.0, 100.0)];
        let plans = ChunkPlanner::plan(&intervals, 100.0, &profile(30.0, 2.0));
        assert_covers(&plans, 100.0);
        for pair in plans.windows(2) {
            assert_relative_eq!(pair[0].span.end - pair[1].span.start, 2.0);
        }
    }

    #[test]
    fn test_chunks_align_to_interval_boundaries() {
        let intervals = [TimeSpan::new(0.0, 20.0), TimeSpan::new(40.0, 70.0)];
        let plans = ChunkPlanner::plan(&intervals, 95.0, &profile(30.0, 2.0));
        assert_covers(&plans, 95.0);
        // A chunk boundary lands exactly on each speech interval end
        assert!(plans.iter().any(|p| (p.span.end - 20.0).abs() < 1e-9));
        assert!(plans.iter().any(|p| (p.span.end - 70.0).abs() < 1e-9));
    }

    #[test]
    fn test_trailing_silence_appended_as_final_chunk() {
        let intervals = [TimeSpan::new(0.0, 50.0)];
        let plans = ChunkPlanner::plan(&intervals, 120.0, &profile(30.0, 2.0));
        assert_covers(&plans, 120.0);
        assert_relative_eq!(plans.last().unwrap().span.end, 120.0);
    }

    #[test]
    fn test_indices_strictly_increasing() {
        let plans = ChunkPlanner::plan(&[], 200.0, &profile(30.0, 2.0));
        for (expected, plan) in plans.iter().enumerate() {
            assert_eq!(plan.index, expected);
        }
    }

    #[test]
    fn test_short_tail_folded_into_predecessor() {
        // 62s with 30s chunks / 2s overlap: naive spans end [0,30],[28,58],[56,62]
        // then a hypothetical tiny tail would be folded. Use 59s so the
        // last region is 1s (< 5s minimum).
        let plans = ChunkPlanner::plan(&[], 59.0, &profile(30.0, 2.0));
        assert_covers(&plans, 59.0);
        assert!(plans
            .iter()
            .all(|p| p.span.duration() >= 5.0 || plans.len() == 1));
    }

    #[test]
    fn test_zero_duration_yields_no_chunks() {
        assert!(ChunkPlanner::plan(&[], 0.0, &profile(30.0, 2.0)).is_empty());
    }

    #[test]
    fn test_interval_past_duration_is_clamped() {
        let intervals = [TimeSpan::new(0.0, 150.0)];
        let plans = ChunkPlanner::plan(&intervals, 100.0, &profile(30.0, 2.0));
        assert_covers(&plans, 100.0);
    }
}
