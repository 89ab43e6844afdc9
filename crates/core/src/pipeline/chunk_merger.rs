use crate::pipeline::chunk_executor::ChunkResult;
use crate::pipeline::chunk_planner::AudioChunkPlan;
use crate::transcript::transcript::Transcript;

/// Reconciles per-chunk transcripts into one global, time-ordered
/// transcript.
///
/// Content inside an overlap region is transcribed twice, once per
/// chunk. Each copy is attributed to the chunk whose temporal center is
/// closer to the segment's midpoint (the copy produced with more
/// surrounding context) and the other copy is discarded, so exactly one
/// survives. Ties go to the earlier chunk. This is a positional
/// tie-break, not semantic deduplication; near-duplicates that slip
/// through are caught by the similarity detector downstream.
pub struct ChunkMerger;

impl ChunkMerger {
    pub fn merge(mut results: Vec<ChunkResult>, plans: &[AudioChunkPlan]) -> Transcript {
        // Parallel executors may complete out of order
        results.sort_by_key(|r| r.index);

        let mut merged = Transcript::default();

        for result in results {
            let chunk_idx = result.index;
            let plan = match plans.get(chunk_idx) {
                Some(p) => p,
                None => continue,
            };

            for segment in result.segments {
                let midpoint = segment.span.midpoint();
                if owns_midpoint(plans, chunk_idx, midpoint) {
                    merged.segments.push(segment);
                } else {
                    log::debug!(
                        "Dropping overlap duplicate at {midpoint:.2}s from chunk {chunk_idx} \
                         (span {:.2}-{:.2})",
                        plan.span.start,
                        plan.span.end
                    );
                }
            }
        }

        // Last line of defense: downstream stages rely on start order
        merged.sort_by_start();
        merged
    }
}

/// Whether the chunk at `chunk_idx` is the owner of a segment midpoint
/// that may fall inside an overlap with a neighboring chunk.
fn owns_midpoint(plans: &[AudioChunkPlan], chunk_idx: usize, midpoint: f64) -> bool {
    let span = plans[chunk_idx].span;
    let center = span.midpoint();

    // Against the previous chunk: the earlier chunk wins ties
    if chunk_idx > 0 {
        let prev = plans[chunk_idx - 1].span;
        if let Some(overlap) = prev.intersection(&span) {
            if overlap.contains(midpoint)
                && (midpoint - prev.midpoint()).abs() <= (midpoint - center).abs()
            {
                return false;
            }
        }
    }

    // Against the next chunk: this (earlier) chunk wins ties
    if chunk_idx + 1 < plans.len() {
        let next = plans[chunk_idx + 1].span;
        if let Some(overlap) = span.intersection(&next) {
            if overlap.contains(midpoint)
                && (midpoint - next.midpoint()).abs() < (midpoint - center).abs()
            {
                return false;
            }
        }
    }

    true
}
