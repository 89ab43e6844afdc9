use serde::{Deserialize, Serialize};

use crate::transcript::segment::TranscriptSegment;

/// The ordered, time-sorted collection of segments passed between
/// pipeline stages. Segments are owned by value; stages move the whole
/// transcript rather than aliasing into it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Restore non-decreasing start-time order.
    pub fn sort_by_start(&mut self) {
        self.segments
            .sort_by(|a, b| a.span.start.total_cmp(&b.span.start));
    }
}
