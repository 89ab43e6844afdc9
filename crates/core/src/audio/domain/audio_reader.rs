use std::path::Path;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::time_span::TimeSpan;

/// Domain interface for decoding audio from a media file.
///
/// Chunk extraction goes through `read_span`, so each unit of work
/// materializes as an owned in-memory buffer scoped to that chunk.
pub trait AudioReader: Send + Sync {
    /// Duration of the audio track in seconds.
    fn duration(&self, path: &Path) -> Result<f64, Box<dyn std::error::Error>>;

    /// Decode the given span to a mono PCM AudioSegment at the given sample
    /// rate. Returns None if the file has no audio track.
    fn read_span(
        &self,
        path: &Path,
        span: TimeSpan,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;
}
