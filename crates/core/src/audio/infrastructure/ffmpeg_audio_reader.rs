use std::path::Path;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::time_span::TimeSpan;

/// Decodes audio spans from a media file using ffmpeg-next.
///
/// Output is always mono at the requested sample rate; span trimming is
/// done by counting resampled output samples, so consecutive spans line
/// up exactly regardless of the container's packet boundaries.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn duration(&self, path: &Path) -> Result<f64, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        if ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .is_none()
        {
            return Err(format!("no audio track in {}", path.display()).into());
        }

        let raw = ictx.duration();
        if raw < 0 {
            return Err(format!("unknown duration for {}", path.display()).into());
        }
        Ok(raw as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE))
    }

    fn read_span(
        &self,
        path: &Path,
        span: TimeSpan,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;

        let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };

        let audio_stream_index = audio_stream.index();
        let codec_params = audio_stream.parameters();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(codec_params)?;
        let mut decoder = codec_ctx.decoder().audio()?;

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let first_sample = (span.start * target_sample_rate as f64) as usize;
        let last_sample = (span.end * target_sample_rate as f64) as usize;

        let mut collector = SpanCollector::new(first_sample, last_sample);
        let mut decoded_frame = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut resampled_frame = ffmpeg_next::util::frame::audio::Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler.run(&decoded_frame, &mut resampled_frame)?;
                collector.push(&resampled_frame);
            }

            if collector.done() {
                break;
            }
        }

        if !collector.done() {
            // Flush the decoder
            decoder.send_eof()?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler.run(&decoded_frame, &mut resampled_frame)?;
                collector.push(&resampled_frame);
            }

            // Flush the resampler (may have buffered samples)
            if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
                if delay.output > 0 {
                    collector.push(&resampled_frame);
                }
            }
        }

        Ok(Some(AudioSegment::new(
            collector.into_samples(),
            target_sample_rate,
            1,
        )))
    }
}

/// Accumulates the mono samples falling inside `[first_sample, last_sample)`.
struct SpanCollector {
    first_sample: usize,
    last_sample: usize,
    seen: usize,
    samples: Vec<f32>,
}

impl SpanCollector {
    fn new(first_sample: usize, last_sample: usize) -> Self {
        Self {
            first_sample,
            last_sample,
            seen: 0,
            samples: Vec::with_capacity(last_sample.saturating_sub(first_sample)),
        }
    }

    fn push(&mut self, frame: &ffmpeg_next::util::frame::audio::Audio) {
        let count = frame.samples();
        if count == 0 {
            return;
        }
        let data = frame.data(0);
        let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, count) };
        self.push_slice(floats);
    }

    fn push_slice(&mut self, floats: &[f32]) {
        if self.done() {
            return;
        }
        let frame_start = self.seen;
        let frame_end = self.seen + floats.len();
        self.seen = frame_end;

        let keep_start = self.first_sample.max(frame_start);
        let keep_end = self.last_sample.min(frame_end);
        if keep_start < keep_end {
            self.samples
                .extend_from_slice(&floats[keep_start - frame_start..keep_end - frame_start]);
        }
    }

    fn done(&self) -> bool {
        self.seen >= self.last_sample
    }

    fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
