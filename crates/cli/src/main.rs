mod srt;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use speechguard_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use speechguard_core::pipeline::infrastructure::threaded_chunk_executor::ThreadedChunkExecutor;
use speechguard_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use speechguard_core::pipeline::transcribe_use_case::{
    TranscribeUseCase, TranscriptionRequest, TuningSelection,
};
use speechguard_core::pipeline::tuning_profile::TuningProfile;
use speechguard_core::recognition::domain::model::WhisperModel;
use speechguard_core::recognition::infrastructure::whisper_recognizer::WhisperRecognizerFactory;
use speechguard_core::shared::constants::{SILERO_VAD_MODEL_NAME, SILERO_VAD_MODEL_URL};
use speechguard_core::shared::model_resolver;
use speechguard_core::vad::domain::energy_vad::EnergyVad;
use speechguard_core::vad::domain::voice_activity::VoiceActivityDetector;
use speechguard_core::vad::infrastructure::silero_vad::SileroVad;

/// Hallucination-resistant speech transcription with word timestamps.
#[derive(Parser)]
#[command(name = "speechguard")]
struct Cli {
    /// Input audio or video file.
    input: PathBuf,

    /// Output file (.json or .srt). Prints JSON to stdout when omitted.
    output: Option<PathBuf>,

    /// Whisper model tier: tiny, base, medium, large, large-v2, large-v3.
    #[arg(long, default_value = "medium")]
    model: WhisperModel,

    /// Spoken language code (e.g. "en", "pt"). Auto-detected when omitted.
    #[arg(long)]
    language: Option<String>,

    /// Tuning preset: maximum_quality, balanced, fast_processing,
    /// podcasts, short_videos. Derived from duration when omitted.
    #[arg(long)]
    preset: Option<String>,

    /// Prompt text used to prime the engine.
    #[arg(long)]
    prompt: Option<String>,

    /// Vocabulary hints (comma-separated). Hyphenated hints also repair
    /// split compound words.
    #[arg(long, value_delimiter = ',')]
    vocabulary: Option<Vec<String>>,

    /// Override the chunk length in seconds.
    #[arg(long)]
    chunk_length: Option<f64>,

    /// Override the chunk overlap in seconds.
    #[arg(long)]
    overlap: Option<f64>,

    /// Disable voice activity detection.
    #[arg(long)]
    no_vad: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let request = TranscriptionRequest {
        model: cli.model,
        language: cli.language.clone(),
        prompt_text: cli.prompt.clone(),
        vocabulary_hints: cli.vocabulary.clone().unwrap_or_default(),
        tuning: build_tuning(&cli),
    };

    let mut use_case = TranscribeUseCase::new(
        Box::new(FfmpegAudioReader),
        Box::new(WhisperRecognizerFactory),
        build_vad_chain(),
        Box::new(ThreadedChunkExecutor::new()),
        Box::new(StdoutPipelineLogger::new()),
        None,
    );

    let transcript = use_case.run(&cli.input, &request)?;
    log::info!("Transcribed {} segments", transcript.len());

    write_output(&transcript, cli.output.as_deref())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("input file not found: {}", cli.input.display()).into());
    }
    if let Some(overlap) = cli.overlap {
        let chunk_length = cli.chunk_length.unwrap_or(30.0);
        if overlap >= chunk_length {
            return Err("overlap must be smaller than the chunk length".into());
        }
    }
    Ok(())
}

/// Geometry overrides turn the chosen preset (or balanced) into a
/// custom profile; otherwise preset/duration selection applies as-is.
fn build_tuning(cli: &Cli) -> TuningSelection {
    let has_overrides = cli.chunk_length.is_some() || cli.overlap.is_some() || cli.no_vad;

    if !has_overrides {
        return match &cli.preset {
            Some(name) => TuningSelection::Preset(name.clone()),
            None => TuningSelection::Auto,
        };
    }

    let base = match &cli.preset {
        Some(name) => TuningProfile::from_preset_name(name),
        None => TuningProfile::balanced(),
    };
    TuningSelection::Custom(TuningProfile {
        chunk_length: cli.chunk_length.unwrap_or(base.chunk_length),
        overlap: cli.overlap.unwrap_or(base.overlap),
        enable_vad: !cli.no_vad && base.enable_vad,
        ..base
    })
}

/// Silero first, energy-based second. A missing or broken Silero model
/// just narrows the chain; transcription proceeds either way.
fn build_vad_chain() -> Vec<Box<dyn VoiceActivityDetector>> {
    let mut detectors: Vec<Box<dyn VoiceActivityDetector>> = Vec::new();

    match model_resolver::resolve(SILERO_VAD_MODEL_NAME, SILERO_VAD_MODEL_URL, None) {
        Ok(path) => match SileroVad::new(&path) {
            Ok(vad) => detectors.push(Box::new(vad)),
            Err(e) => log::warn!("Silero VAD unavailable: {e}. Using energy-based VAD."),
        },
        Err(e) => log::warn!("Could not resolve Silero VAD model: {e}. Using energy-based VAD."),
    }

    detectors.push(Box::new(EnergyVad));
    detectors
}

fn write_output(
    transcript: &speechguard_core::transcript::transcript::Transcript,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) if path.extension().is_some_and(|e| e == "srt") => {
            fs::write(path, srt::render(transcript))?;
            log::info!("Wrote {}", path.display());
        }
        Some(path) => {
            fs::write(path, serde_json::to_string_pretty(transcript)?)?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            println!("{}", serde_json::to_string_pretty(transcript)?);
        }
    }
    Ok(())
}
