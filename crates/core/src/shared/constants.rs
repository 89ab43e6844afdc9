/// Sample rate the whole pipeline operates at. Whisper and Silero VAD
/// both expect 16 kHz mono input.
pub const PIPELINE_SAMPLE_RATE: u32 = 16000;

pub const SILERO_VAD_MODEL_NAME: &str = "silero_vad.onnx";
pub const SILERO_VAD_MODEL_URL: &str =
    "https://raw.githubusercontent.com/snakers4/silero-vad/master/files/silero_vad.onnx";

pub const WHISPER_MODEL_BASE_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Gap under which two VAD speech intervals are merged into one.
pub const VAD_MERGE_GAP: f64 = 0.5;
