use std::fmt;
use std::str::FromStr;

use crate::shared::constants::WHISPER_MODEL_BASE_URL;

/// Whisper model tiers, ordered from least to most capable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WhisperModel {
    Tiny,
    Base,
    Medium,
    Large,
    LargeV2,
    LargeV3,
}

impl WhisperModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Medium => "medium",
            WhisperModel::Large => "large",
            WhisperModel::LargeV2 => "large-v2",
            WhisperModel::LargeV3 => "large-v3",
        }
    }

    /// ggml weights file name as published in the whisper.cpp model repo.
    pub fn file_name(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "ggml-tiny.bin",
            WhisperModel::Base => "ggml-base.bin",
            WhisperModel::Medium => "ggml-medium.bin",
            WhisperModel::Large => "ggml-large-v1.bin",
            WhisperModel::LargeV2 => "ggml-large-v2.bin",
            WhisperModel::LargeV3 => "ggml-large-v3.bin",
        }
    }

    pub fn download_url(&self) -> String {
        format!("{WHISPER_MODEL_BASE_URL}/{}", self.file_name())
    }

    /// Fallback chain ordered from most to least capable, starting with
    /// the model itself and ending in the smallest viable substitute.
    pub fn fallback_chain(&self) -> Vec<WhisperModel> {
        use WhisperModel::*;
        match self {
            LargeV3 => vec![LargeV3, LargeV2, Large, Medium],
            LargeV2 => vec![LargeV2, Large, Medium],
            Large => vec![Large, LargeV2, Medium],
            Medium => vec![Medium, Base],
            Base => vec![Base, Tiny],
            Tiny => vec![Tiny],
        }
    }
}

impl fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "medium" => Ok(WhisperModel::Medium),
            "large" => Ok(WhisperModel::Large),
            "large-v2" => Ok(WhisperModel::LargeV2),
            "large-v3" => Ok(WhisperModel::LargeV3),
            other => Err(format!(
                "unknown model '{other}' (expected tiny, base, medium, large, large-v2 or large-v3)"
            )),
        }
    }
}
