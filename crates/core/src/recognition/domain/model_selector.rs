use crate::pipeline::tuning_profile::TuningProfile;
use crate::recognition::domain::model::WhisperModel;

/// Duration above which top-tier models are swapped for the more stable
/// large-v2, which degrades less on long-form audio.
pub const LONG_FORM_THRESHOLD: f64 = 300.0;
pub const MEDIUM_FORM_THRESHOLD: f64 = 120.0;

/// Picks the model tier to request for a given duration.
pub struct ModelSelector {
    auto_model_selection: bool,
    prefer_stable_for_long: bool,
}

impl ModelSelector {
    pub fn new(profile: &TuningProfile) -> Self {
        Self {
            auto_model_selection: profile.auto_model_selection,
            prefer_stable_for_long: profile.prefer_stable_for_long,
        }
    }

    pub fn select(&self, requested: WhisperModel, duration: f64) -> WhisperModel {
        if !self.auto_model_selection || !self.prefer_stable_for_long {
            return requested;
        }

        if duration > LONG_FORM_THRESHOLD {
            if matches!(requested, WhisperModel::LargeV3 | WhisperModel::Large) {
                log::info!(
                    "Long audio ({duration:.1}s): using large-v2 instead of {requested} for stability"
                );
                return WhisperModel::LargeV2;
            }
        } else if duration > MEDIUM_FORM_THRESHOLD && requested == WhisperModel::LargeV3 {
            log::info!("Moderate audio ({duration:.1}s): using large-v2 instead of large-v3");
            return WhisperModel::LargeV2;
        }

        requested
    }

    /// Fallback chain for the selected model, most to least capable.
    pub fn chain(&self, model: WhisperModel) -> Vec<WhisperModel> {
        model.fallback_chain()
    }
}
