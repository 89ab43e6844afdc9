use serde::{Deserialize, Serialize};

use crate::shared::time_span::TimeSpan;

/// A single recognized word with its global-timeline span.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub span: TimeSpan,
}

impl WordToken {
    pub fn new(text: impl Into<String>, span: TimeSpan) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}
