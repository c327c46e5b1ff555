use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::host::{Sleeper, StatusSink};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard is unavailable")]
    Unavailable,
    #[error("clipboard write was rejected: {0}")]
    Rejected(String),
}

#[async_trait(?Send)]
pub trait Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Prefix of the user id chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFeedback {
    Neutral,
    Copied,
    Failed,
}

impl CopyFeedback {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Neutral => "🆔 user: ",
            Self::Copied => "✅ user: ",
            Self::Failed => "❌ user: ",
        }
    }
}

/// Copies `text`, shows the outcome for `window`, then reverts to neutral.
pub async fn copy_with_feedback<C, K, Z>(
    clipboard: &C,
    sink: &K,
    sleeper: &Z,
    text: &str,
    window: Duration,
) -> Result<(), ClipboardError>
where
    C: Clipboard + ?Sized,
    K: StatusSink<CopyFeedback> + ?Sized,
    Z: Sleeper + ?Sized,
{
    let outcome = clipboard.write_text(text).await;
    match &outcome {
        Ok(()) => sink.show(&CopyFeedback::Copied),
        Err(error) => {
            warn!(%error, "failed to copy user id");
            sink.show(&CopyFeedback::Failed);
        }
    }
    sleeper.sleep(window).await;
    sink.show(&CopyFeedback::Neutral);
    outcome
}
