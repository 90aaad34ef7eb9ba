use std::{fmt, pin::Pin};

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use vitae_conversation::{Role, Turn};

use crate::{delta::Delta, error::Result};

/// A lazy sequence of deltas for a single assistant turn.
///
/// Errors are represented as [`Error`] to give the lifecycle controller a
/// single failed-turn signal, regardless of which source produced the stream.
///
/// [`Error`]: crate::Error
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<Delta>> + Send>>;

/// One prior utterance, as handed to a delta source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self::new(turn.role, turn.text())
    }
}

/// Produces a delta sequence for one assistant turn.
///
/// Each invocation returns a fresh stream. Cancelling the token stops the
/// source cooperatively: the network request is aborted, or the pending timer
/// is cleared, and no further deltas are delivered.
#[async_trait]
pub trait Source: fmt::Debug + Send + Sync {
    /// Start producing deltas for a reply to `message`, given the full
    /// ordered list of prior turns.
    async fn deltas(
        &self,
        history: Vec<ChatMessage>,
        message: &str,
        cancel: CancellationToken,
    ) -> Result<DeltaStream>;
}
