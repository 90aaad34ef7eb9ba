//! Defines the Turn structure.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::UtcDateTime;

/// ID wrapper for Turn.
///
/// Assigned by the owning [`Conversation`] at creation, unique within that
/// conversation, and stable for the turn's lifetime.
///
/// [`Conversation`]: crate::Conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurnId(u64);

impl TurnId {
    pub(crate) fn new(n: u64) -> Self {
        Self(n)
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// The lifecycle state of an assistant turn.
///
/// User turns never stream; they are created in the `Complete` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// Deltas are still being applied to the turn's text.
    InProgress,

    /// The source delivered its terminal delta.
    #[default]
    Complete,

    /// The source reported an error; the text holds an explanation.
    Failed,

    /// The turn was aborted by the user; partial text is retained.
    Cancelled,
}

impl TurnStatus {
    /// Returns `true` for any state other than `InProgress`.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// One utterance in a conversation.
///
/// Text and status are mutated exclusively through the owning
/// [`Conversation`], which enforces the append-only and
/// finalized-turns-are-frozen invariants.
///
/// [`Conversation`]: crate::Conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub role: Role,
    pub created_at: UtcDateTime,
    text: String,
    status: TurnStatus,
}

impl Turn {
    pub(crate) fn user(id: TurnId, text: String) -> Self {
        Self {
            id,
            role: Role::User,
            created_at: UtcDateTime::now(),
            text,
            status: TurnStatus::Complete,
        }
    }

    pub(crate) fn draft(id: TurnId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            created_at: UtcDateTime::now(),
            text: String::new(),
            status: TurnStatus::InProgress,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn status(&self) -> TurnStatus {
        self.status
    }

    /// Returns `true` while deltas may still be applied to this turn.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status == TurnStatus::InProgress
    }

    pub(crate) fn push_fragment(&mut self, fragment: &str) {
        self.text.push_str(fragment);
    }

    pub(crate) fn replace_text(&mut self, text: String) {
        self.text = text;
    }

    pub(crate) fn set_status(&mut self, status: TurnStatus) {
        self.status = status;
    }
}
