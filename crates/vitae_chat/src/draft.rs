//! Incremental renderer for the open assistant draft.

use vitae_conversation::{Conversation, TurnId};
use vitae_llm::Delta;

use crate::error::Result;

/// Applies deltas to exactly one assistant turn, in arrival order.
///
/// The draft is the single writer over the open turn: text is only ever
/// appended, never truncated or rewritten, and once the turn is finalized the
/// controller drops the draft so no further writes are possible.
#[derive(Debug)]
pub struct Draft {
    id: TurnId,
}

impl Draft {
    pub(crate) fn new(id: TurnId) -> Self {
        Self { id }
    }

    /// The turn this draft writes to.
    #[must_use]
    pub fn id(&self) -> TurnId {
        self.id
    }

    /// Append one delta's fragment, returning a view of the updated draft for
    /// the presentation layer (e.g. a typing cursor).
    pub(crate) fn apply<'a>(
        &self,
        conversation: &'a mut Conversation,
        delta: &Delta,
    ) -> Result<View<'a>> {
        if !delta.fragment.is_empty() {
            conversation.append(self.id, &delta.fragment)?;
        }

        let turn = conversation
            .draft()
            .expect("draft turn is open while a Draft exists");

        Ok(View {
            text: turn.text(),
            in_progress: !delta.last,
        })
    }
}

/// Snapshot of the draft after a delta was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View<'a> {
    /// The draft's full text so far.
    pub text: &'a str,

    /// `false` once the terminal delta has been applied.
    pub in_progress: bool,
}
