//! Conversation-level lifecycle state machine.

use std::fmt;

use futures::StreamExt as _;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use vitae_conversation::{Conversation, Turn, TurnStatus};
use vitae_llm::{ChatMessage, Delta, Source};

use crate::{
    draft::Draft,
    error::{Error, Result},
};

/// Identifies one invocation of a delta source.
///
/// Every submission gets a fresh id; deltas carrying a stale id (e.g. from a
/// cancelled episode whose stream still had items queued) are discarded
/// instead of leaking into a newer turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Everything a caller needs to drive the adapter for one submission.
#[derive(Debug)]
pub struct Pending {
    /// The source instance this episode accepts deltas from.
    pub source: SourceId,

    /// Cancelling this token stops the adapter cooperatively.
    pub cancel: CancellationToken,

    /// Prior turns, oldest first, excluding the just-submitted message.
    pub history: Vec<ChatMessage>,

    /// The submitted user message.
    pub message: String,
}

/// Result of offering a delta to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The fragment was appended to the open draft.
    Appended,

    /// The terminal delta arrived; the turn is finalized.
    Finalized(TurnStatus),

    /// The delta came from a source that is no longer active, or the turn was
    /// already finalized. Nothing changed.
    Discarded,
}

#[derive(Debug)]
enum State {
    /// Accepting input.
    Idle,

    /// One user turn finalized, assistant draft open, input disabled.
    AwaitingResponse {
        source: SourceId,
        draft: Draft,
        cancel: CancellationToken,
    },
}

/// The per-conversation lifecycle controller.
///
/// Sequences turns: accepts user input, suspends further input while a
/// response is in flight, supports cancelling that response, and guarantees
/// exactly one finalized assistant turn per user turn.
#[derive(Debug)]
pub struct Chat {
    conversation: Conversation,
    state: State,
    next_source: u64,
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}

impl Chat {
    #[must_use]
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            state: State::Idle,
            next_source: 0,
        }
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Whether a response is currently in flight.
    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, State::AwaitingResponse { .. })
    }

    /// Submit a user message, opening an assistant draft.
    ///
    /// Input is disabled at the presentation boundary while a response is in
    /// flight; a second submission is additionally rejected here as a
    /// defensive invariant.
    pub fn submit(&mut self, text: &str) -> Result<Pending> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyMessage);
        }

        if self.is_awaiting() {
            return Err(Error::Busy);
        }

        let history: Vec<ChatMessage> = self
            .conversation
            .turns()
            .iter()
            .map(ChatMessage::from)
            .collect();

        self.conversation.push_user(text)?;
        let draft = Draft::new(self.conversation.open_draft()?);

        let source = SourceId(self.next_source);
        self.next_source += 1;

        let cancel = CancellationToken::new();
        debug!(%source, turn = %draft.id(), "Opened assistant draft.");

        self.state = State::AwaitingResponse {
            source,
            draft,
            cancel: cancel.clone(),
        };

        Ok(Pending {
            source,
            cancel,
            history,
            message: text.to_owned(),
        })
    }

    /// Apply one delta from a source instance.
    ///
    /// Deltas from anything other than the currently active source are
    /// discarded. The terminal delta finalizes the turn as complete and
    /// returns the controller to idle.
    pub fn apply(&mut self, source: SourceId, delta: &Delta) -> Result<Applied> {
        let State::AwaitingResponse {
            source: active,
            draft,
            ..
        } = &self.state
        else {
            trace!(%source, "No response in flight; delta discarded.");
            return Ok(Applied::Discarded);
        };

        if *active != source {
            trace!(%source, %active, "Stale source; delta discarded.");
            return Ok(Applied::Discarded);
        }

        let view = draft.apply(&mut self.conversation, delta)?;
        trace!(chars = view.text.len(), in_progress = view.in_progress, "Applied delta.");

        if !delta.last {
            return Ok(Applied::Appended);
        }

        self.conversation.complete(draft.id())?;
        self.state = State::Idle;
        Ok(Applied::Finalized(TurnStatus::Complete))
    }

    /// Record a source error, finalizing the draft as failed.
    ///
    /// The error explanation replaces any partial text, so a prefix of the
    /// reply is never presented as a complete answer.
    pub fn fail(&mut self, source: SourceId, error: &vitae_llm::Error) -> Result<Applied> {
        let State::AwaitingResponse {
            source: active,
            draft,
            ..
        } = &self.state
        else {
            return Ok(Applied::Discarded);
        };

        if *active != source {
            return Ok(Applied::Discarded);
        }

        warn!(%error, turn = %draft.id(), "Assistant turn failed.");
        self.conversation.fail(draft.id(), format!("Error: {error}"))?;
        self.state = State::Idle;
        Ok(Applied::Finalized(TurnStatus::Failed))
    }

    /// Cancel the in-flight response, if any.
    ///
    /// The adapter is signalled to stop producing deltas, and the draft is
    /// finalized as cancelled. Partial text is retained; the status marks the
    /// turn as incomplete. Returns `false` when nothing was in flight (e.g.
    /// the terminal delta won the race).
    pub fn cancel(&mut self) -> bool {
        let State::AwaitingResponse { draft, cancel, .. } = &self.state else {
            return false;
        };

        cancel.cancel();
        debug!(turn = %draft.id(), "Cancelled in-flight response.");

        // The draft cannot be finalized while we are in `AwaitingResponse`,
        // so this always transitions it.
        let _ = self.conversation.cancel(draft.id());
        self.state = State::Idle;
        true
    }

    /// Drive one full turn against a source: submit, stream, finalize.
    ///
    /// Convenience for callers without their own event loop. The returned
    /// turn is the finalized assistant turn.
    pub async fn run_turn(&mut self, source: &dyn Source, text: &str) -> Result<&Turn> {
        let pending = self.submit(text)?;

        let stream = source
            .deltas(pending.history, &pending.message, pending.cancel.clone())
            .await;

        match stream {
            Ok(mut stream) => {
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(delta) => {
                            if self.apply(pending.source, &delta)? != Applied::Appended {
                                break;
                            }
                        }
                        Err(error) => {
                            self.fail(pending.source, &error)?;
                            break;
                        }
                    }
                }
            }
            Err(error) => {
                self.fail(pending.source, &error)?;
            }
        }

        // A stream that ended without a terminal delta (and without being
        // cancelled) still closes its turn; whatever arrived is the reply.
        if let State::AwaitingResponse { source, draft, .. } = &self.state
            && *source == pending.source
        {
            debug!(turn = %draft.id(), "Stream ended without terminal delta.");
            self.conversation.complete(draft.id())?;
            self.state = State::Idle;
        }

        Ok(self
            .conversation
            .turns()
            .last()
            .expect("turn was appended by submit"))
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
