//! Defines the Conversation structure.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    turn::{Role, Turn, TurnId, TurnStatus},
};

/// An ordered transcript of turns between a visitor and the profile's
/// assistant.
///
/// Invariants, enforced at every mutation:
///
/// - roles strictly alternate `user`, `assistant`, ... starting with `user`,
/// - at most one turn is `InProgress` at any time,
/// - a finalized turn's text never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
    next_id: u64,

    /// Index of the open assistant draft, if any.
    #[serde(skip)]
    draft: Option<usize>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The open assistant draft, if a response is in flight.
    #[must_use]
    pub fn draft(&self) -> Option<&Turn> {
        self.draft.map(|i| &self.turns[i])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a finalized user turn.
    ///
    /// Rejected while an assistant draft is open, or when the previous turn
    /// was also a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) -> Result<TurnId> {
        if self.draft.is_some() {
            return Err(Error::DraftOpen);
        }

        if self.turns.last().is_some_and(|t| t.role == Role::User) {
            return Err(Error::RoleOrder);
        }

        let id = self.allocate_id();
        self.turns.push(Turn::user(id, text.into()));
        Ok(id)
    }

    /// Open an empty assistant draft turn.
    ///
    /// Requires the previous turn to be a user turn, and no other draft to be
    /// open.
    pub fn open_draft(&mut self) -> Result<TurnId> {
        if self.draft.is_some() {
            return Err(Error::DraftOpen);
        }

        if !self.turns.last().is_some_and(|t| t.role == Role::User) {
            return Err(Error::RoleOrder);
        }

        let id = self.allocate_id();
        self.turns.push(Turn::draft(id));
        self.draft = Some(self.turns.len() - 1);
        Ok(id)
    }

    /// Append a fragment to the open draft.
    ///
    /// Fragments are concatenated in arrival order; text only ever grows.
    pub fn append(&mut self, id: TurnId, fragment: &str) -> Result<()> {
        let turn = self.turn_mut(id)?;
        if !turn.is_draft() {
            return Err(Error::Finalized(id));
        }

        turn.push_fragment(fragment);
        Ok(())
    }

    /// Finalize the draft as complete.
    ///
    /// Returns `false` (a no-op) if the turn was already finalized.
    pub fn complete(&mut self, id: TurnId) -> Result<bool> {
        self.finalize(id, TurnStatus::Complete, None)
    }

    /// Finalize the draft as cancelled, retaining any partial text.
    pub fn cancel(&mut self, id: TurnId) -> Result<bool> {
        self.finalize(id, TurnStatus::Cancelled, None)
    }

    /// Finalize the draft as failed, replacing its text with an explanation.
    ///
    /// Replacing (rather than appending) ensures a partial fragment prefix is
    /// never presented as a complete answer.
    pub fn fail(&mut self, id: TurnId, message: impl Into<String>) -> Result<bool> {
        self.finalize(id, TurnStatus::Failed, Some(message.into()))
    }

    fn finalize(&mut self, id: TurnId, status: TurnStatus, text: Option<String>) -> Result<bool> {
        debug_assert!(status.is_final());

        let turn = self.turn_mut(id)?;
        if !turn.is_draft() {
            return Ok(false);
        }

        if let Some(text) = text {
            turn.replace_text(text);
        }

        turn.set_status(status);
        self.draft = None;
        Ok(true)
    }

    fn turn_mut(&mut self, id: TurnId) -> Result<&mut Turn> {
        self.turns
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::UnknownTurn(id))
    }

    fn allocate_id(&mut self) -> TurnId {
        let id = TurnId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_roles_alternate() {
        let mut conversation = Conversation::new();

        let user = conversation.push_user("hello").unwrap();
        assert_eq!(conversation.turns()[0].id, user);
        assert_matches!(conversation.push_user("again"), Err(Error::RoleOrder));

        let draft = conversation.open_draft().unwrap();
        assert_matches!(conversation.push_user("nope"), Err(Error::DraftOpen));

        conversation.complete(draft).unwrap();
        conversation.push_user("next").unwrap();

        let roles: Vec<_> = conversation.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    }

    #[test]
    fn test_draft_requires_user_turn() {
        let mut conversation = Conversation::new();
        assert_matches!(conversation.open_draft(), Err(Error::RoleOrder));
    }

    #[test]
    fn test_single_draft_at_a_time() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello").unwrap();
        conversation.open_draft().unwrap();
        assert_matches!(conversation.open_draft(), Err(Error::DraftOpen));

        let drafts = conversation
            .turns()
            .iter()
            .filter(|t| t.is_draft())
            .count();
        assert_eq!(drafts, 1);
    }

    #[test]
    fn test_append_is_ordered_and_append_only() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello").unwrap();
        let draft = conversation.open_draft().unwrap();

        conversation.append(draft, "Hel").unwrap();
        conversation.append(draft, "lo ").unwrap();
        conversation.append(draft, "world").unwrap();
        assert_eq!(conversation.draft().unwrap().text(), "Hello world");

        conversation.complete(draft).unwrap();
        assert_matches!(
            conversation.append(draft, "!"),
            Err(Error::Finalized(id)) if id == draft
        );
        assert_eq!(conversation.turns().last().unwrap().text(), "Hello world");
    }

    #[test]
    fn test_finalization_is_idempotent() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello").unwrap();
        let draft = conversation.open_draft().unwrap();

        assert!(conversation.complete(draft).unwrap());
        assert!(!conversation.cancel(draft).unwrap());
        assert!(!conversation.fail(draft, "boom").unwrap());

        let turn = conversation.turns().last().unwrap();
        assert_eq!(turn.status(), TurnStatus::Complete);
    }

    #[test]
    fn test_fail_replaces_partial_text() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello").unwrap();
        let draft = conversation.open_draft().unwrap();

        conversation.append(draft, "Partial").unwrap();
        conversation.fail(draft, "Error: connection lost").unwrap();

        let turn = conversation.turns().last().unwrap();
        assert_eq!(turn.status(), TurnStatus::Failed);
        assert_eq!(turn.text(), "Error: connection lost");
    }

    #[test]
    fn test_cancel_retains_partial_text() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello").unwrap();
        let draft = conversation.open_draft().unwrap();

        conversation.append(draft, "Par").unwrap();
        conversation.cancel(draft).unwrap();

        let turn = conversation.turns().last().unwrap();
        assert_eq!(turn.status(), TurnStatus::Cancelled);
        assert_eq!(turn.text(), "Par");
        assert!(conversation.draft().is_none());
    }

    #[test]
    fn test_unknown_turn() {
        let mut conversation = Conversation::new();
        conversation.push_user("hello").unwrap();
        let draft = conversation.open_draft().unwrap();
        conversation.complete(draft).unwrap();

        let bogus = TurnId::new(42);
        assert_matches!(conversation.append(bogus, "x"), Err(Error::UnknownTurn(_)));
    }
}
