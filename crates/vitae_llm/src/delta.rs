/// An incremental unit of assistant text.
///
/// Non-terminal deltas always carry a non-empty fragment. The terminal delta
/// may carry the final fragment, or an empty one when the source learns about
/// the end of the stream only after the last fragment was delivered (as with
/// an end-of-stream sentinel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    /// Text to append to the draft turn.
    pub fragment: String,

    /// Whether this is the terminal delta for its turn.
    pub last: bool,
}

impl Delta {
    /// A non-terminal delta carrying `fragment`.
    #[must_use]
    pub fn text(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            last: false,
        }
    }

    /// A terminal delta carrying the final `fragment`.
    #[must_use]
    pub fn last(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            last: true,
        }
    }

    /// A terminal delta with no trailing text.
    #[must_use]
    pub fn end() -> Self {
        Self::last("")
    }
}
