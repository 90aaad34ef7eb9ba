pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a delta source.
///
/// Each of these terminates the current turn as failed. A single malformed
/// event payload is deliberately NOT represented here: it is skipped in-stream
/// with a warning and never interrupts the stream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connectivity was lost before or during the stream.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The completion endpoint rejected our credentials.
    #[error("completion endpoint rejected credentials (status {status}): {message}")]
    Auth { status: u16, message: String },

    /// The response does not conform to the expected event-stream shape.
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// The client itself could not be configured.
    #[error("client config error: {0}")]
    Config(String),
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
