pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),

    #[error(transparent)]
    Chat(#[from] vitae_chat::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
