pub mod chat;
pub mod draft;
pub mod error;

pub use chat::{Applied, Chat, Pending, SourceId};
pub use draft::Draft;
pub use error::Error;
