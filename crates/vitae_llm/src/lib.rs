pub mod delta;
pub mod error;
pub mod local;
pub mod remote;
pub mod source;

pub use delta::Delta;
pub use error::Error;
pub use local::Local;
pub use remote::Remote;
pub use source::{ChatMessage, DeltaStream, Source};
