pub mod edit;
pub mod identity;
pub mod profile;

pub use edit::ProfileEdit;
pub use identity::{AuthState, Identity};
pub use profile::{Platform, PrivacySettings, Profile, SocialLink, Visibility, Work, WorkStatus};
