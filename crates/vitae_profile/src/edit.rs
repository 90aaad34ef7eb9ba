use serde::{Deserialize, Serialize};

use crate::profile::{Profile, SocialLink, Work};

/// One edit operation against a [`Profile`].
///
/// The operation is decided at the point the edit is produced, e.g. when a
/// natural-language request is interpreted. Applying an edit dispatches on
/// the tag only; field names are never re-inferred from strings downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProfileEdit {
    SetName { first: String, last: String },
    SetTagline(String),
    SetAbout(String),
    SetLocation(String),
    AddWork(Work),
    AddSocialLink(SocialLink),
}

impl Profile {
    /// Apply one edit operation to this profile.
    pub fn apply(&mut self, edit: ProfileEdit) {
        match edit {
            ProfileEdit::SetName { first, last } => {
                self.first_name = first;
                self.last_name = last;
            }
            ProfileEdit::SetTagline(tagline) => self.tagline = Some(tagline),
            ProfileEdit::SetAbout(about) => self.about = about,
            ProfileEdit::SetLocation(location) => self.location = Some(location),
            ProfileEdit::AddWork(work) => self.works.push(work),
            ProfileEdit::AddSocialLink(link) => self.social_links.push(link),
        }
    }
}
