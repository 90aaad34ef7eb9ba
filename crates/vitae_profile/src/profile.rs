use serde::{Deserialize, Serialize};

/// The opening prompt shown over an empty transcript when the profile owner
/// has not set a tagline.
pub const DEFAULT_OPENING_PROMPT: &str =
    "Ask me anything about my experience, projects, or values";

/// Prompt chips shown alongside the opening prompt.
pub const SUGGESTED_QUESTIONS: [&str; 5] = [
    "Tell me about yourself",
    "What's your most impressive project?",
    "What hackathons do you recommend?",
    "What are your core values?",
    "What's your experience with AI?",
];

/// A person's public profile record.
///
/// Read-only from the chat core's perspective. The core consumes only the
/// display name and tagline to seed the conversation's opening prompt; the
/// rest is presentation data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,

    /// Unique handle, used in profile URLs.
    pub username: String,

    /// Short one-line byline shown under the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,

    /// Long-form biography.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub about: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub works: Vec<Work>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub social_links: Vec<SocialLink>,

    #[serde(default)]
    pub privacy: PrivacySettings,
}

impl Profile {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = Some(tagline.into());
        self
    }

    #[must_use]
    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// The line shown over an empty transcript, inviting the first question.
    #[must_use]
    pub fn opening_prompt(&self) -> &str {
        self.tagline.as_deref().unwrap_or(DEFAULT_OPENING_PROMPT)
    }

    /// Fixed question suggestions shown alongside the opening prompt.
    #[must_use]
    pub fn suggested_questions(&self) -> &'static [&'static str] {
        &SUGGESTED_QUESTIONS
    }
}

/// One project or position on a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub title: String,
    pub description: String,

    #[serde(default)]
    pub status: WorkStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Quantifiable results, e.g. "500+ users" or "Won 1st place".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tech_stack: Vec<String>,
}

impl Work {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkStatus {
    Completed,
    #[default]
    InProgress,
    Archived,
}

/// An outbound link on a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: Platform,
    pub url: String,
}

impl SocialLink {
    pub fn new(platform: Platform, url: impl Into<String>) -> Self {
        Self {
            platform,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Github,
    Twitter,
    Website,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    #[serde(default)]
    pub visibility: Visibility,

    /// Whether the profile link may be shared at all.
    #[serde(default)]
    pub shareable_link_enabled: bool,
}

/// Who can reach a profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Only accessible with the exact link.
    #[default]
    Private,

    /// Not indexed, but the link works.
    Unlisted,

    /// Indexed and discoverable.
    Public,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_display_name() {
        let profile = Profile::new("Tom", "Zhang", "MightyTMZ");
        assert_eq!(profile.display_name(), "Tom Zhang");

        let profile = Profile::new("Cher", "", "cher");
        assert_eq!(profile.display_name(), "Cher");
    }

    #[test]
    fn test_opening_prompt_prefers_tagline() {
        let profile = Profile::new("Tom", "Zhang", "MightyTMZ");
        assert_eq!(profile.opening_prompt(), DEFAULT_OPENING_PROMPT);

        let profile = profile.with_tagline("Full-Stack Software Engineer");
        assert_eq!(profile.opening_prompt(), "Full-Stack Software Engineer");
    }

    #[test]
    fn test_profile_json_shape() {
        let json = serde_json::json!({
            "first_name": "Tom",
            "last_name": "Zhang",
            "username": "MightyTMZ",
            "works": [{
                "title": "LeetOps",
                "description": "Incident-response practice.",
                "status": "in-progress",
                "tech_stack": ["React", "Python"],
            }],
            "social_links": [
                { "platform": "github", "url": "https://github.com/MightyTMZ" },
            ],
            "privacy": { "visibility": "unlisted", "shareable_link_enabled": true },
        });

        let profile: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.works[0].status, WorkStatus::InProgress);
        assert_eq!(profile.social_links[0].platform, Platform::Github);
        assert_eq!(profile.privacy.visibility, Visibility::Unlisted);
        assert_eq!(profile.tagline, None);
    }
}
