//! Deterministic local delta source.
//!
//! Computes a complete reply synchronously from a fixed table of canned
//! answers, then reveals it on a timer cadence so the transcript behaves
//! exactly as it does with a remote stream. Useful for profiles without an
//! upstream model, and for demos without a network.

use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    delta::Delta,
    error::Result,
    source::{ChatMessage, DeltaStream, Source},
};

/// How often one reveal step is emitted.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(45);

/// Reply used when no canned answer matches.
pub const FALLBACK_REPLY: &str = "That's a great question! I'd love to chat more about that. Feel \
                                  free to ask me anything else about my experience, projects, or \
                                  values.";

/// Canned answers, matched case-insensitively against the submitted text.
/// First matching key wins.
const CANNED_REPLIES: &[(&str, &str)] = &[
    (
        "tell me about yourself",
        "I'm a passionate developer and creator who loves building products that make a \
         difference. I've worked across startups and scale-ups, always pushing the boundaries of \
         what's possible with technology.",
    ),
    (
        "what's your most impressive project?",
        "I built a real-time collaboration platform that's now used by 50,000+ developers. It \
         reduced onboarding time by 60% through AI-powered suggestions and intelligent workflows.",
    ),
    (
        "what hackathons do you recommend?",
        "I'd recommend TechCrunch Disrupt, HackMIT, and any local hackathons in your area. The \
         key is finding events that align with your interests and give you a chance to build \
         something cool in 24-48 hours.",
    ),
    (
        "what are your core values?",
        "I believe in transparency, continuous learning, and building with empathy. I think the \
         best products come from understanding real user needs, not just shipping features.",
    ),
    (
        "what's your experience with ai?",
        "I've been experimenting with AI since GPT-3 launched. I've built several AI-powered \
         products and I'm fascinated by how it's reshaping how we work and create. That's why I \
         built Vitae!",
    ),
];

/// A delta source that needs no network and cannot fail.
///
/// The reply is a pure function of the submitted message; prior turns are
/// ignored.
#[derive(Debug, Clone)]
pub struct Local {
    cadence: Duration,
}

impl Default for Local {
    fn default() -> Self {
        Self::new(DEFAULT_CADENCE)
    }
}

impl Local {
    #[must_use]
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

#[async_trait]
impl Source for Local {
    async fn deltas(
        &self,
        _history: Vec<ChatMessage>,
        message: &str,
        cancel: CancellationToken,
    ) -> Result<DeltaStream> {
        let reply = reply_for(message);
        let tokens: Vec<&'static str> = tokenize(reply);
        let cadence = self.cadence;

        Ok(Box::pin(stream!({
            let mut interval = tokio::time::interval(cadence);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut index = 0;
            while index < tokens.len() {
                tokio::select! {
                    () = cancel.cancelled() => {
                        debug!("Local reveal cancelled.");
                        return;
                    }
                    _ = interval.tick() => {}
                }

                // One reveal step per tick: the next token, plus any trailing
                // whitespace runs, so no step grows the draft by whitespace
                // alone.
                let mut next = index + 1;
                while next < tokens.len() && is_whitespace(tokens[next]) {
                    next += 1;
                }

                let fragment = tokens[index..next].concat();
                index = next;

                if index < tokens.len() {
                    yield Ok(Delta::text(fragment));
                } else {
                    yield Ok(Delta::last(fragment));
                }
            }

            if tokens.is_empty() {
                yield Ok(Delta::end());
            }
        })))
    }
}

/// Pick a canned reply for a submitted message.
fn reply_for(message: &str) -> &'static str {
    let message = message.to_lowercase();

    CANNED_REPLIES
        .iter()
        .find(|(key, _)| message.contains(key))
        .map_or(FALLBACK_REPLY, |(_, reply)| reply)
}

/// Split a reply into alternating runs of whitespace and non-whitespace.
///
/// Concatenating the tokens reproduces the reply byte-for-byte.
fn tokenize(reply: &'static str) -> Vec<&'static str> {
    let mut tokens = vec![];
    let mut start = 0;
    let mut in_whitespace = None;

    for (i, c) in reply.char_indices() {
        let whitespace = c.is_whitespace();
        if in_whitespace.is_some_and(|w| w != whitespace) {
            tokens.push(&reply[start..i]);
            start = i;
        }
        in_whitespace = Some(whitespace);
    }

    if start < reply.len() {
        tokens.push(&reply[start..]);
    }

    tokens
}

fn is_whitespace(token: &str) -> bool {
    token.chars().all(char::is_whitespace)
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
