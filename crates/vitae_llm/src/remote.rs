//! Streaming client for a hosted completion endpoint.

pub mod sse;

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt as _;
use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};
use vitae_conversation::Role;

use crate::{
    delta::Delta,
    error::{Error, Result},
    source::{ChatMessage, DeltaStream, Source},
};

/// Model identifier sent when none is configured.
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";

/// Sampling temperature sent when none is configured.
pub const DEFAULT_TEMPERATURE: f64 = 0.5;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const MAX_TOKENS: u32 = 1024;

/// Marks the end of the event stream.
const DONE_SENTINEL: &str = "[DONE]";

/// A delta source backed by a remote completion endpoint.
///
/// Opens one long-lived request per turn and reads the server-sent event
/// stream it returns. There is no retry: a failed request fails the turn, and
/// the user decides whether to ask again.
#[derive(Debug, Clone)]
pub struct Remote {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    system_prompt: String,
    http_client: reqwest::Client,
}

impl Remote {
    #[must_use]
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            http_client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the default system prompt, e.g. to speak as a specific
    /// profile.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Build HTTP headers required for making API calls.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", self.api_key)
                .parse()
                .map_err(|e| Error::Config(format!("Invalid API key header format: {e}")))?,
        );

        Ok(headers)
    }

    fn build_request(&self, history: Vec<ChatMessage>, message: &str) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(RequestMessage::system(&self.system_prompt));
        messages.extend(history.into_iter().map(Into::into));
        messages.push(RequestMessage {
            role: WireRole::User,
            content: message.to_owned(),
        });

        CompletionRequest {
            messages,
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: MAX_TOKENS,
            stream: true,
        }
    }
}

#[async_trait]
impl Source for Remote {
    async fn deltas(
        &self,
        history: Vec<ChatMessage>,
        message: &str,
        cancel: CancellationToken,
    ) -> Result<DeltaStream> {
        let url = format!("{}/api/chat/completions", self.base_url);
        let headers = self.build_headers()?;
        let request = self.build_request(history, message);

        debug!(%url, model = %request.model, messages = request.messages.len(), "Starting completion stream.");

        let response = tokio::select! {
            () = cancel.cancelled() => {
                debug!("Request cancelled before a response arrived.");
                return Ok(Box::pin(futures::stream::empty()));
            }
            response = self.http_client.post(&url).headers(headers).json(&request).send() => response?,
        };

        let status = response.status();
        trace!(
            status = status.as_u16(),
            content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .map(|v| v.to_str().unwrap_or_default()),
            "Received response."
        );

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            let message = error_body(response).await;
            error!(status = status.as_u16(), message, "Credentials rejected.");
            return Err(Error::Auth {
                status: status.as_u16(),
                message,
            });
        }

        if status.is_client_error() || status.is_server_error() {
            let body = error_body(response).await;
            error!(status = status.as_u16(), body, "Unexpected response.");
            return Err(Error::Protocol(format!("status {status}: {body}")));
        }

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/event-stream"));
        if !is_event_stream {
            return Err(Error::Protocol(
                "response is not an event stream".to_owned(),
            ));
        }

        let mut bytes = response.bytes_stream();

        Ok(Box::pin(stream!({
            let mut parser = sse::FrameParser::default();

            loop {
                let chunk = tokio::select! {
                    () = cancel.cancelled() => {
                        // Dropping the byte stream aborts the request.
                        debug!("Completion stream cancelled.");
                        return;
                    }
                    chunk = bytes.next() => chunk,
                };

                let Some(chunk) = chunk else { break };
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(error) => {
                        warn!(%error, "Error reading completion stream chunk.");
                        yield Err(Error::Transport(error));
                        return;
                    }
                };

                let (deltas, done) = chunk_deltas(&mut parser, &chunk);
                for delta in deltas {
                    yield Ok(delta);
                }

                if done {
                    return;
                }
            }

            // The server closed the stream without a sentinel. Whatever
            // arrived is the whole reply; flush any trailing frame and
            // finish the turn.
            if let Some(payload) = parser.finish()
                && let Payload::Fragment(fragment) = parse_payload(&payload)
            {
                yield Ok(Delta::text(fragment));
            }

            yield Ok(Delta::end());
        })))
    }
}

#[derive(Debug)]
enum Payload {
    Fragment(String),
    Done,
    Skip,
}

/// Parse one event payload.
///
/// Malformed payloads and empty fragments are skipped, never fatal.
fn parse_payload(payload: &str) -> Payload {
    if payload == DONE_SENTINEL {
        return Payload::Done;
    }

    match serde_json::from_str::<CompletionEvent>(payload) {
        Ok(event) if event.content.is_empty() => Payload::Skip,
        Ok(event) => Payload::Fragment(event.content),
        Err(error) => {
            warn!(%error, payload, "Skipping malformed event payload.");
            Payload::Skip
        }
    }
}

/// Convert one network chunk into deltas.
///
/// Stops at the end-of-stream sentinel: anything the server sends after it,
/// even within the same chunk, is dropped, so the terminal delta is always
/// the last item of the stream.
fn chunk_deltas(parser: &mut sse::FrameParser, chunk: &[u8]) -> (Vec<Delta>, bool) {
    let mut deltas = vec![];

    for payload in parser.push(chunk) {
        match parse_payload(&payload) {
            Payload::Fragment(fragment) => deltas.push(Delta::text(fragment)),
            Payload::Done => {
                deltas.push(Delta::end());
                return (deltas, true);
            }
            Payload::Skip => {}
        }
    }

    (deltas, false)
}

async fn error_body(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();

    // Endpoints report errors as `{"error": "..."}`; fall back to the raw
    // body when the shape differs.
    serde_json::from_str::<ErrorEvent>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}

#[derive(Debug, Clone, Serialize)]
struct CompletionRequest {
    messages: Vec<RequestMessage>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Clone, Serialize)]
struct RequestMessage {
    role: WireRole,
    content: String,
}

impl RequestMessage {
    fn system(content: &str) -> Self {
        Self {
            role: WireRole::System,
            content: content.to_owned(),
        }
    }
}

impl From<ChatMessage> for RequestMessage {
    fn from(message: ChatMessage) -> Self {
        Self {
            role: match message.role {
                Role::User => WireRole::User,
                Role::Assistant => WireRole::Assistant,
            },
            content: message.content,
        }
    }
}

/// The wire protocol knows a third role the transcript never holds.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum WireRole {
    System,
    User,
    Assistant,
}

/// The JSON payload of a single event: one incremental text fragment.
#[derive(Debug, Deserialize)]
struct CompletionEvent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEvent {
    error: String,
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
