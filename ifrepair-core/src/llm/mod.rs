//! LLM client contract and the HTTP transports shipped here.
//!
//! The call is made synchronously, blocking the retry worker thread until
//! a response (or timeout) arrives: the producer thread is meant to
//! stall on this call rather than run it concurrently with further
//! input, so no async runtime is pulled in anywhere in this crate.

mod http;

pub use http::{HttpLlmClient, ProviderConfig};

use crate::errors::IfResult;
use crate::prompt::RewritePrompt;

/// One attempt at turning a prompt into raw model output text.
pub trait LlmClient {
    /// Sends `prompt` and blocks until a response or a transport/timeout
    /// error. Implementations must not retry internally beyond
    /// transient-transport backoff — the single-retry-per-command policy
    /// belongs to [`crate::retry`], not the transport.
    fn complete(&self, prompt: &RewritePrompt) -> IfResult<String>;
}

/// The wire shape a provider speaks. Groq and Together are
/// OpenAI-compatible and share its transport; Gemini and Anthropic each
/// have their own request/response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAiCompatible,
    Groq,
    Together,
    Gemini,
    Anthropic,
}

impl Provider {
    /// Parses a `--provider` CLI value. Unrecognized names fall back to
    /// `OpenAiCompatible`, which also covers any other OpenAI-compatible
    /// endpoint (OpenRouter, a local proxy, ...).
    pub fn parse(name: &str) -> Provider {
        match name.to_ascii_lowercase().as_str() {
            "groq" => Provider::Groq,
            "together" => Provider::Together,
            "gemini" => Provider::Gemini,
            "anthropic" => Provider::Anthropic,
            _ => Provider::OpenAiCompatible,
        }
    }
}

/// Transient-failure backoff policy for a single [`LlmClient::complete`]
/// call, distinct from the state machine's one-retry-per-command rule.
#[derive(Debug, Clone)]
pub struct TransportRetryConfig {
    pub max_attempts: u32,
    pub base_delay: std::time::Duration,
}

impl Default for TransportRetryConfig {
    fn default() -> Self {
        TransportRetryConfig {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(250),
        }
    }
}
