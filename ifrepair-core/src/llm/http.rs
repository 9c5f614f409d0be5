use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{IfError, IfResult};
use crate::prompt::RewritePrompt;

use super::{LlmClient, Provider, TransportRetryConfig};

/// Configuration for a single LLM backend. `base_url` is the full
/// endpoint to POST to (for Gemini this already embeds the model name,
/// per Google's URL-based model selection).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub base_url: String,
    pub model: String,
    /// The actual API key, already resolved from the environment. The
    /// CLI layer is responsible for reading it out of an env var named
    /// by `--api-key-env`, never accepting it as a bare argument.
    pub api_key: String,
    /// Upper bound on completion length. The prompt only ever needs a
    /// single short command back, so this defaults to a small value.
    pub max_tokens: u32,
    /// Sampling temperature. Kept low by default since a rewrite should
    /// be a faithful rephrasing, not a creative one.
    pub temperature: f32,
    pub timeout: Duration,
    pub retry: TransportRetryConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    text: String,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: String,
}

/// Blocking HTTP client covering every provider named in the
/// configuration surface: OpenAI-compatible (also Groq, Together),
/// Gemini, and Anthropic, each behind the same [`LlmClient`] trait.
pub struct HttpLlmClient {
    config: ProviderConfig,
    http: reqwest::blocking::Client,
}

impl HttpLlmClient {
    pub fn new(config: ProviderConfig) -> IfResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IfError::LlmTransport(e.to_string()))?;
        Ok(HttpLlmClient { config, http })
    }

    fn send_once(&self, prompt: &RewritePrompt) -> IfResult<String> {
        match self.config.provider {
            Provider::OpenAiCompatible | Provider::Groq | Provider::Together => {
                self.send_openai_compatible(prompt)
            }
            Provider::Gemini => self.send_gemini(prompt),
            Provider::Anthropic => self.send_anthropic(prompt),
        }
    }

    fn send_openai_compatible(&self, prompt: &RewritePrompt) -> IfResult<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| IfError::LlmTransport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IfError::LlmTransport(format!(
                "provider returned HTTP {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| IfError::LlmResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| IfError::LlmResponse("empty choices array".to_string()))
    }

    fn send_anthropic(&self, prompt: &RewritePrompt) -> IfResult<String> {
        let body = AnthropicRequest {
            model: &self.config.model,
            system: &prompt.system,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt.user,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(&self.config.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .map_err(|e| IfError::LlmTransport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IfError::LlmTransport(format!(
                "provider returned HTTP {}",
                response.status()
            )));
        }

        let parsed: AnthropicResponse = response
            .json()
            .map_err(|e| IfError::LlmResponse(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| IfError::LlmResponse("empty content array".to_string()))
    }

    fn send_gemini(&self, prompt: &RewritePrompt) -> IfResult<String> {
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: &prompt.system,
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: &prompt.user }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let response = self
            .http
            .post(&self.config.base_url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| IfError::LlmTransport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IfError::LlmTransport(format!(
                "provider returned HTTP {}",
                response.status()
            )));
        }

        let parsed: GeminiResponse = response
            .json()
            .map_err(|e| IfError::LlmResponse(e.to_string()))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| IfError::LlmResponse("empty candidates array".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Ok("<NO_VALID_REWRITE>".to_string());
        }

        candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| IfError::LlmResponse("empty content parts".to_string()))
    }
}

impl LlmClient for HttpLlmClient {
    fn complete(&self, prompt: &RewritePrompt) -> IfResult<String> {
        let mut last_err = None;
        for attempt in 0..self.config.retry.max_attempts {
            match self.send_once(prompt) {
                Ok(text) => return Ok(text),
                Err(IfError::LlmResponse(msg)) => {
                    // Malformed response body: not transient, no point retrying.
                    return Err(IfError::LlmResponse(msg));
                }
                Err(e) => {
                    last_err = Some(e);
                    if attempt + 1 < self.config.retry.max_attempts {
                        thread::sleep(self.config.retry.base_delay * 2u32.pow(attempt));
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| IfError::LlmTransport("no attempts made".to_string())))
    }
}
