//! Immutable session configuration.
//!
//! Built with a builder-then-freeze shape: fields are set individually,
//! then a single immutable value is handed to the rest of the crate.

use std::time::Duration;

use crate::llm::{Provider, ProviderConfig, TransportRetryConfig};

/// Default upper bound on a single rewrite completion.
const DEFAULT_MAX_TOKENS: u32 = 50;
/// Default sampling temperature: low enough that a rewrite stays a
/// faithful rephrasing rather than a creative one.
const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default hard wall-clock timeout for a single LLM call.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Frozen configuration for one repair session. Constructed once at
/// startup via [`RewriterConfigBuilder`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RewriterConfig {
    pub provider: ProviderConfig,
    pub idle_flush: Duration,
}

pub struct RewriterConfigBuilder {
    provider: ProviderConfig,
    idle_flush: Duration,
}

impl RewriterConfigBuilder {
    pub fn new(provider: ProviderConfig) -> Self {
        RewriterConfigBuilder {
            provider,
            idle_flush: Duration::from_millis(150),
        }
    }

    pub fn idle_flush(mut self, duration: Duration) -> Self {
        self.idle_flush = duration;
        self
    }

    pub fn build(self) -> RewriterConfig {
        RewriterConfig {
            provider: self.provider,
            idle_flush: self.idle_flush,
        }
    }
}

/// Builds a [`ProviderConfig`] with the configuration surface's defaults
/// (`max_tokens = 50`, `temperature = 0.3`, `timeout_ms = 30000`).
pub fn default_provider_config(
    provider: Provider,
    base_url: String,
    model: String,
    api_key: String,
) -> ProviderConfig {
    ProviderConfig {
        provider,
        base_url,
        model,
        api_key,
        max_tokens: DEFAULT_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
        timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        retry: TransportRetryConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_overrides() {
        let provider = default_provider_config(
            Provider::OpenAiCompatible,
            "https://api.example.test/v1/chat/completions".to_string(),
            "gpt-test".to_string(),
            "sk-test".to_string(),
        );
        let config = RewriterConfigBuilder::new(provider)
            .idle_flush(Duration::from_millis(500))
            .build();
        assert_eq!(config.idle_flush, Duration::from_millis(500));
    }

    #[test]
    fn builder_defaults_are_sane() {
        let provider = default_provider_config(
            Provider::OpenAiCompatible,
            "https://api.example.test".to_string(),
            "m".to_string(),
            "k".to_string(),
        );
        assert_eq!(provider.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(provider.temperature, DEFAULT_TEMPERATURE);
        let config = RewriterConfigBuilder::new(provider).build();
        assert_eq!(config.idle_flush, Duration::from_millis(150));
    }
}
