mod client;
mod errors;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use ifrepair_core::config::{default_provider_config, RewriterConfigBuilder};
use ifrepair_core::telemetry::{JsonlTelemetryLogger, NullTelemetryLogger, TelemetryLogger};
use ifrepair_core::Provider;

use client::IFTerminalClient;
use errors::{IFtError, IFtResult};

/// Terminal client that wraps a Z-machine interpreter with an
/// LLM-backed parser-repair layer: failed commands get one
/// vocabulary-bounded rewrite attempt before the original failure is
/// ever shown to the player.
#[derive(Parser, Debug)]
#[command(name = "ifrepair-term", version, about)]
struct Cli {
    /// The story file to play.
    story: PathBuf,

    /// Command used to launch the underlying Z-machine interpreter
    /// (e.g. "dfrotz", "frotz -q"). Only the first word is used as the
    /// executable; arguments beyond the story path are not forwarded.
    #[arg(long, default_value = "dfrotz")]
    interpreter: String,

    /// Which backend wire format to speak: "openai" (also covers any
    /// other OpenAI-compatible endpoint), "groq", "together", "gemini",
    /// or "anthropic".
    #[arg(long, default_value = "openai")]
    provider: String,

    /// Endpoint to POST completion requests to.
    #[arg(long, default_value = "https://api.openai.com/v1/chat/completions")]
    provider_url: String,

    /// Model name to request from the provider.
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Name of the environment variable holding the provider API key.
    /// The key itself is never accepted as a bare CLI argument.
    #[arg(long, default_value = "IFREPAIR_API_KEY")]
    api_key_env: String,

    /// Upper bound on completion length.
    #[arg(long, default_value_t = 50)]
    max_tokens: u32,

    /// Sampling temperature for the rewrite model.
    #[arg(long, default_value_t = 0.3)]
    temperature: f32,

    /// Hard wall-clock timeout for a single LLM call, in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Directory to append telemetry to, one `<story>_<date>.jsonl` file
    /// per day. If omitted, telemetry is discarded.
    #[arg(long)]
    telemetry_dir: Option<PathBuf>,
}

fn telemetry_file_path(dir: &std::path::Path, story: &std::path::Path) -> PathBuf {
    let game_name = story
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("story");
    let date = chrono::Local::now().format("%Y-%m-%d");
    dir.join(format!("{game_name}_{date}.jsonl"))
}

fn main() -> IFtResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    let api_key = std::env::var(&cli.api_key_env)
        .map_err(|_| IFtError::MissingApiKeyEnv(cli.api_key_env.clone()))?;

    let mut provider = default_provider_config(
        Provider::parse(&cli.provider),
        cli.provider_url,
        cli.model,
        api_key,
    );
    provider.max_tokens = cli.max_tokens;
    provider.temperature = cli.temperature;
    provider.timeout = Duration::from_millis(cli.timeout_ms);

    let config = RewriterConfigBuilder::new(provider).build();

    let telemetry: Box<dyn TelemetryLogger> = match &cli.telemetry_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = telemetry_file_path(dir, &cli.story);
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Box::new(JsonlTelemetryLogger::new(file))
        }
        None => Box::new(NullTelemetryLogger),
    };

    let mut client = IFTerminalClient::spawn(&cli.story, &cli.interpreter, config, telemetry)?;
    client.run()
}
