//! Structured JSONL event log for a repair session.
//!
//! Writes one `serde_json` object per line and logs write failures
//! through the `log` facade rather than panicking — telemetry is a side
//! channel, never allowed to take the session down with it. Events are
//! buffered in memory and flushed in batches of 10, with an unconditional
//! flush on shutdown so nothing queued is lost.

use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;

use crate::context::{truncate_chars, MAX_GAME_OUTPUT_CHARS};
use crate::failure_detector::FailureKind;

/// Number of buffered events that triggers a flush.
const FLUSH_BATCH_SIZE: usize = 10;

/// One event in a repair session's telemetry stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type")]
pub enum TelemetryEvent {
    /// Logged once per rewrite attempt, whether or not a usable rewrite
    /// was produced.
    #[serde(rename = "rewrite_attempt")]
    RewriteAttempt {
        timestamp: String,
        original_command: String,
        rewrite: Option<String>,
        rewrite_exists: bool,
        #[serde(serialize_with = "serialize_failure_kind")]
        failure_type: FailureKind,
        is_rewritable: bool,
        game_output: String,
    },
    /// Logged once a replayed rewrite's outcome is known.
    #[serde(rename = "retry_result")]
    RetryResult {
        timestamp: String,
        original_command: String,
        rewrite: String,
        success: bool,
        retry_output: String,
    },
}

impl TelemetryEvent {
    pub fn rewrite_attempt(
        original_command: &str,
        rewrite: Option<String>,
        failure_type: FailureKind,
        is_rewritable: bool,
        game_output: &str,
    ) -> Self {
        TelemetryEvent::RewriteAttempt {
            timestamp: now(),
            original_command: original_command.to_string(),
            rewrite_exists: rewrite.is_some(),
            rewrite,
            failure_type,
            is_rewritable,
            game_output: truncate_chars(game_output, MAX_GAME_OUTPUT_CHARS),
        }
    }

    pub fn retry_result(
        original_command: &str,
        rewrite: &str,
        success: bool,
        retry_output: &str,
    ) -> Self {
        TelemetryEvent::RetryResult {
            timestamp: now(),
            original_command: original_command.to_string(),
            rewrite: rewrite.to_string(),
            success,
            retry_output: truncate_chars(retry_output, MAX_GAME_OUTPUT_CHARS),
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn serialize_failure_kind<S>(kind: &FailureKind, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let name = match kind {
        FailureKind::None => "none",
        FailureKind::UnknownVerb => "unknown_verb",
        FailureKind::UnknownNoun => "unknown_noun",
        FailureKind::Syntax => "syntax",
        FailureKind::Ambiguity => "ambiguity",
        FailureKind::GameRefusal => "game_refusal",
        FailureKind::CatchAll => "catch_all",
    };
    serializer.serialize_str(name)
}

/// Receives telemetry events as a session runs.
pub trait TelemetryLogger: Send + Sync {
    fn log(&self, event: TelemetryEvent);

    /// Forces any buffered events to be written. The default is a no-op
    /// for loggers (like [`NullTelemetryLogger`]) that never buffer.
    fn flush(&self) {}
}

/// Discards every event; used in tests and wherever telemetry is
/// explicitly disabled.
pub struct NullTelemetryLogger;

impl TelemetryLogger for NullTelemetryLogger {
    fn log(&self, _event: TelemetryEvent) {}
}

/// Writes one JSON object per line to an arbitrary writer (typically a
/// file opened in append mode). Write failures are logged and
/// swallowed: telemetry must never interrupt a session.
pub struct JsonlTelemetryLogger<W: Write + Send> {
    state: Mutex<JsonlState<W>>,
}

struct JsonlState<W: Write + Send> {
    writer: W,
    buffer: Vec<TelemetryEvent>,
}

impl<W: Write + Send> JsonlTelemetryLogger<W> {
    pub fn new(writer: W) -> Self {
        JsonlTelemetryLogger {
            state: Mutex::new(JsonlState {
                writer,
                buffer: Vec::with_capacity(FLUSH_BATCH_SIZE),
            }),
        }
    }

    fn flush_locked(state: &mut JsonlState<W>) {
        for event in state.buffer.drain(..) {
            if let Err(e) = serde_json::to_writer(&mut state.writer, &event) {
                log::warn!("failed to write telemetry event: {e}");
                continue;
            }
            if let Err(e) = writeln!(state.writer) {
                log::warn!("failed to write telemetry event: {e}");
            }
        }
    }
}

impl<W: Write + Send> TelemetryLogger for JsonlTelemetryLogger<W> {
    fn log(&self, event: TelemetryEvent) {
        let mut guard = match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.buffer.push(event);
        if guard.buffer.len() >= FLUSH_BATCH_SIZE {
            Self::flush_locked(&mut guard);
        }
    }

    fn flush(&self) {
        let mut guard = match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        Self::flush_locked(&mut guard);
    }
}

impl<W: Write + Send> Drop for JsonlTelemetryLogger<W> {
    fn drop(&mut self) {
        self.flush();
    }
}
