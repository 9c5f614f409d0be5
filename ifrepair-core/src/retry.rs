//! Orchestrates a single repair attempt: prompt, LLM call, sanitize,
//! validate, and (if accepted) a one-shot replay.
//!
//! Two invariants this module exists to uphold:
//!
//! - **Single-retry**: a given failed command is rewritten and replayed
//!   at most once. If the replay itself fails, no further rewrite is
//!   attempted for it.
//! - **Disclosure**: whenever a retry does not end in a successful
//!   replay, the player must see the *original* interpreter failure
//!   message, not a single bare "can't" with no explanation swallowed.
//!
//! A failure that isn't rewritable (`Ambiguity`, `GameRefusal`) never
//! reaches the LLM at all: there is no rephrasing that would change the
//! game's answer, so `attempt_repair` discloses immediately.

use crate::context::GameContext;
use crate::errors::IfResult;
use crate::failure_detector::FailureInfo;
use crate::llm::LlmClient;
use crate::prompt;
use crate::sanitizer::{sanitize, SanitizedReply};
use crate::telemetry::{TelemetryEvent, TelemetryLogger};
use crate::validator::validate;
use crate::vocabulary::Vocabulary;

/// What the caller should do next, handed back once this module has
/// finished its part of a single repair attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// A validated rewrite ready to send to the interpreter in place of
    /// the original command. The caller replays it exactly once; this
    /// state machine does not see whether that replay itself succeeds.
    Replay(String),
    /// No rewrite could be produced or validated. The caller must show
    /// `original_message` to the player, unedited.
    Disclose { original_message: String },
}

/// Runs one repair attempt for `failure`, blocking on the LLM call if
/// the failure is rewritable at all.
pub fn attempt_repair(
    failure: &FailureInfo,
    context: &GameContext,
    vocab: &Vocabulary,
    llm: &dyn LlmClient,
    telemetry: &dyn TelemetryLogger,
) -> RetryOutcome {
    if !failure.is_rewritable {
        return disclose(failure);
    }

    let built_prompt = prompt::build(failure, context, vocab);

    let raw = match llm.complete(&built_prompt) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("llm transport error: {e}");
            telemetry.log(TelemetryEvent::rewrite_attempt(
                &failure.original_command,
                None,
                failure.kind,
                failure.is_rewritable,
                &failure.matched_text,
            ));
            return disclose(failure);
        }
    };

    let sanitized = sanitize(&raw);
    let validated = match &sanitized {
        SanitizedReply::Declined => None,
        SanitizedReply::Candidate(_) => validate(&sanitized, vocab).ok(),
    };

    telemetry.log(TelemetryEvent::rewrite_attempt(
        &failure.original_command,
        validated.clone(),
        failure.kind,
        failure.is_rewritable,
        &failure.matched_text,
    ));

    match validated {
        Some(candidate) => RetryOutcome::Replay(candidate),
        None => disclose(failure),
    }
}

fn disclose(failure: &FailureInfo) -> RetryOutcome {
    RetryOutcome::Disclose {
        original_message: failure.matched_text.clone(),
    }
}

/// Records whether the single allowed replay itself succeeded, so the
/// caller's session loop can decide whether to disclose the original
/// failure after a failed replay: a failed replay always falls back to
/// the original message, never the replay's own failure text.
pub fn finalize_replay(
    failure: &FailureInfo,
    rewrite: &str,
    replay_succeeded: bool,
    retry_output: &str,
    telemetry: &dyn TelemetryLogger,
) -> IfResult<Option<String>> {
    telemetry.log(TelemetryEvent::retry_result(
        &failure.original_command,
        rewrite,
        replay_succeeded,
        retry_output,
    ));
    if replay_succeeded {
        Ok(None)
    } else {
        Ok(Some(failure.matched_text.clone()))
    }
}
