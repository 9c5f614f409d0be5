//! Cleans raw LLM completion text into a single candidate command.
//!
//! Applied in a fixed order: trim, check for the decline sentinel, strip
//! known prefixes, unwrap a matching pair of quotes, keep only the text
//! after the first colon (if any), collapse whitespace, strip trailing
//! punctuation, and lowercase.

/// The result of sanitizing one raw LLM completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizedReply {
    /// A single candidate command, lowercase, trimmed of wrapping quotes
    /// and trailing punctuation.
    Candidate(String),
    /// The model explicitly declined (`<NO_VALID_REWRITE>`, or an empty
    /// reply).
    Declined,
}

const DECLINE_SENTINEL: &str = "<no_valid_rewrite>";

const KNOWN_PREFIXES: &[&str] = &[">", "Command:", "Rewrite:", "The command is:"];

/// Strips a matching pair of leading/trailing quote characters.
fn strip_wrapping_quotes(s: &str) -> &str {
    let quotes = ['"', '\''];
    if s.chars().count() >= 2 {
        let first = s.chars().next().unwrap();
        let last = s.chars().last().unwrap();
        if quotes.contains(&first) && first == last {
            return &s[first.len_utf8()..s.len() - last.len_utf8()];
        }
    }
    s
}

fn strip_known_prefix(s: &str) -> &str {
    let lowered = s.to_ascii_lowercase();
    for prefix in KNOWN_PREFIXES {
        if lowered.starts_with(&prefix.to_ascii_lowercase()) {
            return s[prefix.len()..].trim_start();
        }
    }
    s
}

pub fn sanitize(raw: &str) -> SanitizedReply {
    let trimmed = raw.trim();

    if trimmed.to_ascii_lowercase().contains(DECLINE_SENTINEL) {
        return SanitizedReply::Declined;
    }

    let stripped = strip_known_prefix(trimmed);
    let unquoted = strip_wrapping_quotes(stripped).trim();

    let after_colon = if let Some(idx) = unquoted.find(':') {
        let candidate = unquoted[idx + 1..].trim();
        if candidate.is_empty() {
            unquoted
        } else {
            candidate
        }
    } else {
        unquoted
    };

    let collapsed: String = after_colon.split_whitespace().collect::<Vec<_>>().join(" ");
    let depunctuated = collapsed.trim_end_matches(['.', '!', '?', ',', ':']).trim();
    let lowered = depunctuated.to_ascii_lowercase();

    if lowered.is_empty() {
        SanitizedReply::Declined
    } else {
        SanitizedReply::Candidate(lowered)
    }
}
