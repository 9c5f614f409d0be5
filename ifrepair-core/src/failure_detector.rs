//! Classifies interpreter output as a parser failure worth attempting a
//! repair on.
//!
//! Classification runs as an ordered list of checks: short-circuit
//! non-errors, room-description prefixes, status-line shapes,
//! game-refusal patterns, ambiguity patterns, unknown-verb patterns,
//! unknown-noun patterns, and finally a terse-reply catch-all heuristic.
//! The first check that matches wins; later checks never run.

use once_cell::sync::Lazy;
use regex::Regex;

/// The category a detected failure falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Not actually a failure: ordinary narration, a room description, or
    /// a status line. `detect` never returns this wrapped in a
    /// `FailureInfo`; it is part of the taxonomy for completeness and
    /// for callers that classify output directly.
    None,
    /// "I don't know the word ...", "That's not a verb I recognise."
    UnknownVerb,
    /// "You can't see any such thing." / "There is no ... here."
    UnknownNoun,
    /// A malformed sentence the parser couldn't structure at all. No
    /// pattern in the ordered check list below currently produces this
    /// kind on its own output; it exists so the taxonomy, the prompt's
    /// per-kind vocabulary table, and the validator all have a case for
    /// it if a future pattern is added.
    Syntax,
    /// "Which do you mean, the brass key or the silver key?"
    Ambiguity,
    /// "You can't do that." / "It's already open." — the game understood
    /// the command fine and is refusing it for in-world reasons.
    GameRefusal,
    /// Didn't match any named pattern, but still looks like a short,
    /// dismissive, non-narrative reply.
    CatchAll,
}

/// A parser failure detected in the interpreter's transcript output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInfo {
    pub kind: FailureKind,
    /// The exact command the player typed that triggered this failure.
    pub original_command: String,
    /// The portion of interpreter output that drove classification,
    /// preserved verbatim so it can be disclosed to the player if a
    /// retry also fails.
    pub matched_text: String,
    /// True only for `UnknownVerb`, `UnknownNoun`, `Syntax`, and
    /// `CatchAll` — the kinds a vocabulary-bounded rewrite can plausibly
    /// fix. `Ambiguity` and `GameRefusal` are never rewritable: the game
    /// parsed the command correctly and a different phrasing wouldn't
    /// change its answer.
    pub is_rewritable: bool,
}

fn is_rewritable(kind: FailureKind) -> bool {
    matches!(
        kind,
        FailureKind::UnknownVerb
            | FailureKind::UnknownNoun
            | FailureKind::Syntax
            | FailureKind::CatchAll
    )
}

/// Case-insensitive whole-string prefixes that mark ordinary room
/// description narration, never a parser failure.
const ROOM_DESCRIPTION_PREFIXES: &[&str] = &[
    "you are standing",
    "you are in",
    "you are at",
    "this is",
    "you can see",
    "there is a",
    "there is an",
    "there is nothing",
    "to the north",
    "to the south",
    "to the east",
    "to the west",
    "exits:",
    "obvious exits:",
];

static RE_STATUS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(score:\s*-?\d+|moves:\s*\d+|\s*\d+\.\s+\S|>?\s*$|>|\[.*\])").unwrap()
});

static RE_GAME_REFUSAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(you can'?t do that|nothing to \w+|that'?s nothing to \w+|it'?s (too dark|pitch dark|dark) to see|it'?s (too dark|pitch dark|dark)\.|you(?: are not|'?re not) holding|you don'?t have|there(?: is|'?s) nothing (?:here|there)|it'?s locked|it'?s (?:already )?(?:open|closed|locked)|you can'?t (?:go|open|close|take))",
    )
    .unwrap()
});

static RE_AMBIGUITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(which do you mean,|do you mean the |the word ["'].*?["'] (?:should be|is) (?:not|unused))"#).unwrap()
});

static RE_UNKNOWN_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(i don'?t know the word ["'].*?["']|i don'?t understand (?:that|this) sentence|i don'?t understand the word|i didn'?t understand (?:that|this) sentence|you used the word ["'].*?["'] in a way that i don'?t understand|i don'?t know how to|that'?s not a verb i recognis[ez]|that sentence (?:is not|isn'?t) one i recognis[ez]|i can'?t see that|i only understood you as far as|you seem to have said too much)"#,
    )
    .unwrap()
});

static RE_UNKNOWN_NOUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(you can'?t see any such thing|i don'?t see (?:that|the|any)?|there (?:is|are) (?:no|none of that) (?:here|here now|there|available)|you don'?t see that here|you can'?t see (?:a|the|any) .*(?:here|there|now)|i can'?t find (?:a|the|any)|what do you want to|(?:that|this) is not (?:available|here|present))",
    )
    .unwrap()
});

const STRONG_ERROR_TOKENS: &[&str] = &[
    "error", "invalid", "unknown", "impossible", "sorry", "try again", "no way", "huh", "what",
    "pardon",
];

static NARRATIVE_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^The [A-Z][a-z]+ed\.?$").unwrap(),
        Regex::new(r"^You [a-z]+ed (?:the |a |an )?").unwrap(),
        Regex::new(r"^A[n]? [a-zA-Z][a-z]+.*\.$").unwrap(),
        Regex::new(r"^[A-Z][a-z]+ [a-z]+.*\.$").unwrap(),
    ]
});

fn matches_narrative_shape(text: &str) -> bool {
    NARRATIVE_SHAPES.iter().any(|re| re.is_match(text))
}

fn looks_like_catch_all(text: &str) -> bool {
    if text.is_empty() || text.len() >= 80 || text.contains('\n') {
        return false;
    }
    if ROOM_DESCRIPTION_PREFIXES
        .iter()
        .any(|p| text.to_ascii_lowercase().starts_with(p))
    {
        return false;
    }
    if RE_STATUS_LINE.is_match(text) {
        return false;
    }
    let lowered = text.to_ascii_lowercase();
    let has_error_token = STRONG_ERROR_TOKENS.iter().any(|t| lowered.contains(t));
    has_error_token || !matches_narrative_shape(text)
}

/// Runs the ordered check list against one block of interpreter output
/// and returns the kind it belongs to, `FailureKind::None` if it isn't a
/// failure at all.
fn classify(output: &str) -> FailureKind {
    let trimmed = output.trim();

    // 1. Short-circuit non-errors.
    if trimmed.is_empty() || trimmed == ">" || trimmed.starts_with('[') {
        return FailureKind::None;
    }
    // 2. Room-description prefixes.
    let lowered = trimmed.to_ascii_lowercase();
    if ROOM_DESCRIPTION_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return FailureKind::None;
    }
    // 3. Status-line shapes.
    if RE_STATUS_LINE.is_match(trimmed) {
        return FailureKind::None;
    }
    // 4. Game-refusal patterns.
    if RE_GAME_REFUSAL.is_match(trimmed) {
        return FailureKind::GameRefusal;
    }
    // 5. Ambiguity patterns.
    if RE_AMBIGUITY.is_match(trimmed) {
        return FailureKind::Ambiguity;
    }
    // 6. Unknown-verb patterns.
    if RE_UNKNOWN_VERB.is_match(trimmed) {
        return FailureKind::UnknownVerb;
    }
    // 7. Unknown-noun patterns.
    if RE_UNKNOWN_NOUN.is_match(trimmed) {
        return FailureKind::UnknownNoun;
    }
    // 8. Catch-all heuristic.
    if looks_like_catch_all(trimmed) {
        return FailureKind::CatchAll;
    }
    FailureKind::None
}

/// Examines one block of interpreter output following `command`. Returns
/// `None` if it doesn't look like a parser failure.
pub fn detect(command: &str, interpreter_output: &str) -> Option<FailureInfo> {
    let kind = classify(interpreter_output);
    if kind == FailureKind::None {
        return None;
    }
    Some(FailureInfo {
        kind,
        original_command: command.to_string(),
        matched_text: interpreter_output.trim().to_string(),
        is_rewritable: is_rewritable(kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unknown_verb() {
        let info = detect("xyzzy frob", "I don't know the word \"frob\".").unwrap();
        assert_eq!(info.kind, FailureKind::UnknownVerb);
        assert!(info.is_rewritable);
    }

    #[test]
    fn detects_unknown_noun() {
        let info = detect("take lamp", "You can't see any such thing.").unwrap();
        assert_eq!(info.kind, FailureKind::UnknownNoun);
        assert!(info.is_rewritable);
    }

    #[test]
    fn detects_ambiguity_and_marks_unrewritable() {
        let info = detect(
            "take key",
            "Which do you mean, the brass key or the silver key?",
        )
        .unwrap();
        assert_eq!(info.kind, FailureKind::Ambiguity);
        assert!(!info.is_rewritable);
    }

    #[test]
    fn detects_game_refusal_and_marks_unrewritable() {
        let info = detect("eat door", "You can't do that.").unwrap();
        assert_eq!(info.kind, FailureKind::GameRefusal);
        assert!(!info.is_rewritable);
    }

    #[test]
    fn catch_all_matches_terse_reply_under_eighty_chars() {
        let text = "huh?".to_string() + &"?".repeat(75); // 79 chars total
        assert_eq!(text.len(), 79);
        let info = detect("fooble", &text).unwrap();
        assert_eq!(info.kind, FailureKind::CatchAll);
        assert!(info.is_rewritable);
    }

    #[test]
    fn eighty_char_terse_reply_is_not_catch_all() {
        let text = "huh?".to_string() + &"?".repeat(76); // 80 chars total
        assert_eq!(text.len(), 80);
        assert!(detect("fooble", &text).is_none());
    }

    #[test]
    fn multiline_output_is_never_catch_all() {
        assert!(detect("fooble", "huh?\nhuh?").is_none());
    }

    #[test]
    fn ordinary_narration_is_not_a_failure() {
        assert!(detect("look", "You are standing in an open field.").is_none());
    }

    #[test]
    fn empty_output_is_not_a_failure() {
        assert!(detect("z", "").is_none());
    }

    #[test]
    fn single_prompt_char_is_not_a_failure() {
        assert!(detect("z", ">").is_none());
    }

    #[test]
    fn bracketed_output_is_not_a_failure() {
        assert!(detect("z", "[Your score has gone up.]").is_none());
    }
}
