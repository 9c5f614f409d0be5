//! Builds the bounded prompt sent to the LLM for a single rewrite attempt.
//!
//! The vocabulary slice shown to the model depends on the failure's
//! kind: an unknown verb gets a verb-heavy slice, an unknown noun gets a
//! noun-heavy slice, and so on. The slice is always capped, so the
//! prompt stays small and the model isn't tempted to invent words
//! outside the truncated list it was shown.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::context::{truncate_chars, GameContext, MAX_GAME_OUTPUT_CHARS};
use crate::failure_detector::{FailureInfo, FailureKind};
use crate::vocabulary::Vocabulary;

/// Dictionary entries are truncated to 6 characters at parse time; this
/// table expands the handful of common verbs/nouns whose truncated form
/// would otherwise look unfamiliar to the model (e.g. `examin` instead
/// of `examine`).
static WORD_EXPANSIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("examin", "examine"),
        ("invent", "inventory"),
        ("activa", "activate"),
        ("extrac", "extract"),
        ("unlock", "unlock"),
        ("disass", "disassemble"),
    ])
});

fn expand(word: &str) -> String {
    WORD_EXPANSIONS
        .get(word)
        .map(|s| s.to_string())
        .unwrap_or_else(|| word.to_string())
}

fn expand_all(words: Vec<String>) -> Vec<String> {
    words.into_iter().map(|w| expand(&w)).collect()
}

fn failure_kind_name(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::None => "none",
        FailureKind::UnknownVerb => "unknown_verb",
        FailureKind::UnknownNoun => "unknown_noun",
        FailureKind::Syntax => "syntax",
        FailureKind::Ambiguity => "ambiguity",
        FailureKind::GameRefusal => "game_refusal",
        FailureKind::CatchAll => "catch_all",
    }
}

/// A fully assembled request to send to the LLM client.
#[derive(Debug, Clone)]
pub struct RewritePrompt {
    pub system: String,
    pub user: String,
}

/// Picks the vocabulary words shown to the model, following the
/// per-failure-type table: verbs for a verb problem, nouns and
/// adjectives for a noun problem, a broader mix for a structural
/// problem, and so on. Kinds that are never rewritable return an empty
/// slice; `attempt_repair` never builds a prompt for them.
fn select_vocabulary_slice(kind: FailureKind, vocab: &Vocabulary) -> Vec<String> {
    let words = match kind {
        FailureKind::UnknownVerb => {
            let mut w = vocab.top_verbs(50);
            w.extend(vocab.all_prepositions());
            w
        }
        FailureKind::UnknownNoun => {
            let mut w = vocab.top_nouns(50);
            w.extend(vocab.top_adjectives(30));
            w
        }
        FailureKind::Syntax => {
            let mut w = vocab.top_verbs(30);
            w.extend(vocab.top_nouns(30));
            w.extend(vocab.all_prepositions());
            w
        }
        FailureKind::CatchAll => {
            let mut w = vocab.top_verbs(30);
            w.extend(vocab.top_nouns(30));
            w
        }
        FailureKind::None | FailureKind::Ambiguity | FailureKind::GameRefusal => Vec::new(),
    };
    expand_all(words)
}

pub fn build(failure: &FailureInfo, context: &GameContext, vocab: &Vocabulary) -> RewritePrompt {
    let slice = select_vocabulary_slice(failure.kind, vocab);
    let separators: String = vocab.word_separators().iter().collect();

    let system = format!(
        "You repair failed text-adventure commands. Your only job is to \
         rephrase the player's last command using the vocabulary you are \
         given; you never supply hints, solve puzzles, or explain game \
         logic. You may only use words from the provided vocabulary list, \
         plus ordinary English articles, pronouns, and the word \
         separators \"{separators}\". Standard interactive-fiction \
         abbreviations are understood: x=examine, i=inventory, l=look, \
         z=wait, and n/s/e/w/ne/nw/se/sw/u/d are compass directions. \
         Normalize idioms to the dictionary's own verbs where possible \
         (\"pick up\" -> \"take\", \"look at\" -> \"examine\", \"check \
         out\" -> \"examine\") and drop politeness words (\"please\", \
         \"could you\"). Reply with a single rewritten command on one \
         line, nothing else. If you cannot produce a command using only \
         the given vocabulary, reply with exactly <NO_VALID_REWRITE>."
    );

    let game_output = truncate_chars(context.last_output(), MAX_GAME_OUTPUT_CHARS);
    let game_output = if game_output.is_empty() {
        "(no prior output)".to_string()
    } else {
        game_output
    };

    let user = format!(
        "Failure type: {failure_type}\n\
         The player typed: \"{command}\"\n\
         The game replied: \"{message}\"\n\
         Last game output: {game_output}\n\n\
         Known vocabulary ({count} words): {words}",
        failure_type = failure_kind_name(failure.kind),
        command = failure.original_command,
        message = truncate_chars(&failure.matched_text, MAX_GAME_OUTPUT_CHARS),
        count = slice.len(),
        words = slice.join(", "),
    );

    RewritePrompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{Dictionary, DictionaryEntry, DictionaryEntryFlags};

    fn vocab_with(words: &[(&str, DictionaryEntryFlags)]) -> Vocabulary {
        let dict = Dictionary {
            word_separators: vec!['.', ','],
            entries: words
                .iter()
                .map(|(text, flags)| DictionaryEntry {
                    text: text.to_string(),
                    flags: *flags,
                    offset: 0,
                })
                .collect(),
            entry_text_bytes: 4,
        };
        Vocabulary::from_dictionary(&dict)
    }

    fn failure(kind: FailureKind, command: &str, message: &str) -> FailureInfo {
        FailureInfo {
            kind,
            original_command: command.to_string(),
            matched_text: message.to_string(),
            is_rewritable: true,
        }
    }

    #[test]
    fn prompt_embeds_command_message_and_failure_type() {
        let vocab = vocab_with(&[("take", DictionaryEntryFlags::VERB)]);
        let f = failure(
            FailureKind::UnknownVerb,
            "grab lamp",
            "I don't know the word \"grab\".",
        );
        let prompt = build(&f, &GameContext::new(), &vocab);
        assert!(prompt.user.contains("grab lamp"));
        assert!(prompt.user.contains("take"));
        assert!(prompt.user.contains("unknown_verb"));
        assert!(prompt.system.contains("<NO_VALID_REWRITE>"));
    }

    #[test]
    fn unknown_verb_slice_is_verbs_and_prepositions() {
        let vocab = vocab_with(&[
            ("take", DictionaryEntryFlags::VERB),
            ("lamp", DictionaryEntryFlags::NOUN),
            ("with", DictionaryEntryFlags::PREPOSITION),
        ]);
        let slice = select_vocabulary_slice(FailureKind::UnknownVerb, &vocab);
        assert!(slice.contains(&"take".to_string()));
        assert!(slice.contains(&"with".to_string()));
        assert!(!slice.contains(&"lamp".to_string()));
    }

    #[test]
    fn unknown_noun_slice_is_nouns_and_adjectives() {
        let vocab = vocab_with(&[
            ("take", DictionaryEntryFlags::VERB),
            ("lamp", DictionaryEntryFlags::NOUN),
            ("brass", DictionaryEntryFlags::ADJECTIVE),
        ]);
        let slice = select_vocabulary_slice(FailureKind::UnknownNoun, &vocab);
        assert!(slice.contains(&"lamp".to_string()));
        assert!(slice.contains(&"brass".to_string()));
        assert!(!slice.contains(&"take".to_string()));
    }

    #[test]
    fn non_rewritable_kinds_get_no_slice() {
        let vocab = vocab_with(&[("take", DictionaryEntryFlags::VERB)]);
        assert!(select_vocabulary_slice(FailureKind::Ambiguity, &vocab).is_empty());
        assert!(select_vocabulary_slice(FailureKind::GameRefusal, &vocab).is_empty());
    }

    #[test]
    fn truncated_dictionary_words_are_expanded_for_legibility() {
        let vocab = vocab_with(&[("examin", DictionaryEntryFlags::VERB)]);
        let slice = select_vocabulary_slice(FailureKind::UnknownVerb, &vocab);
        assert!(slice.contains(&"examine".to_string()));
    }

    #[test]
    fn long_game_output_is_truncated_to_500_chars() {
        let vocab = vocab_with(&[("take", DictionaryEntryFlags::VERB)]);
        let f = failure(FailureKind::UnknownVerb, "grab lamp", "grab?");
        let mut ctx = GameContext::new();
        ctx.set_last_output(&"a".repeat(900));
        let prompt = build(&f, &ctx, &vocab);
        assert!(prompt.user.contains(&"a".repeat(MAX_GAME_OUTPUT_CHARS)));
        assert!(!prompt.user.contains(&"a".repeat(MAX_GAME_OUTPUT_CHARS + 1)));
    }
}
