//! Rejects a candidate rewrite unless its verb is one the story's own
//! dictionary (or the fixed direction-alias set) recognizes.
//!
//! Only the first word of the candidate — the verb — is hard-checked.
//! Nouns are never hard-checked: dictionaries routinely omit synonyms
//! and aliases for objects the game still understands, so rejecting a
//! rewrite over an unrecognized noun would throw away legitimate
//! rewrites for no benefit.

use crate::errors::{IfError, IfResult};
use crate::sanitizer::SanitizedReply;
use crate::vocabulary::{Vocabulary, DIRECTION_ALIASES};

/// Maximum number of words a rewrite may contain.
const MAX_WORDS: usize = 6;

/// Validates `reply` against `vocab`, returning the accepted command or
/// an error describing why it was rejected.
pub fn validate(reply: &SanitizedReply, vocab: &Vocabulary) -> IfResult<String> {
    let candidate = match reply {
        SanitizedReply::Declined => {
            return Err(IfError::ValidationReject(
                "model declined to propose a rewrite".to_string(),
            ))
        }
        SanitizedReply::Candidate(text) => text,
    };

    let words: Vec<&str> = candidate.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_WORDS {
        return Err(IfError::ValidationReject(format!(
            "word count {} outside the allowed range [1, {MAX_WORDS}]",
            words.len()
        )));
    }

    let verb = words[0].to_ascii_lowercase();
    if DIRECTION_ALIASES.contains(&verb.as_str()) {
        return Ok(candidate.clone());
    }

    if vocab.contains_verb(&verb) {
        Ok(candidate.clone())
    } else {
        Err(IfError::ValidationReject(format!(
            "verb \"{}\" is not in the story's vocabulary",
            words[0]
        )))
    }
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

    #[test]
    fn accepts_known_verb_with_unknown_noun() {
        let vocab = vocab_with(&[("take", DictionaryEntryFlags::VERB)]);
        let reply = SanitizedReply::Candidate("take torch".to_string());
        assert_eq!(validate(&reply, &vocab).unwrap(), "take torch");
    }

    #[test]
    fn rejects_unknown_verb() {
        let vocab = vocab_with(&[("take", DictionaryEntryFlags::VERB)]);
        let reply = SanitizedReply::Candidate("grab lamp".to_string());
        assert!(validate(&reply, &vocab).is_err());
    }

    #[test]
    fn accepts_direction_alias_even_if_not_in_dictionary() {
        let vocab = vocab_with(&[("take", DictionaryEntryFlags::VERB)]);
        let reply = SanitizedReply::Candidate("n".to_string());
        assert_eq!(validate(&reply, &vocab).unwrap(), "n");
    }

    #[test]
    fn rejects_more_than_six_words() {
        let vocab = vocab_with(&[("take", DictionaryEntryFlags::VERB)]);
        let reply = SanitizedReply::Candidate("take the old brass lamp from shelf".to_string());
        assert!(validate(&reply, &vocab).is_err());
    }

    #[test]
    fn rejects_decline_sentinel() {
        let vocab = vocab_with(&[("take", DictionaryEntryFlags::VERB)]);
        assert!(validate(&SanitizedReply::Declined, &vocab).is_err());
    }
}
