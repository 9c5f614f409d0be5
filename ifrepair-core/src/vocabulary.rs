//! The story's known-word surface, derived once from its dictionary and
//! held immutable for the lifetime of a session: a thin owning wrapper
//! with `&str`-returning accessors over the [`Dictionary`] parsed by
//! [`crate::dictionary`].

use std::collections::BTreeSet;

use crate::dictionary::{Dictionary, DictionaryEntryFlags};

/// Movement directions are never a dictionary flag bit; the validator
/// and the vocabulary both treat this fixed set as always known,
/// independent of how (or whether) a story's dictionary tags them.
pub const DIRECTION_ALIASES: &[&str] = &[
    "n", "s", "e", "w", "ne", "nw", "se", "sw", "u", "d", "up", "down",
];

/// Which of the four case-folded string sets a dictionary entry's text
/// was added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCategory {
    Verb,
    Noun,
    Adjective,
    Preposition,
    /// Doesn't carry any of the four recognized flag bits.
    Misc,
}

/// Vocabulary-bounded view over a story's dictionary: four case-folded
/// string sets (verbs, nouns, adjectives, prepositions) plus a misc
/// bucket for entries that carry none of those flags.
///
/// Built once per loaded story and never mutated afterwards: the set of
/// words a rewrite may draw from cannot grow or shrink mid-session.
pub struct Vocabulary {
    verbs: BTreeSet<String>,
    nouns: BTreeSet<String>,
    adjectives: BTreeSet<String>,
    prepositions: BTreeSet<String>,
    misc: BTreeSet<String>,
    word_separators: Vec<char>,
}

impl Vocabulary {
    pub fn from_dictionary(dict: &Dictionary) -> Self {
        let mut vocab = Vocabulary {
            verbs: BTreeSet::new(),
            nouns: BTreeSet::new(),
            adjectives: BTreeSet::new(),
            prepositions: BTreeSet::new(),
            misc: BTreeSet::new(),
            word_separators: dict.word_separators.clone(),
        };

        for entry in &dict.entries {
            let category = if entry.flags.contains(DictionaryEntryFlags::VERB) {
                WordCategory::Verb
            } else if entry.flags.contains(DictionaryEntryFlags::PREPOSITION) {
                WordCategory::Preposition
            } else if entry.flags.contains(DictionaryEntryFlags::ADJECTIVE) {
                WordCategory::Adjective
            } else if entry.flags.contains(DictionaryEntryFlags::NOUN) {
                WordCategory::Noun
            } else {
                WordCategory::Misc
            };
            vocab.add_word(&entry.text, category);
        }

        vocab
    }

    /// Adds `word` to the set for `category`, case-folded. Empty strings
    /// are ignored.
    pub fn add_word(&mut self, word: &str, category: WordCategory) {
        let lowered = word.to_ascii_lowercase();
        if lowered.is_empty() {
            return;
        }
        let set = match category {
            WordCategory::Verb => &mut self.verbs,
            WordCategory::Noun => &mut self.nouns,
            WordCategory::Adjective => &mut self.adjectives,
            WordCategory::Preposition => &mut self.prepositions,
            WordCategory::Misc => &mut self.misc,
        };
        set.insert(lowered);
    }

    /// Case-folds then truncates to 6 characters, the Z-machine's prefix
    /// rule for word comparison.
    fn truncate(word: &str) -> String {
        word.to_ascii_lowercase().chars().take(6).collect()
    }

    /// True if `word` appears anywhere in the dictionary, regardless of
    /// part of speech.
    pub fn contains(&self, word: &str) -> bool {
        let t = Self::truncate(word);
        self.verbs.contains(&t)
            || self.nouns.contains(&t)
            || self.adjectives.contains(&t)
            || self.prepositions.contains(&t)
            || self.misc.contains(&t)
    }

    pub fn contains_verb(&self, word: &str) -> bool {
        self.verbs.contains(&Self::truncate(word))
    }

    pub fn is_noun(&self, word: &str) -> bool {
        self.nouns.contains(&Self::truncate(word))
    }

    pub fn is_adjective(&self, word: &str) -> bool {
        self.adjectives.contains(&Self::truncate(word))
    }

    pub fn is_preposition(&self, word: &str) -> bool {
        self.prepositions.contains(&Self::truncate(word))
    }

    pub fn word_separators(&self) -> &[char] {
        &self.word_separators
    }

    /// Every known word across all five sets, sorted and deduplicated.
    pub fn all_words(&self) -> Vec<String> {
        let mut all: BTreeSet<String> = BTreeSet::new();
        all.extend(self.verbs.iter().cloned());
        all.extend(self.nouns.iter().cloned());
        all.extend(self.adjectives.iter().cloned());
        all.extend(self.prepositions.iter().cloned());
        all.extend(self.misc.iter().cloned());
        all.into_iter().collect()
    }

    /// The top `n` verbs, lexicographically sorted.
    pub fn top_verbs(&self, n: usize) -> Vec<String> {
        self.verbs.iter().take(n).cloned().collect()
    }

    /// The top `n` nouns, lexicographically sorted.
    pub fn top_nouns(&self, n: usize) -> Vec<String> {
        self.nouns.iter().take(n).cloned().collect()
    }

    /// The top `n` adjectives, lexicographically sorted.
    pub fn top_adjectives(&self, n: usize) -> Vec<String> {
        self.adjectives.iter().take(n).cloned().collect()
    }

    /// Every known preposition.
    pub fn all_prepositions(&self) -> Vec<String> {
        self.prepositions.iter().cloned().collect()
    }

    pub fn verb_count(&self) -> usize {
        self.verbs.len()
    }

    pub fn word_count(&self) -> usize {
        self.verbs.len()
            + self.nouns.len()
            + self.adjectives.len()
            + self.prepositions.len()
            + self.misc.len()
    }

    /// A one-line, human-readable count of each category, useful for
    /// startup logging.
    pub fn summary(&self) -> String {
        format!(
            "{} verbs, {} nouns, {} adjectives, {} prepositions, {} misc ({} total)",
            self.verbs.len(),
            self.nouns.len(),
            self.adjectives.len(),
            self.prepositions.len(),
            self.misc.len(),
            self.word_count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryEntry;

    fn make_dict(entries: Vec<(&str, DictionaryEntryFlags)>) -> Dictionary {
        Dictionary {
            word_separators: vec!['.', ','],
            entries: entries
                .into_iter()
                .map(|(text, flags)| DictionaryEntry {
                    text: text.to_string(),
                    flags,
                    offset: 0,
                })
                .collect(),
            entry_text_bytes: 4,
        }
    }

    #[test]
    fn contains_is_case_insensitive() {
        let dict = make_dict(vec![("take", DictionaryEntryFlags::VERB)]);
        let vocab = Vocabulary::from_dictionary(&dict);
        assert!(vocab.contains("TAKE"));
        assert!(vocab.contains("Take"));
    }

    #[test]
    fn truncation_aware_verb_lookup() {
        let dict = make_dict(vec![("examin", DictionaryEntryFlags::VERB)]);
        let vocab = Vocabulary::from_dictionary(&dict);
        assert!(vocab.contains_verb("examine"));
        assert!(vocab.contains_verb("examining"));
    }

    #[test]
    fn builds_four_sets_plus_misc() {
        let dict = make_dict(vec![
            ("take", DictionaryEntryFlags::VERB),
            ("lamp", DictionaryEntryFlags::NOUN),
            ("brass", DictionaryEntryFlags::ADJECTIVE),
            ("with", DictionaryEntryFlags::PREPOSITION),
            ("xyzzy", DictionaryEntryFlags::empty()),
        ]);
        let vocab = Vocabulary::from_dictionary(&dict);
        assert!(vocab.contains_verb("take"));
        assert!(vocab.is_noun("lamp"));
        assert!(vocab.is_adjective("brass"));
        assert!(vocab.is_preposition("with"));
        assert!(vocab.contains("xyzzy"));
        assert!(!vocab.contains_verb("xyzzy"));
        assert_eq!(vocab.word_count(), 5);
    }

    #[test]
    fn unknown_word_is_absent() {
        let dict = make_dict(vec![("take", DictionaryEntryFlags::VERB)]);
        let vocab = Vocabulary::from_dictionary(&dict);
        assert!(!vocab.contains("frobnicate"));
    }

    #[test]
    fn summary_reports_counts() {
        let dict = make_dict(vec![("take", DictionaryEntryFlags::VERB)]);
        let vocab = Vocabulary::from_dictionary(&dict);
        assert!(vocab.summary().contains("1 verbs"));
    }
}
