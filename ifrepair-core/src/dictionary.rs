//! Parses the Z-machine dictionary table into structured entries.

use bitflags::bitflags;

use crate::errors::{IfError, IfResult};
use crate::story::StoryReader;
use crate::zscii::decode_dictionary_text;

bitflags! {
    /// Classification of a dictionary entry's part of speech, read from
    /// the entry's flag byte.
    ///
    /// Movement directions ("north", "up", ...) are not a flag bit at
    /// all — they're recognized by the validator as a fixed literal
    /// alias set, independent of how (or whether) a story's dictionary
    /// tags them.
    pub struct DictionaryEntryFlags: u8 {
        const VERB        = 0b0100_0000; // 0x40
        const PREPOSITION = 0b0010_0000; // 0x20
        const ADJECTIVE   = 0b0001_0000; // 0x10
        const NOUN        = 0b0000_1000; // 0x08
    }
}

/// A single decoded dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Lowercased ASCII text, truncated to the story's encoded-word
    /// length (6 characters for v3, 9 for v4+).
    pub text: String,
    pub flags: DictionaryEntryFlags,
    /// Offset of this entry's first byte within the story file, kept so
    /// the prompt builder can report stable identifiers if ever needed.
    pub offset: usize,
}

/// The full parsed dictionary: word separators plus every entry, in the
/// table's original sort order.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pub word_separators: Vec<char>,
    pub entries: Vec<DictionaryEntry>,
    /// Number of encoded Z-character bytes per entry's text field (4 for
    /// v3, 6 for v4+), needed by the vocabulary's truncation-aware
    /// verb lookup.
    pub entry_text_bytes: usize,
}

impl Dictionary {
    /// Parses the dictionary at `header_dictionary_offset` (story header
    /// byte 0x08-0x09) for the given Z-machine version.
    pub fn parse(
        story: &StoryReader,
        header_dictionary_offset: u16,
        version: u8,
    ) -> IfResult<Dictionary> {
        if header_dictionary_offset == 0 {
            return Err(IfError::NoDictionary);
        }
        let base = header_dictionary_offset as usize;

        let num_separators = story.read_u8(base)? as usize;
        let separators_start = base + 1;
        let separator_bytes = story.read_slice(separators_start, num_separators)?;
        let word_separators: Vec<char> = separator_bytes.iter().map(|&b| b as char).collect();

        let entry_length_offset = separators_start + num_separators;
        let entry_length = story.read_u8(entry_length_offset)? as usize;
        let num_entries = story.read_u16_be(entry_length_offset + 1)? as i16;
        let entries_start = entry_length_offset + 3;

        // A negative count marks an unsorted dictionary; lookup semantics
        // don't depend on sortedness here, only on decoding every entry,
        // so the sign is discarded after validation.
        let num_entries = num_entries.unsigned_abs() as usize;
        if num_entries == 0 || num_entries > 10_000 {
            return Err(IfError::InvalidDictionary(
                "entry count is zero or implausibly large",
            ));
        }

        let entry_text_bytes = match version {
            1..=3 => 4,
            4..=8 => 6,
            other => return Err(IfError::UnsupportedVersion(other)),
        };
        if entry_length < entry_text_bytes {
            return Err(IfError::InvalidDictionary(
                "entry length shorter than encoded text field",
            ));
        }

        let mut entries = Vec::with_capacity(num_entries);
        for i in 0..num_entries {
            let offset = entries_start + i * entry_length;
            let text_bytes = story.read_slice(offset, entry_text_bytes)?;
            let text = decode_dictionary_text(text_bytes);
            let flag_byte_offset = offset + entry_text_bytes;
            let flags = if flag_byte_offset < offset + entry_length {
                DictionaryEntryFlags::from_bits_truncate(story.read_u8(flag_byte_offset)?)
            } else {
                DictionaryEntryFlags::empty()
            };
            entries.push(DictionaryEntry {
                text,
                flags,
                offset,
            });
        }

        Ok(Dictionary {
            word_separators,
            entries,
            entry_text_bytes,
        })
    }

    /// Looks up an entry by its already-truncated text: lookups compare
    /// at most 6 characters, the Z-machine's prefix rule for word
    /// comparison regardless of story version.
    pub fn find(&self, word: &str) -> Option<&DictionaryEntry> {
        let truncated: String = word.chars().take(6).collect();
        self.entries.iter().find(|e| e.text == truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_story(separators: &[u8], entries: &[(Vec<u8>, u8)]) -> (Vec<u8>, u16) {
        let mut buf = vec![0u8; 0x40];
        let dict_offset = buf.len() as u16;
        buf.push(separators.len() as u8);
        buf.extend_from_slice(separators);
        let entry_len = 4u8 + 1; // 4 text bytes + 1 flag byte, v3
        buf.push(entry_len);
        let count = entries.len() as u16;
        buf.push((count >> 8) as u8);
        buf.push((count & 0xFF) as u8);
        for (text_bytes, flags) in entries {
            buf.extend_from_slice(text_bytes);
            buf.push(*flags);
        }
        (buf, dict_offset)
    }

    fn encode_a0_word(word: &str) -> Vec<u8> {
        let mut zchars: Vec<u8> = word.bytes().map(|b| b - b'a' + 6).collect();
        while zchars.len() < 6 {
            zchars.push(5);
        }
        zchars.truncate(6);
        let mut out = Vec::new();
        for (i, triple) in zchars.chunks(3).enumerate() {
            let b1 = (triple[0] << 2) | (triple[1] >> 3);
            let b2 = (triple[1] << 5) | triple[2];
            let last = i == 1;
            out.push(if last { b1 | 0x80 } else { b1 });
            out.push(b2);
        }
        out
    }

    #[test]
    fn parses_entries_and_flags() {
        let take_bytes = encode_a0_word("take");
        let (buf, dict_offset) = build_story(
            b".,\"",
            &[(take_bytes, DictionaryEntryFlags::VERB.bits())],
        );
        let story = StoryReader::from_bytes(buf);
        let dict = Dictionary::parse(&story, dict_offset, 3).unwrap();
        assert_eq!(dict.word_separators, vec!['.', ',', '"']);
        assert_eq!(dict.entries.len(), 1);
        assert_eq!(dict.entries[0].text, "take");
        assert!(dict.entries[0].flags.contains(DictionaryEntryFlags::VERB));
    }

    #[test]
    fn zero_offset_is_no_dictionary() {
        let story = StoryReader::from_bytes(vec![0u8; 16]);
        assert!(matches!(
            Dictionary::parse(&story, 0, 3),
            Err(IfError::NoDictionary)
        ));
    }

    #[test]
    fn find_truncates_lookup_to_entry_width() {
        let examine_bytes = encode_a0_word("examin");
        let (buf, dict_offset) =
            build_story(b".", &[(examine_bytes, DictionaryEntryFlags::VERB.bits())]);
        let story = StoryReader::from_bytes(buf);
        let dict = Dictionary::parse(&story, dict_offset, 3).unwrap();
        assert!(dict.find("examine").is_some());
        assert_eq!(dict.find("examine").unwrap().text, "examin");
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let (buf, dict_offset) = build_story(b".", &[]);
        let story = StoryReader::from_bytes(buf);
        assert!(matches!(
            Dictionary::parse(&story, dict_offset, 9),
            Err(IfError::UnsupportedVersion(9))
        ));
    }
}
