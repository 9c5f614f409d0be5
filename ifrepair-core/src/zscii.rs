//! Decodes the 5-bit packed Z-character text used by dictionary entries.
//!
//! Models the full printing alphabet tables (A0/A1/A2); dictionary words
//! only ever use the plain lowercase-alphanumeric subset, so the
//! accented-character ("extra characters") table is dropped entirely.
//!
//! Decoding stops at the encoded pair's terminator bit rather than at the
//! first zero Z-character, so that an entry containing a legitimate shift
//! code partway through still decodes intact.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Alphabet {
    A0Lower,
    A1Upper,
    A2Punctuation,
}

const A0_CHARS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
const A1_CHARS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// R3.5.3's A2 row, characters 6..=31 (character 6 is the synonym-escape
/// for the following 2 Z-characters forming a ZSCII code, unused for
/// dictionary words; we render it as an empty placeholder).
const A2_CHARS: &[char; 26] = &[
    ' ', '\n', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ',', '!', '?', '_', '#',
    '\'', '"', '/', '\\', '-', ':', '(', ')',
];

/// Decodes a run of 2-byte Z-character pairs (the 4 bytes of a V3
/// dictionary entry's text field, or 6 for V4+) into a lowercase ASCII
/// word, trimming trailing padding spaces.
///
/// Stops at the pair whose first byte has the top bit set (R3.2's
/// terminator bit), or when the input is exhausted, whichever comes
/// first.
pub fn decode_dictionary_text(bytes: &[u8]) -> String {
    let mut zchars = Vec::with_capacity(bytes.len() / 2 * 3);
    for pair in bytes.chunks_exact(2) {
        let (b1, b2) = (pair[0], pair[1]);
        zchars.push((b1 >> 2) & 0x1F);
        zchars.push(((b1 & 0x03) << 3) | (b2 >> 5));
        zchars.push(b2 & 0x1F);
        if b1 & 0x80 != 0 {
            break;
        }
    }

    let mut out = String::with_capacity(zchars.len());
    // Dictionary text always starts in A0; a shift (Z-char 4/5) affects
    // only the single Z-character that follows it, per R3.2.3.
    let mut shifted: Option<Alphabet> = None;
    let mut chars_iter = zchars.into_iter();
    while let Some(zc) = chars_iter.next() {
        let active = shifted.take().unwrap_or(Alphabet::A0Lower);
        match zc {
            0 => out.push(' '),
            // 1-3: abbreviation escapes. Dictionary entries never carry
            // abbreviations (R3.3), so the following Z-character is
            // consumed and dropped rather than mis-rendered as a letter.
            1..=3 => {
                chars_iter.next();
            }
            4 => shifted = Some(Alphabet::A1Upper),
            5 => shifted = Some(Alphabet::A2Punctuation),
            6..=31 => out.push(char_for(active, zc)),
            _ => unreachable!("5-bit Z-character out of range"),
        }
    }

    out.to_ascii_lowercase().trim_end().to_string()
}

fn char_for(alphabet: Alphabet, zc: u8) -> char {
    let idx = (zc - 6) as usize;
    match alphabet {
        Alphabet::A0Lower => A0_CHARS.get(idx).copied().unwrap_or(b'?') as char,
        Alphabet::A1Upper => A1_CHARS.get(idx).copied().unwrap_or(b'?') as char,
        Alphabet::A2Punctuation => A2_CHARS.get(idx).copied().unwrap_or('?'),
    }
}
