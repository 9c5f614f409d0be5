//! Session-scoped context threaded through a single repair attempt.

/// Interpreter output is trimmed to this many characters before it is
/// ever embedded in an LLM prompt.
pub const MAX_GAME_OUTPUT_CHARS: usize = 500;

/// Truncates `text` to `max_chars`, operating on `char` boundaries so a
/// multi-byte character is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// The last observable interpreter output, trimmed for prompt framing.
/// No derived state (current room, inventory) is tracked: a rewrite only
/// needs to see what the player just read.
#[derive(Debug, Clone, Default)]
pub struct GameContext {
    last_output: String,
}

impl GameContext {
    pub fn new() -> Self {
        GameContext {
            last_output: String::new(),
        }
    }

    /// Records `output` as the most recent interpreter response, already
    /// truncated to `MAX_GAME_OUTPUT_CHARS`.
    pub fn set_last_output(&mut self, output: &str) {
        self.last_output = truncate_chars(output, MAX_GAME_OUTPUT_CHARS);
    }

    pub fn last_output(&self) -> &str {
        &self.last_output
    }
}
