use thiserror::Error;

pub type IfResult<T> = Result<T, IfError>;

/// An error raised by the parser-repair core.
#[derive(Debug, Error)]
pub enum IfError {
    #[error("story file IO error: {0}")]
    MachineIO(#[from] std::io::Error),

    #[error("invalid or out-of-range access at story offset {offset:#X}")]
    CorruptStory { offset: usize },

    #[error("unsupported Z-machine version {0} (supported: 3-8)")]
    UnsupportedVersion(u8),

    #[error("story has no dictionary (base address is 0)")]
    NoDictionary,

    #[error("invalid dictionary table: {0}")]
    InvalidDictionary(&'static str),

    #[error("LLM transport error: {0}")]
    LlmTransport(String),

    #[error("malformed LLM response: {0}")]
    LlmResponse(String),

    #[error("rewrite rejected by validator: {0}")]
    ValidationReject(String),
}
