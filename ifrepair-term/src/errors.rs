use thiserror::Error;

pub type IFtResult<T> = Result<T, IFtError>;

/// An error raised by the terminal client wiring the repair core into a
/// spawned interpreter subprocess.
#[derive(Debug, Error)]
pub enum IFtError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parser-repair error: {0}")]
    Core(#[from] ifrepair_core::IfError),

    #[error("required environment variable {0} is not set")]
    MissingApiKeyEnv(String),

    #[error("interpreter subprocess exited unexpectedly")]
    InterpreterExited,
}
