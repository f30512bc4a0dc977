pub mod types;
pub mod prompt;
pub mod parser;
pub mod ollama;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use ollama::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterpretationError {
    /// The completion service answered, but not with a valid metadata record.
    #[error("Malformed metadata response: {0}")]
    MalformedMetadata(String),

    /// The completion service itself failed, timed out or was unreachable.
    #[error("Completion service failed: {0}")]
    UpstreamFailure(String),

    #[error("Nothing to interpret: input text is empty")]
    EmptyInput,
}
