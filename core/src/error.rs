use thiserror::Error;

#[derive(Debug, Error)]
pub enum NlpError {
    /// The run selected no post with extractable text.
    #[error("corpus has no vectorizable documents")]
    EmptyCorpus,

    /// The key selector yielded no group for a non-empty input.
    #[error("grouping produced no partitions for {items} items")]
    EmptyGroup { items: usize },

    #[error("document index {index} out of range for corpus of {len} documents")]
    DocumentOutOfRange { index: usize, len: usize },

    #[error("invalid similarity policy `{name}`: {reason}")]
    InvalidPolicy { name: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("summarizer failed: {0}")]
    Summarizer(String),
}

impl From<figment::Error> for NlpError {
    fn from(err: figment::Error) -> Self {
        NlpError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NlpError>;
