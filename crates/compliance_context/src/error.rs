use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("question is required")]
    EmptyQuestion,

    #[error("question rejected: {0}")]
    UnsafeQuestion(String),

    #[error("no compliance records to build a prompt from")]
    EmptyContext,

    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("invalid records document: {0}")]
    InvalidRecords(String),
}
