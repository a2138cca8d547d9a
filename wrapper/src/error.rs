use thiserror::Error;

#[derive(Debug, Error)]
pub enum WoolError {
    #[error("invalid type pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("a wool named {0:?} is already registered")]
    Duplicate(String),
    #[error("parent wool {0:?} is not registered")]
    UnknownParent(String),
    #[error("no wool named {0:?}")]
    Unknown(String),
}
