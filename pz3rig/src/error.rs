use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unbalanced '}}' at line {line} (offset {offset})")]
    UnbalancedClose { offset: usize, line: usize },

    #[error("statement '{keyword}' outside of any block at line {line} (offset {offset})")]
    StatementOutsideBlock {
        keyword: String,
        offset: usize,
        line: usize,
    },

    #[error("input ended with {depth} unclosed block(s) at line {line}")]
    UnclosedBlock { depth: usize, line: usize },

    #[error("no such key '{key}'")]
    MissingKey { key: String },

    #[error("ambiguous key '{key}' ({count} matches)")]
    AmbiguousKey { key: String, count: usize },

    #[error("attribute '{key}' has no block")]
    MissingChild { key: String },

    #[error("attribute '{key}' has no argument {index}")]
    MissingArgument { key: String, index: usize },

    #[error("argument {index} of '{key}' is not a number: {value}")]
    NotANumber {
        key: String,
        index: usize,
        value: String,
    },

    #[error("argument {index} of '{key}' is not a string")]
    NotAString { key: String, index: usize },

    #[error("invalid rotation order '{order}' for bone '{bone}'")]
    MalformedRotationOrder { bone: String, order: String },

    #[error("bone '{id}' is defined more than once")]
    DuplicateBone { id: String },

    #[error("unknown bone '{id}'")]
    UnknownBone { id: String },

    #[error("unknown figure '{name}'")]
    UnknownFigure { name: String },

    #[error("bone '{bone}' is added to '{first}' and to '{second}'")]
    ConflictingParent {
        bone: String,
        first: String,
        second: String,
    },

    #[error("invalid rotation axis '{value}'")]
    InvalidAxis { value: String },

    #[error("weight table has {indices} indices but {weights} weights")]
    WeightTableMismatch { indices: usize, weights: usize },

    #[cfg(feature = "json")]
    #[error("invalid pz3 JSON: {message}")]
    Json { message: String },
}
