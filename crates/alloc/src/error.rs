use std::fmt;

/// Caller-level failures. Data-level conditions (orphaned links, ambiguous
/// quotes) are not errors — they come back as `ResolutionWarning`s and the
/// pass continues.
#[derive(Debug)]
pub enum AllocError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, weights off).
    ConfigValidation(String),
    /// An allocation mutation was structurally invalid.
    LinkValidation(String),
    /// A mutation referenced a link id that does not exist.
    UnknownLink(String),
    /// A mutation referenced an expense that does not exist.
    UnknownExpense(String),
    /// A mutation referenced an expense split that does not exist.
    UnknownSplit(String),
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::LinkValidation(msg) => write!(f, "invalid allocation: {msg}"),
            Self::UnknownLink(id) => write!(f, "unknown correlation link: {id}"),
            Self::UnknownExpense(id) => write!(f, "unknown expense: {id}"),
            Self::UnknownSplit(id) => write!(f, "unknown expense split: {id}"),
        }
    }
}

impl std::error::Error for AllocError {}
