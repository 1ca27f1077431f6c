use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjCompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A comparer bound to one type was handed a value of another type.
    #[error("Incompatible types: expected {expected}, found {found}")]
    IncompatibleTypes { expected: String, found: String },

    /// A value reported a shape its declared type does not allow.
    #[error("Unexpected shape at '{path}': expected {expected}")]
    UnexpectedShape { path: String, expected: String },

    /// Two values of the same type listed different members.
    #[error("Member layout mismatch at '{path}': '{left}' vs '{right}'")]
    MemberMismatch {
        path: String,
        left: String,
        right: String,
    },
}

pub type Result<T> = std::result::Result<T, ObjCompareError>;
