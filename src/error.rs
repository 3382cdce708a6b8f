/// Everything that can stop a compilation run.
///
/// Lexer and parser errors carry the byte offset of the offending input so
/// [`Diagnostics`](crate::Diagnostics) can point at it.
#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error("{program}: invalid number of arguments")]
    ArgumentCount { program: String },
    #[error("invalid token")]
    InvalidToken { offset: usize },
    #[error("expected an expression")]
    ExpectedExpression { offset: usize },
    #[error("expect '{expected}'")]
    ExpectedToken {
        offset: usize,
        expected: &'static str,
    },
    #[error("extra token")]
    TrailingToken { offset: usize },
    #[error("expression nested too deeply")]
    TooDeep { offset: usize },
    /// The generator broke its own push/pop discipline.
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Byte offset into the source, for errors that have one.
    pub fn offset(&self) -> Option<usize> {
        use CompileError::*;
        match self {
            InvalidToken { offset }
            | ExpectedExpression { offset }
            | ExpectedToken { offset, .. }
            | TrailingToken { offset }
            | TooDeep { offset } => Some(*offset),
            ArgumentCount { .. } | Internal(_) | Io(_) => None,
        }
    }
}
