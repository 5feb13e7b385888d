use thiserror::Error;

/// Errors raised while tokenizing or parsing algebra text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated quoted identifier")]
    UnterminatedIdentifier,

    #[error("invalid integer literal '{0}'")]
    InvalidNumber(String),

    #[error("unknown data type '{0}'")]
    UnknownDataType(String),

    #[error("AND and OR mixed without parentheses in '{0}'")]
    MixedLogicalOperators(String),
}
