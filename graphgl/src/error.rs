//! Module containing the universal error type
use thiserror::Error;

/// Universal error type for `graphgl`
///
/// Note that runtime math faults (division by zero, `sqrt(-1)`, overflow) are
/// **not** errors; evaluation reports them as `NaN` instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Node is not present in this `Context`
    #[error("node is not present in this `Context`")]
    BadNode,

    /// Expression text is empty (or only whitespace)
    #[error("expression is empty")]
    EmptyExpression,

    /// Unknown character in the expression text
    #[error("unknown character '{ch}' at position {pos}")]
    UnknownCharacter {
        /// Byte offset into the expression text
        pos: usize,
        /// Offending character
        ch: char,
    },

    /// A numeric literal could not be parsed
    #[error("invalid number '{0}'")]
    BadNumber(String),

    /// Parser found a token that doesn't fit the grammar
    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken {
        /// Byte offset into the expression text
        pos: usize,
        /// Description of the token that was found
        found: String,
    },

    /// Expression text ended in the middle of an expression
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Parentheses do not match
    #[error("unbalanced parentheses")]
    UnbalancedParens,

    /// Identifier is not a variable or constant in this context
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    /// Function name is not recognized
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Function was called with the wrong number of arguments
    #[error("function '{name}' takes {expected} argument(s), got {got}")]
    WrongArgCount {
        /// Function name
        name: String,
        /// Number of arguments the function accepts
        expected: usize,
        /// Number of arguments provided
        got: usize,
    },

    /// Index is out of range (index, length)
    #[error("index {0} is out of range (length {1})")]
    BadIndex(usize, usize),

    /// A record in a `.mat` file is malformed
    #[error("bad record on line {line}: {reason}")]
    BadRecord {
        /// Line number (1-indexed)
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// IO error; see inner code for details
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}
