//! Structured error reporting for the assembler.
//!
//! Errors render in the usual compiler style:
//! ```text
//! 3:9: error: undeclared label 'loop'
//! ```
//! Errors with no position (I/O, size) drop the `line:col:` prefix.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Position of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column, counted in characters.
    pub column: usize,
    /// 0-indexed position of the token in the whole token stream.
    pub token_index: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Classification of assembly errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleErrorKind {
    /// A label declaration with nothing before the colon.
    #[error("empty label name")]
    EmptyToken,
    /// Token is neither a mnemonic nor a label declaration.
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    /// Label declared with a mnemonic or `CALL` as its name.
    #[error("'{0}' is a reserved word and cannot name a label")]
    ReservedLabel(String),
    /// `PUSH` or `CALL` at the end of input or followed by a declaration.
    #[error("{0} requires an operand")]
    MissingOperand(&'static str),
    /// Operand token is a mnemonic.
    #[error("operand '{0}' is a mnemonic")]
    OperandIsMnemonic(String),
    /// Integer literal that does not fit a signed 32-bit word.
    #[error("integer literal '{0}' does not fit in 32 bits")]
    IntegerOutOfRange(String),
    /// Label table inconsistency.
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    /// Assembled program does not fit in program memory.
    #[error("program is {size} bytes, maximum is {max} bytes")]
    ProgramTooLarge {
        /// Assembled size.
        size: usize,
        /// Program memory capacity.
        max: usize,
    },
    /// Source or destination could not be accessed.
    #[error("{action} {}: {message}", .path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// File involved.
        path: PathBuf,
        /// OS error text.
        message: String,
    },
}

/// Label table errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// Same label declared twice.
    #[error("label '{name}' redeclared (first declared at {first})")]
    DuplicateLabel {
        /// The label.
        name: String,
        /// Where it was first declared.
        first: SourceLocation,
    },
    /// Label used but never declared.
    #[error("undeclared label '{0}'")]
    UndeclaredLabel(String),
}

/// An assembly error with its source position, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    /// The kind of error.
    pub kind: AssembleErrorKind,
    /// Where it happened.
    pub location: Option<SourceLocation>,
}

impl AssembleError {
    /// Creates an error with no position.
    #[must_use]
    pub const fn new(kind: AssembleErrorKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    /// Creates an error at `location`.
    #[must_use]
    pub const fn at(kind: AssembleErrorKind, location: SourceLocation) -> Self {
        Self {
            kind,
            location: Some(location),
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{loc}: error: {}", self.kind),
            None => write!(f, "error: {}", self.kind),
        }
    }
}

impl std::error::Error for AssembleError {}
