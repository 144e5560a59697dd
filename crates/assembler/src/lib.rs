//! QProc assembler library.

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use tempfile as _;
use {anyhow as _, clap as _, env_logger as _};

/// Top-level two-pass assembler pipeline.
pub mod assembler;
/// Byte emission and `CALL` expansion.
pub mod encoder;
/// Structured assembly error types.
pub mod errors;
/// Mnemonic resolution against the core opcode table.
pub mod mnemonic;
/// Token classification.
pub mod parser;
/// Tokenizer.
pub mod source;
/// Label table with deferred fix-ups.
pub mod symbols;

pub use assembler::{assemble_file, assemble_source, format_listing, AssembleResult, ListingEntry};
pub use errors::{AssembleError, AssembleErrorKind, SourceLocation, SymbolError};
