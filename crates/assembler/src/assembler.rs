//! Top-level assembler pipeline.
//!
//! 1. **Tokenize** the source.
//! 2. **Encode** statements left to right into one growing buffer. Labels
//!    are declared at the current offset; label operands reserve four bytes
//!    and record a usage.
//! 3. **Resolve** every label once the last token is consumed and patch the
//!    reserved slots.
//!
//! Nothing is written to disk until the whole image is assembled and fits
//! in program memory.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use log::debug;
use qproc_core::{ImageError, ProgramImage, PROGRAM_MEMORY_BYTES};

use crate::encoder::{Encoder, OperandValue};
use crate::errors::{AssembleError, AssembleErrorKind, SourceLocation};
use crate::mnemonic::Mnemonic;
use crate::parser::{classify_operand, classify_statement, Operand, Statement};
use crate::source::{tokenize, Token};
use crate::symbols::SymbolTable;

/// Result of assembly: the image plus metadata for listings and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleResult {
    /// The program image.
    pub image: ProgramImage,
    /// One entry per emitted statement, in address order.
    pub listing: Vec<ListingEntry>,
    /// Every declared label and its address.
    pub symbols: BTreeMap<String, usize>,
}

/// An entry in the address-to-source listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Address of the first byte.
    pub address: usize,
    /// Bytes emitted for the statement, with label operands patched.
    pub bytes: Vec<u8>,
    /// Statement text, e.g. `PUSH end`.
    pub source: String,
    /// Position of the statement keyword.
    pub location: SourceLocation,
}

/// Assembles source text into a program image.
///
/// # Errors
///
/// Returns the first [`AssembleError`] encountered: invalid statements and
/// operands in source order, then the earliest use of an undeclared label,
/// then an oversized program.
pub fn assemble_source(source: &str) -> Result<AssembleResult, AssembleError> {
    let tokens = tokenize(source);
    let mut encoder = Encoder::new();
    let mut symbols = SymbolTable::new();
    let mut pending: Vec<(usize, usize, String, SourceLocation)> = Vec::new();
    let mut stream = tokens.iter();

    while let Some(token) = stream.next() {
        let start = encoder.offset();
        let mnemonic = match classify_statement(token.text) {
            Statement::Mnemonic(mnemonic) => mnemonic,
            Statement::LabelDecl(name) => {
                symbols
                    .declare(name, start, token.location)
                    .map_err(|error| AssembleError::at(error.into(), token.location))?;
                continue;
            }
            Statement::Invalid(kind) => return Err(AssembleError::at(kind, token.location)),
        };

        let text = match mnemonic {
            Mnemonic::Instruction(opcode) if !mnemonic.takes_operand() => {
                encoder.emit_opcode(opcode);
                token.text.to_string()
            }
            Mnemonic::Instruction(_) | Mnemonic::Call => {
                let operand_token = stream.next().ok_or_else(|| {
                    AssembleError::at(
                        AssembleErrorKind::MissingOperand(mnemonic.name()),
                        token.location,
                    )
                })?;
                let value = operand_value(operand_token, mnemonic)?;
                if mnemonic == Mnemonic::Call {
                    encoder
                        .emit_call(value, operand_token.location, &mut symbols)
                        .map_err(|kind| AssembleError::at(kind, token.location))?;
                } else {
                    encoder.emit_push(value, operand_token.location, &mut symbols);
                }
                format!("{} {}", token.text, operand_token.text)
            }
        };
        pending.push((start, encoder.offset(), text, token.location));
    }

    let resolved = symbols
        .resolve()
        .map_err(|(error, location)| AssembleError::at(error.into(), location))?;

    let size = encoder.offset();
    if size > PROGRAM_MEMORY_BYTES {
        return Err(AssembleError::new(AssembleErrorKind::ProgramTooLarge {
            size,
            max: PROGRAM_MEMORY_BYTES,
        }));
    }
    for (offset, address) in symbols.fixups() {
        encoder.patch(offset, address).map_err(AssembleError::new)?;
    }

    let bytes = encoder.into_bytes();
    let listing = pending
        .into_iter()
        .map(|(start, end, source, location)| ListingEntry {
            address: start,
            bytes: bytes[start..end].to_vec(),
            source,
            location,
        })
        .collect();
    let image = ProgramImage::from_bytes(bytes).map_err(image_error)?;
    debug!(
        "assembled {} tokens into {} bytes with {} labels",
        tokens.len(),
        image.len(),
        resolved.len()
    );

    Ok(AssembleResult {
        image,
        listing,
        symbols: resolved,
    })
}

/// Assembles `source` and writes the image to `dest`.
///
/// The destination is written only after assembly succeeds, and atomically:
/// on any error it is left untouched, and it is never left truncated.
///
/// # Errors
///
/// Returns an [`AssembleError`] when the source cannot be read, fails to
/// assemble, or the image cannot be written.
pub fn assemble_file(source: &Path, dest: &Path) -> Result<AssembleResult, AssembleError> {
    let text = std::fs::read_to_string(source).map_err(|error| {
        AssembleError::new(AssembleErrorKind::Io {
            action: "could not read source",
            path: source.to_path_buf(),
            message: error.to_string(),
        })
    })?;

    let result = assemble_source(&text)?;
    result.image.write_atomic(dest).map_err(image_error)?;
    debug!("wrote {} -> {}", source.display(), dest.display());
    Ok(result)
}

/// Formats a listing as `address  bytes  statement` lines.
#[must_use]
pub fn format_listing(listing: &[ListingEntry]) -> String {
    let mut out = String::new();
    for entry in listing {
        let hex: Vec<String> = entry.bytes.iter().map(|byte| format!("{byte:02X}")).collect();
        let _ = writeln!(
            out,
            "{:05}  {:<14}  {}",
            entry.address,
            hex.join(" "),
            entry.source
        );
    }
    out
}

fn operand_value<'a>(
    token: &Token<'a>,
    owner: Mnemonic,
) -> Result<OperandValue<'a>, AssembleError> {
    match classify_operand(token.text, owner) {
        Operand::IntegerLiteral(value) => Ok(OperandValue::Literal(value)),
        Operand::LabelRef(name) => Ok(OperandValue::Label(name)),
        Operand::Invalid(kind) => Err(AssembleError::at(kind, token.location)),
    }
}

fn image_error(error: ImageError) -> AssembleError {
    let kind = match error {
        ImageError::TooLarge { size, max } => AssembleErrorKind::ProgramTooLarge {
            size: usize::try_from(size).unwrap_or(usize::MAX),
            max,
        },
        ImageError::Io {
            action,
            path,
            source,
        } => AssembleErrorKind::Io {
            action,
            path,
            message: source.to_string(),
        },
    };
    AssembleError::new(kind)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{assemble_source, format_listing};
    use crate::errors::{AssembleErrorKind, SymbolError};

    fn bytes(source: &str) -> Vec<u8> {
        assemble_source(source)
            .expect("source assembles")
            .image
            .into_bytes()
    }

    #[test]
    fn plain_program_encodes_opcodes_and_operands() {
        assert_eq!(
            bytes("PUSH 5 PUSH 3 SUB HALT"),
            vec![0x0D, 0, 0, 0, 5, 0x0D, 0, 0, 0, 3, 0x02, 0x16]
        );
    }

    #[test]
    fn forward_and_backward_references_resolve() {
        let result = assemble_source("start: PUSH end JMP end: PUSH start JMP")
            .expect("source assembles");

        assert_eq!(result.symbols.get("start"), Some(&0));
        assert_eq!(result.symbols.get("end"), Some(&6));
        assert_eq!(
            result.image.as_bytes(),
            &[0x0D, 0, 0, 0, 6, 0x0A, 0x0D, 0, 0, 0, 0, 0x0A]
        );
    }

    #[test]
    fn call_expands_in_place() {
        let result = assemble_source("CALL f HALT f: POPIP").expect("source assembles");

        assert_eq!(result.symbols.get("f"), Some(&13));
        assert_eq!(
            result.image.as_bytes(),
            &[0x0D, 0, 0, 0, 12, 0x0F, 0x0D, 0, 0, 0, 13, 0x0A, 0x16, 0x10]
        );
    }

    #[test]
    fn empty_source_is_an_empty_image() {
        let result = assemble_source("; nothing here\n").expect("source assembles");
        assert!(result.image.is_empty());
        assert!(result.listing.is_empty());
    }

    #[rstest]
    #[case::unknown("NOP FOO", AssembleErrorKind::UnknownSymbol("FOO".into()), (1, 5))]
    #[case::reserved("PUSH:", AssembleErrorKind::ReservedLabel("PUSH".into()), (1, 1))]
    #[case::empty_label("NOP :", AssembleErrorKind::EmptyToken, (1, 5))]
    #[case::push_at_end("NOP\nPUSH", AssembleErrorKind::MissingOperand("PUSH"), (2, 1))]
    #[case::call_before_label("CALL f: NOP", AssembleErrorKind::MissingOperand("CALL"), (1, 6))]
    #[case::operand_mnemonic("PUSH ADD", AssembleErrorKind::OperandIsMnemonic("ADD".into()), (1, 6))]
    #[case::overflow("PUSH 2147483648", AssembleErrorKind::IntegerOutOfRange("2147483648".into()), (1, 6))]
    #[case::jmp_takes_no_operand("start: JMP start", AssembleErrorKind::UnknownSymbol("start".into()), (1, 12))]
    #[case::undeclared("PUSH a JMP\nPUSH b JMP", SymbolError::UndeclaredLabel("a".into()).into(), (1, 6))]
    fn errors_carry_kind_and_position(
        #[case] source: &str,
        #[case] kind: AssembleErrorKind,
        #[case] position: (usize, usize),
    ) {
        let error = assemble_source(source).expect_err("source is invalid");
        let location = error.location.expect("error has a position");

        assert_eq!(error.kind, kind);
        assert_eq!((location.line, location.column), position);
    }

    #[test]
    fn redeclaration_is_reported_at_second_declaration() {
        let error = assemble_source("a: NOP a: NOP").expect_err("duplicate label");
        let location = error.location.expect("error has a position");

        assert!(matches!(
            error.kind,
            AssembleErrorKind::Symbol(SymbolError::DuplicateLabel { ref name, first })
                if name == "a" && first.column == 1
        ));
        assert_eq!(location.column, 8);
    }

    #[test]
    fn oversized_program_is_rejected() {
        let source = "NOP ".repeat(qproc_core::PROGRAM_MEMORY_BYTES + 1);
        let error = assemble_source(&source).expect_err("too large");

        assert_eq!(
            error.kind,
            AssembleErrorKind::ProgramTooLarge {
                size: qproc_core::PROGRAM_MEMORY_BYTES + 1,
                max: qproc_core::PROGRAM_MEMORY_BYTES,
            }
        );
        assert!(error.location.is_none());
    }

    #[test]
    fn listing_shows_patched_bytes() {
        let result = assemble_source("PUSH end JMP\nend: HALT").expect("source assembles");
        let listing = format_listing(&result.listing);

        assert_eq!(result.listing.len(), 3);
        assert_eq!(result.listing[0].bytes, vec![0x0D, 0, 0, 0, 6]);
        assert!(listing.starts_with("00000  0D 00 00 00 06  PUSH end\n"));
        assert!(listing.ends_with("00006  16              HALT\n"));
    }
}
