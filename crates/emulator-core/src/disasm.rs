//! Linear disassembly of program images.
//!
//! Decoding starts at address 0 and walks forward one instruction at a time,
//! consuming `PUSH`'s four operand bytes, until a `HALT` or the end of the
//! image. There is no control-flow analysis.

use std::fmt::Write as _;

use thiserror::Error;

use crate::decoder::{decode_at, DecodeError};
use crate::encoding::Opcode;

/// A single disassembled instruction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// Address of the opcode byte.
    pub addr: usize,
    /// The instruction.
    pub opcode: Opcode,
    /// `PUSH` operand.
    pub operand: Option<i32>,
}

impl DisassemblyRow {
    /// Encoded length in bytes.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        self.opcode.encoded_len()
    }
}

impl std::fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operand {
            Some(operand) => write!(f, "{} {operand}", self.opcode),
            None => write!(f, "{}", self.opcode),
        }
    }
}

/// Why an image could not be disassembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisasmError {
    /// Byte is not an opcode.
    #[error("unknown operation 0x{byte:02X} ; instruction #{addr}")]
    UnknownOpcode {
        /// Offending byte.
        byte: u8,
        /// Its address.
        addr: usize,
    },
    /// `PUSH` at the end of the image without four operand bytes.
    #[error("PUSH used without a proper operand ; instruction #{addr}")]
    TruncatedOperand {
        /// Address of the `PUSH`.
        addr: usize,
    },
}

/// Disassembles `bytes` in one linear pass.
///
/// # Errors
///
/// Returns a [`DisasmError`] at the first byte that is not an opcode or the
/// first `PUSH` whose operand runs past the end of `bytes`.
pub fn disassemble(bytes: &[u8]) -> Result<Vec<DisassemblyRow>, DisasmError> {
    let mut rows = Vec::new();
    let mut addr = 0;

    loop {
        let decoded = match decode_at(bytes, addr) {
            Ok(decoded) => decoded,
            Err(DecodeError::OutOfRange) => break,
            Err(DecodeError::UnknownOpcode(byte)) => {
                return Err(DisasmError::UnknownOpcode { byte, addr });
            }
            Err(DecodeError::TruncatedOperand) => {
                return Err(DisasmError::TruncatedOperand { addr });
            }
        };

        rows.push(DisassemblyRow {
            addr,
            opcode: decoded.opcode,
            operand: decoded.operand,
        });
        if decoded.opcode == Opcode::Halt {
            break;
        }
        addr += decoded.len;
    }

    Ok(rows)
}

/// Renders rows as assembly source, one statement per line.
#[must_use]
pub fn render_listing(rows: &[DisassemblyRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "{row}");
    }
    out
}
