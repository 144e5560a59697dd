//! Instruction decoder shared by the machine and the disassembler.

use crate::encoding::Opcode;
use crate::memory::read_i32_be;

/// A decoded instruction and its encoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// The instruction.
    pub opcode: Opcode,
    /// Immediate operand, present only for `PUSH`.
    pub operand: Option<i32>,
    /// Encoded length in bytes (1 or 5).
    pub len: usize,
}

/// Why a byte sequence could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// Address is outside the byte slice.
    OutOfRange,
    /// Byte is not an opcode.
    UnknownOpcode(u8),
    /// `PUSH` without four operand bytes after it.
    TruncatedOperand,
}

/// Decodes the instruction starting at `addr`.
///
/// # Errors
///
/// Returns a [`DecodeError`] when `addr` is past the end of `bytes`, the byte
/// is not an opcode, or a `PUSH` operand is cut off.
pub fn decode_at(bytes: &[u8], addr: usize) -> Result<DecodedInstruction, DecodeError> {
    let raw = *bytes.get(addr).ok_or(DecodeError::OutOfRange)?;
    let opcode = Opcode::from_u8(raw).ok_or(DecodeError::UnknownOpcode(raw))?;

    let operand = if opcode.operand_bytes() > 0 {
        let start = addr + 1;
        Some(read_i32_be(bytes, start).ok_or(DecodeError::TruncatedOperand)?)
    } else {
        None
    };

    Ok(DecodedInstruction {
        opcode,
        operand,
        len: opcode.encoded_len(),
    })
}
