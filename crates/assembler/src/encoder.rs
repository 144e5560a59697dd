//! Byte emission, `CALL` expansion and label patching.

use qproc_core::{write_i32_be, Opcode, PROGRAM_MEMORY_BYTES, WORD_BYTES};

use crate::errors::{AssembleErrorKind, SourceLocation};
use crate::symbols::SymbolTable;

/// Encoded size of one `CALL name`: `PUSH ret`, `PUSHIP`, `PUSH name`, `JMP`.
pub const CALL_EXPANSION_BYTES: usize =
    2 * Opcode::Push.encoded_len() + Opcode::PushIp.encoded_len() + Opcode::Jmp.encoded_len();

/// A resolved or deferred 32-bit operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandValue<'a> {
    /// Known now.
    Literal(i32),
    /// Address of a label, written after the last token.
    Label(&'a str),
}

/// Growing program buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoder {
    bytes: Vec<u8>,
}

impl Encoder {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the next byte, which is also its runtime address.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.bytes.len()
    }

    /// Emits an instruction without operand.
    pub fn emit_opcode(&mut self, opcode: Opcode) {
        self.bytes.push(opcode.as_u8());
    }

    /// Emits `PUSH value`. A label operand reserves four zero bytes and
    /// records a usage in `symbols`.
    pub fn emit_push(
        &mut self,
        value: OperandValue<'_>,
        location: SourceLocation,
        symbols: &mut SymbolTable,
    ) {
        self.emit_opcode(Opcode::Push);
        match value {
            OperandValue::Literal(literal) => self.bytes.extend_from_slice(&literal.to_be_bytes()),
            OperandValue::Label(name) => {
                symbols.record_usage(name, self.offset(), location);
                self.bytes.extend_from_slice(&[0; WORD_BYTES]);
            }
        }
    }

    /// Emits the `CALL target` expansion: push the address following the
    /// expansion, move it to the instruction stack, then jump to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`AssembleErrorKind::ProgramTooLarge`] if the return address
    /// cannot be represented.
    pub fn emit_call(
        &mut self,
        target: OperandValue<'_>,
        location: SourceLocation,
        symbols: &mut SymbolTable,
    ) -> Result<(), AssembleErrorKind> {
        let return_to = address_word(self.offset() + CALL_EXPANSION_BYTES)?;
        self.emit_push(OperandValue::Literal(return_to), location, symbols);
        self.emit_opcode(Opcode::PushIp);
        self.emit_push(target, location, symbols);
        self.emit_opcode(Opcode::Jmp);
        Ok(())
    }

    /// Writes `address` big-endian into the 4-byte slot at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`AssembleErrorKind::ProgramTooLarge`] if the address cannot be
    /// represented or the slot lies outside the buffer.
    pub fn patch(&mut self, offset: usize, address: usize) -> Result<(), AssembleErrorKind> {
        let word = address_word(address)?;
        write_i32_be(&mut self.bytes, offset, word).ok_or(AssembleErrorKind::ProgramTooLarge {
            size: self.bytes.len(),
            max: PROGRAM_MEMORY_BYTES,
        })
    }

    /// Bytes emitted so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the encoder.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn address_word(address: usize) -> Result<i32, AssembleErrorKind> {
    i32::try_from(address).map_err(|_| AssembleErrorKind::ProgramTooLarge {
        size: address,
        max: PROGRAM_MEMORY_BYTES,
    })
}
