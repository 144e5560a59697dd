//! Address validation and explicit big-endian word assembly.
//!
//! Every address popped from a stack passes through one of the validators
//! below before it indexes memory.

use crate::{FaultCode, PROGRAM_MEMORY_BYTES, WORD_BYTES};

/// Validates a control-transfer target against `[0, PROGRAM_MEMORY_BYTES)`.
///
/// # Errors
///
/// Returns [`FaultCode::AddressOutOfBounds`] for negative or too-large targets.
pub fn validate_code_address(addr: i64) -> Result<usize, FaultCode> {
    usize::try_from(addr)
        .ok()
        .filter(|target| *target < PROGRAM_MEMORY_BYTES)
        .ok_or(FaultCode::AddressOutOfBounds { address: addr })
}

/// Validates a data word address against `[0, PROGRAM_MEMORY_BYTES - WORD_BYTES]`.
///
/// # Errors
///
/// Returns [`FaultCode::AddressOutOfBounds`] when the 4-byte window would
/// leave program memory.
pub fn validate_word_address(addr: i64) -> Result<usize, FaultCode> {
    usize::try_from(addr)
        .ok()
        .filter(|start| *start <= PROGRAM_MEMORY_BYTES - WORD_BYTES)
        .ok_or(FaultCode::AddressOutOfBounds { address: addr })
}

/// Reads a big-endian two's-complement word at `at`.
///
/// Returns `None` when `bytes` has fewer than four bytes from `at`.
#[must_use]
pub fn read_i32_be(bytes: &[u8], at: usize) -> Option<i32> {
    let end = at.checked_add(WORD_BYTES)?;
    let window: [u8; WORD_BYTES] = bytes.get(at..end)?.try_into().ok()?;
    Some(i32::from_be_bytes(window))
}

/// Writes `value` big-endian at `at`.
///
/// Returns `None`, leaving `bytes` untouched, when the window does not fit.
pub fn write_i32_be(bytes: &mut [u8], at: usize, value: i32) -> Option<()> {
    let end = at.checked_add(WORD_BYTES)?;
    bytes.get_mut(at..end)?.copy_from_slice(&value.to_be_bytes());
    Some(())
}
