//! Program memory: a fixed-capacity, bounds-checked byte store.

/// Address validation helpers for jump targets and word accesses.
pub mod access;
/// Fixed layout of the memory-mapped frame buffer.
pub mod map;

pub use access::{read_i32_be, validate_code_address, validate_word_address, write_i32_be};
pub use map::{FRAME_BUFFER_BYTES, FRAME_BUFFER_START, FRAME_HEIGHT, FRAME_WIDTH};

/// Capacity of program memory in bytes; also the maximum program image size.
pub const PROGRAM_MEMORY_BYTES: usize = 16_384;

/// Width in bytes of a data word in program memory.
pub const WORD_BYTES: usize = 4;

/// Zero-initialized program memory of exactly [`PROGRAM_MEMORY_BYTES`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramMemory {
    bytes: Box<[u8]>,
}

impl Default for ProgramMemory {
    fn default() -> Self {
        Self {
            bytes: vec![0; PROGRAM_MEMORY_BYTES].into_boxed_slice(),
        }
    }
}

impl ProgramMemory {
    /// Creates memory with `image` copied to its prefix. The caller guarantees
    /// the image fits; longer input is truncated at capacity.
    #[must_use]
    pub fn with_prefix(image: &[u8]) -> Self {
        let mut memory = Self::default();
        let len = image.len().min(PROGRAM_MEMORY_BYTES);
        memory.bytes[..len].copy_from_slice(&image[..len]);
        memory
    }

    /// Capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Reads a big-endian word; `None` when the 4-byte window leaves memory.
    #[must_use]
    pub fn read_word(&self, addr: usize) -> Option<i32> {
        read_i32_be(&self.bytes, addr)
    }

    /// Writes a big-endian word; `None` when the 4-byte window leaves memory.
    pub fn write_word(&mut self, addr: usize, value: i32) -> Option<()> {
        write_i32_be(&mut self.bytes, addr, value)
    }

    /// Entire memory contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// The frame-buffer tail of memory.
    #[must_use]
    pub fn frame_buffer(&self) -> &[u8] {
        &self.bytes[FRAME_BUFFER_START..]
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgramMemory, FRAME_BUFFER_BYTES, PROGRAM_MEMORY_BYTES};

    #[test]
    fn default_memory_is_zeroed_at_full_capacity() {
        let memory = ProgramMemory::default();
        assert_eq!(memory.capacity(), PROGRAM_MEMORY_BYTES);
        assert!(memory.as_slice().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn prefix_is_loaded_and_rest_stays_zero() {
        let memory = ProgramMemory::with_prefix(&[0x0D, 0, 0, 0, 5, 0x16]);
        assert_eq!(&memory.as_slice()[..7], &[0x0D, 0, 0, 0, 5, 0x16, 0]);
        assert_eq!(memory.as_slice().len(), PROGRAM_MEMORY_BYTES);
    }

    #[test]
    fn word_access_stops_at_last_full_window() {
        let mut memory = ProgramMemory::default();
        let last = PROGRAM_MEMORY_BYTES - 4;

        assert_eq!(memory.write_word(last, -2), Some(()));
        assert_eq!(memory.read_word(last), Some(-2));
        assert_eq!(memory.read_word(last + 1), None);
        assert_eq!(memory.write_word(last + 1, 1), None);
    }

    #[test]
    fn frame_buffer_is_memory_tail() {
        let mut memory = ProgramMemory::default();
        memory
            .write_word(PROGRAM_MEMORY_BYTES - 4, 0x0102_0304)
            .expect("tail word fits");

        let frame = memory.frame_buffer();
        assert_eq!(frame.len(), FRAME_BUFFER_BYTES);
        assert_eq!(&frame[FRAME_BUFFER_BYTES - 4..], &[1, 2, 3, 4]);
    }
}
