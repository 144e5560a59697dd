//! Memory-mapped frame buffer layout.
//!
//! The last `FRAME_WIDTH * FRAME_HEIGHT` bytes of program memory hold one
//! pixel per byte, row-major, starting at the top-left corner.

use crate::PROGRAM_MEMORY_BYTES;

/// Frame width in pixels.
pub const FRAME_WIDTH: usize = 64;

/// Frame height in pixels.
pub const FRAME_HEIGHT: usize = 48;

/// Size in bytes of the frame buffer.
pub const FRAME_BUFFER_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT;

/// First address of the frame buffer.
pub const FRAME_BUFFER_START: usize = PROGRAM_MEMORY_BYTES - FRAME_BUFFER_BYTES;

const _: () = assert_frame_layout();

const fn assert_frame_layout() {
    assert!(
        FRAME_BUFFER_BYTES < PROGRAM_MEMORY_BYTES,
        "frame buffer must leave room for code"
    );
    assert!(
        FRAME_BUFFER_START + FRAME_BUFFER_BYTES == PROGRAM_MEMORY_BYTES,
        "frame buffer must end at the last memory byte"
    );
}
