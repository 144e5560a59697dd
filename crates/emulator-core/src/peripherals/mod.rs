//! Host-side devices: the integer console and the memory-mapped display.

/// Console implementations for `INPUT` and `PEEK`.
pub mod console;
/// Frame-buffer decoding and capture.
pub mod video;

pub use console::{ScriptedConsole, StdConsole};
pub use video::{decode_pixel, Frame, FrameCapture, Rgb};
