//! Memory-mapped display.
//!
//! Each frame-buffer byte is one pixel. Its low nibble is `IRGB`: bit 3 is
//! intensity, bits 2..0 are red, green and blue. The high nibble is ignored.

use crate::api::FrameSink;
use crate::memory::{FRAME_BUFFER_BYTES, FRAME_HEIGHT, FRAME_WIDTH};

const INTENSITY_BIT: u8 = 0b1000;
const RED_BIT: u8 = 0b0100;
const GREEN_BIT: u8 = 0b0010;
const BLUE_BIT: u8 = 0b0001;

/// A 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    #[allow(missing_docs)]
    pub r: u8,
    #[allow(missing_docs)]
    pub g: u8,
    #[allow(missing_docs)]
    pub b: u8,
}

/// Decodes one frame-buffer byte.
#[must_use]
pub const fn decode_pixel(byte: u8) -> Rgb {
    let bright = byte & INTENSITY_BIT != 0;
    Rgb {
        r: channel(byte & RED_BIT != 0, bright),
        g: channel(byte & GREEN_BIT != 0, bright),
        b: channel(byte & BLUE_BIT != 0, bright),
    }
}

const fn channel(on: bool, bright: bool) -> u8 {
    match (on, bright) {
        (false, false) => 0x00,
        (false, true) => 0x55,
        (true, false) => 0xAA,
        (true, true) => 0xFF,
    }
}

/// Borrowed view of the frame buffer at one instruction boundary.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pixels: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Wraps a frame-buffer slice of exactly [`FRAME_BUFFER_BYTES`] bytes.
    #[must_use]
    pub fn new(pixels: &'a [u8]) -> Option<Self> {
        (pixels.len() == FRAME_BUFFER_BYTES).then_some(Self { pixels })
    }

    /// Raw pixel bytes, row-major.
    #[must_use]
    pub const fn raw(&self) -> &'a [u8] {
        self.pixels
    }

    /// Decoded colour at `(x, y)`; `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= FRAME_WIDTH || y >= FRAME_HEIGHT {
            return None;
        }
        Some(decode_pixel(self.pixels[y * FRAME_WIDTH + x]))
    }

    /// Decoded frame as packed `RGB` triplets, row-major.
    #[must_use]
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|byte| {
                let Rgb { r, g, b } = decode_pixel(*byte);
                [r, g, b]
            })
            .collect()
    }
}

/// Frame sink that keeps the most recently presented frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameCapture {
    last: Vec<u8>,
    presented: u64,
}

impl FrameCapture {
    /// Number of frames presented so far.
    #[must_use]
    pub const fn presented(&self) -> u64 {
        self.presented
    }

    /// The last frame, if any was presented.
    #[must_use]
    pub fn last_frame(&self) -> Option<Frame<'_>> {
        Frame::new(&self.last)
    }
}

impl FrameSink for FrameCapture {
    fn present(&mut self, frame: &Frame<'_>) {
        self.last.clear();
        self.last.extend_from_slice(frame.raw());
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{decode_pixel, Frame, FrameCapture, Rgb};
    use crate::api::FrameSink;
    use crate::memory::{FRAME_BUFFER_BYTES, FRAME_WIDTH};

    #[rstest]
    #[case(0x0, Rgb { r: 0x00, g: 0x00, b: 0x00 })]
    #[case(0x4, Rgb { r: 0xAA, g: 0x00, b: 0x00 })]
    #[case(0x2, Rgb { r: 0x00, g: 0xAA, b: 0x00 })]
    #[case(0x1, Rgb { r: 0x00, g: 0x00, b: 0xAA })]
    #[case(0x8, Rgb { r: 0x55, g: 0x55, b: 0x55 })]
    #[case(0xF, Rgb { r: 0xFF, g: 0xFF, b: 0xFF })]
    #[case(0xFC, Rgb { r: 0xFF, g: 0x55, b: 0x55 })]
    #[case(0x0E, Rgb { r: 0xFF, g: 0xFF, b: 0x55 })]
    fn low_nibble_selects_irgb(#[case] byte: u8, #[case] expected: Rgb) {
        assert_eq!(decode_pixel(byte), expected);
    }

    #[test]
    fn frame_requires_exact_buffer_size() {
        assert!(Frame::new(&[0; 10]).is_none());
        assert!(Frame::new(&vec![0; FRAME_BUFFER_BYTES]).is_some());
    }

    #[test]
    fn pixels_are_row_major() {
        let mut raw = vec![0u8; FRAME_BUFFER_BYTES];
        raw[FRAME_WIDTH + 2] = 0x4;
        let frame = Frame::new(&raw).expect("exact size");

        assert_eq!(frame.pixel(2, 1), Some(decode_pixel(0x4)));
        assert_eq!(frame.pixel(1, 2), Some(decode_pixel(0x0)));
        assert_eq!(frame.pixel(FRAME_WIDTH, 0), None);
        assert_eq!(frame.to_rgb_bytes().len(), FRAME_BUFFER_BYTES * 3);
    }

    #[test]
    fn capture_keeps_latest_frame() {
        let mut capture = FrameCapture::default();
        assert!(capture.last_frame().is_none());

        let first = vec![1u8; FRAME_BUFFER_BYTES];
        let second = vec![2u8; FRAME_BUFFER_BYTES];
        capture.present(&Frame::new(&first).expect("exact size"));
        capture.present(&Frame::new(&second).expect("exact size"));

        assert_eq!(capture.presented(), 2);
        assert_eq!(
            capture.last_frame().map(|frame| frame.raw()[0]),
            Some(2)
        );
    }
}
