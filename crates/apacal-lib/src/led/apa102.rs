//! APA102 ("DotStar") frame encoding.
//!
//! A frame is a 32-bit zero start frame, one 32-bit word per LED
//! (`0b111` + 5-bit global brightness, then blue, green, red), and an end
//! frame that clocks the data through the last LEDs.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use super::layout::BYTES_PER_PIXEL;
use super::sink::LedSink;

const START_FRAME: [u8; 4] = [0; 4];
/// `0b111` header with the 5-bit global brightness at its maximum; intensity
/// is applied to the channels instead.
const LED_HEADER: u8 = 0xFF;
const MIN_END_FRAME: usize = 4;

/// APA102 strip behind any byte writer, usually an SPI character device.
#[derive(Debug)]
pub struct Apa102<W: Write> {
    out: W,
    num_pixels: usize,
    intensity: u8,
    frame: Vec<u8>,
}

impl Apa102<File> {
    /// Open an SPI device node (e.g. `/dev/spidev0.0`) for writing.
    pub fn open(path: &Path, num_pixels: usize, intensity: u8) -> io::Result<Self> {
        let out = OpenOptions::new().write(true).open(path)?;
        Ok(Self::new(out, num_pixels, intensity))
    }
}

impl<W: Write> Apa102<W> {
    /// `intensity` caps every channel: a channel value `c` is sent as
    /// `c * intensity / 255`.
    pub fn new(out: W, num_pixels: usize, intensity: u8) -> Self {
        Self {
            out,
            num_pixels,
            intensity,
            frame: Vec::with_capacity(frame_len(num_pixels)),
        }
    }

    pub fn num_pixels(&self) -> usize {
        self.num_pixels
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn scale(&self, c: u8) -> u8 {
        (u16::from(c) * u16::from(self.intensity) / 255) as u8
    }

    /// Build the wire frame for `pixels` into the reusable buffer.
    fn encode(&mut self, pixels: &[u8]) {
        let mut frame = std::mem::take(&mut self.frame);
        frame.clear();
        frame.extend_from_slice(&START_FRAME);
        for px in pixels.chunks_exact(BYTES_PER_PIXEL) {
            frame.extend_from_slice(&[
                LED_HEADER,
                self.scale(px[2]),
                self.scale(px[1]),
                self.scale(px[0]),
            ]);
        }
        frame.resize(frame_len(self.num_pixels), 0);
        self.frame = frame;
    }
}

/// Total frame size: start frame, LED words, and at least one end-frame bit
/// per two LEDs.
fn frame_len(num_pixels: usize) -> usize {
    START_FRAME.len() + num_pixels * 4 + num_pixels.div_ceil(16).max(MIN_END_FRAME)
}

impl<W: Write> LedSink for Apa102<W> {
    fn write(&mut self, pixels: &[u8]) -> io::Result<usize> {
        let want = self.num_pixels * BYTES_PER_PIXEL;
        if pixels.len() != want {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("got {} pixel bytes, want {want}", pixels.len()),
            ));
        }
        self.encode(pixels);
        self.out.write_all(&self.frame)?;
        self.out.flush()?;
        Ok(pixels.len())
    }
}
