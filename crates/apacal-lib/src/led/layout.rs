//! Which pixels of the strip show the color.

use crate::color::Color;
use crate::error::{ApacalError, Result};

/// Bytes per pixel in the sink representation (R, G, B).
pub const BYTES_PER_PIXEL: usize = 3;

/// A strip of `num_pixels` LEDs of which only `[first, last)` are lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    num_pixels: usize,
    first: usize,
    last: usize,
}

impl StripLayout {
    /// Validate a pixel window. `last` defaults to the whole strip.
    pub fn new(num_pixels: usize, first: usize, last: Option<usize>) -> Result<Self> {
        let last = last.unwrap_or(num_pixels);
        if last > num_pixels {
            return Err(ApacalError::Layout(format!(
                "last pixel is greater than the number of pixels ({last} > {num_pixels})"
            )));
        }
        if first > last {
            return Err(ApacalError::Layout(format!(
                "first and last pixel out of order ({first} > {last})"
            )));
        }
        Ok(Self {
            num_pixels,
            first,
            last,
        })
    }

    /// Every pixel lit.
    pub fn full(num_pixels: usize) -> Self {
        Self {
            num_pixels,
            first: 0,
            last: num_pixels,
        }
    }

    pub fn num_pixels(&self) -> usize {
        self.num_pixels
    }

    /// Lit range, end exclusive.
    pub fn window(&self) -> std::ops::Range<usize> {
        self.first..self.last
    }

    /// Render `color` into `3 × num_pixels` bytes, zero outside the window.
    ///
    /// Alpha is ignored.
    pub fn fill(&self, color: Color) -> Vec<u8> {
        let mut pixels = vec![0u8; self.num_pixels * BYTES_PER_PIXEL];
        for px in pixels[self.first * BYTES_PER_PIXEL..self.last * BYTES_PER_PIXEL]
            .chunks_exact_mut(BYTES_PER_PIXEL)
        {
            px.copy_from_slice(&[color.r, color.g, color.b]);
        }
        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_defaults_to_strip_length() {
        let layout = StripLayout::new(5, 0, None).unwrap();
        assert_eq!(layout.window(), 0..5);
        assert_eq!(layout, StripLayout::full(5));
    }

    #[test]
    fn rejects_last_past_end() {
        let err = StripLayout::new(4, 0, Some(5)).unwrap_err();
        assert!(err.to_string().contains("5 > 4"), "got {err}");
    }

    #[test]
    fn rejects_first_after_last() {
        assert!(matches!(
            StripLayout::new(10, 6, Some(3)),
            Err(ApacalError::Layout(_))
        ));
    }

    #[test]
    fn empty_window_is_valid() {
        let layout = StripLayout::new(3, 2, Some(2)).unwrap();
        assert_eq!(layout.fill(Color::WHITE), vec![0; 9]);
    }

    #[test]
    fn fill_whole_strip() {
        let pixels = StripLayout::full(2).fill(Color::rgb(1, 2, 3));
        assert_eq!(pixels, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn fill_lights_only_the_window() {
        let layout = StripLayout::new(4, 1, Some(3)).unwrap();
        let pixels = layout.fill(Color::rgb(9, 8, 7));
        assert_eq!(pixels, vec![0, 0, 0, 9, 8, 7, 9, 8, 7, 0, 0, 0]);
    }

    #[test]
    fn fill_ignores_alpha() {
        let c = Color {
            r: 10,
            g: 20,
            b: 30,
            a: 0,
        };
        assert_eq!(StripLayout::full(1).fill(c), vec![10, 20, 30]);
    }

    #[test]
    fn zero_pixels() {
        let layout = StripLayout::new(0, 0, None).unwrap();
        assert!(layout.fill(Color::WHITE).is_empty());
    }
}
