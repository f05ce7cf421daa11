//! Where rendered pixels go.

/// A strip driver accepting `3 × n` bytes of R, G, B per pixel.
pub trait LedSink {
    /// Push one full frame to the strip. Returns the number of pixel bytes
    /// written.
    fn write(&mut self, pixels: &[u8]) -> std::io::Result<usize>;
}

impl<S: LedSink + ?Sized> LedSink for Box<S> {
    fn write(&mut self, pixels: &[u8]) -> std::io::Result<usize> {
        (**self).write(pixels)
    }
}

pub mod mock {
    use super::*;

    /// In-memory sink for tests. Records every frame; `fail` makes writes
    /// return an error (nothing is recorded then).
    #[derive(Debug, Default)]
    pub struct MockSink {
        /// Frames written, oldest first.
        pub frames: Vec<Vec<u8>>,
        /// If true, `write` returns an error.
        pub fail: bool,
    }

    impl MockSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Most recent frame.
        pub fn last(&self) -> Option<&[u8]> {
            self.frames.last().map(Vec::as_slice)
        }
    }

    impl LedSink for MockSink {
        fn write(&mut self, pixels: &[u8]) -> std::io::Result<usize> {
            if self.fail {
                return Err(std::io::Error::other("mock sink failure"));
            }
            self.frames.push(pixels.to_vec());
            Ok(pixels.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockSink;
    use super::*;

    #[test]
    fn mock_records_frames() {
        let mut sink = MockSink::new();
        assert_eq!(sink.write(&[1, 2, 3]).unwrap(), 3);
        assert_eq!(sink.write(&[4, 5, 6]).unwrap(), 3);
        assert_eq!(sink.frames.len(), 2);
        assert_eq!(sink.last(), Some(&[4u8, 5, 6][..]));
    }

    #[test]
    fn mock_failure() {
        let mut sink = MockSink {
            fail: true,
            ..Default::default()
        };
        assert!(sink.write(&[0, 0, 0]).is_err());
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn boxed_sink_forwards() {
        let mut sink: Box<MockSink> = Box::new(MockSink::new());
        sink.write(&[7, 7, 7]).unwrap();
        assert_eq!(sink.frames, vec![vec![7, 7, 7]]);
    }
}
