#![allow(dead_code)]

use std::io;

/// A writer that fails once it has accepted `max` writes.
pub struct Writer {
    buf: Vec<u8>,
    writes: usize,
    max: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::with_max(usize::MAX)
    }

    pub fn with_max(max: usize) -> Self {
        Self {
            buf: Vec::new(),
            writes: 0,
            max,
        }
    }

    #[track_caller]
    pub fn into_string(self) -> String {
        String::from_utf8(self.buf).unwrap()
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.writes >= self.max {
            return Err(io::Error::new(io::ErrorKind::Other, "writer is full"));
        }
        self.writes += 1;
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
