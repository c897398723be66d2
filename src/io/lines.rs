//! Line streaming that tolerates non-UTF-8 bytes.
//!
//! Descriptor and `.eio` files are written by tools that do not always emit
//! UTF-8 (object names in Latin-1 are common). Every marker this crate looks
//! for is ASCII, so invalid bytes are replaced instead of failing the read.

use std::io::{self, BufRead};

/// Iterator over the lines of a reader, decoded lossily.
///
/// Line terminators (`\n` or `\r\n`) are stripped. Only I/O failures are
/// reported as errors.
#[derive(Debug)]
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

/// Streams the lines of `reader` one at a time.
///
/// # Examples
///
/// ```
/// use gen_cashflow::io::lines::lossy_lines;
///
/// let lines: Vec<String> = lossy_lines(&b"Z\xfcrich\r\nPerth"[..])
///     .collect::<std::io::Result<_>>()
///     .unwrap();
/// assert_eq!(lines, ["Z\u{FFFD}rich", "Perth"]);
/// ```
pub fn lossy_lines<R: BufRead>(reader: R) -> LossyLines<R> {
    LossyLines {
        reader,
        buf: Vec::new(),
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
