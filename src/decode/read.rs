//! The line reader.
//!
//! Splits the raw input into lines before decoding, which is why it has to
//! know the code unit width and byte order: in UTF-16 and UTF-32 the line
//! feed is a zero-padded 2 or 4 byte unit, and a lone 0x0A byte may be half
//! of some other character.
use std::io::{self, BufRead, Chain, Cursor, Read};

use super::Decoder;
use crate::codepage::{is_line_feed, Endian};

/// Maximum length of a raw line, terminator included. Longer lines are cut
/// and the excess up to the terminator is dropped.
pub const MAX_LINE: usize = 4096;

/// A lazy, forward-only iterator over the decoded lines of a stream.
///
/// Every line keeps its terminator, so writing the lines back out one after
/// another reproduces the line structure of the input. The end of the
/// stream is `None`, never an empty line.
///
/// # Example
///
/// ```
/// use subsync::codepage::Endian;
/// use subsync::decode::{read::LineReader, Decoder};
///
/// let input: &[u8] = b"\n00:00:01,000\r\nlast";
/// let lines: Vec<Vec<u8>> = LineReader::new(input, b"1".to_vec(), Decoder::Identity, 1, Endian::Little)
///     .collect::<std::io::Result<_>>()
///     .unwrap();
///
/// assert_eq!(lines, vec![b"1\n".to_vec(), b"00:00:01,000\r\n".to_vec(), b"last".to_vec()]);
/// ```
pub struct LineReader<R: BufRead> {
    reader: Chain<Cursor<Vec<u8>>, R>,
    decoder: Decoder,
    width: usize,
    endian: Endian,
    line_count: usize,
}

impl<R: BufRead> LineReader<R> {
    /// Create a new LineReader. The `overflow` bytes left over from BOM
    /// detection are read before `reader`.
    pub fn new(reader: R, overflow: Vec<u8>, decoder: Decoder, width: usize, endian: Endian) -> Self {
        LineReader {
            reader: Cursor::new(overflow).chain(reader),
            decoder,
            width,
            endian,
            line_count: 0,
        }
    }

    /// Number of lines produced so far.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    fn read_raw(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.width > 1 {
            self.read_units()
        } else {
            self.read_bytes()
        }
    }

    /// Single byte codepages, or no codepage at all.
    fn read_bytes(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let mut seen_any = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }
            seen_any = true;

            let (used, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };
            let body = &available[..used - done as usize];
            let room = (MAX_LINE - 1).saturating_sub(line.len());
            line.extend_from_slice(&body[..body.len().min(room)]);
            if done {
                line.push(b'\n');
            }

            self.reader.consume(used);
            if done {
                break;
            }
        }

        Ok(seen_any.then_some(line))
    }

    /// 2 and 4 byte codepages, read one whole code unit at a time. A partial
    /// unit at the end of the stream is dropped.
    fn read_units(&mut self) -> io::Result<Option<Vec<u8>>> {
        let width = self.width;
        let mut line = Vec::new();
        let mut buf = [0u8; 4];

        loop {
            let unit = &mut buf[..width];
            match self.reader.read_exact(unit) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }

            let line_feed = is_line_feed(unit, width, self.endian);
            if line_feed || line.len() + 2 * width <= MAX_LINE {
                line.extend_from_slice(unit);
            }
            if line_feed {
                break;
            }
        }

        Ok((!line.is_empty()).then_some(line))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<io::Result<Vec<u8>>> {
        let raw = match self.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };
        self.line_count += 1;

        // only the end of the stream leaves a line without its terminator
        let width = self.width.max(1);
        let terminated = raw.len() >= width && is_line_feed(&raw[raw.len() - width..], width, self.endian);
        Some(Ok(self.decoder.decode(&raw, !terminated)))
    }
}
