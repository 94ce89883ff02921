//! This module contains the output side of the codec bridge: the encoder
//! that turns rewritten UTF-8 lines into the output codepage, and the
//! [`LineWriter`] that writes the output BOM once and then the lines.
//!
//! `encoding_rs` only encodes into single and multi byte legacy
//! codepages and UTF-8, so UTF-16 and UTF-32 output is produced here from
//! the characters' code units.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use encoding_rs::{CoderResult, Encoding};
use std::borrow::Cow;
use std::io::{self, Write};

use crate::codepage::{Codepage, Endian};

/// Converts rewritten UTF-8 lines into the output codepage.
pub enum Encoder {
    /// Bytes are written as they are.
    Identity,
    Whatwg(encoding_rs::Encoder),
    Utf16(Endian),
    Utf32(Endian),
}

impl Encoder {
    /// Builds an encoder for `codepage`, or `None` if there is no converter
    /// for it.
    pub fn for_codepage(codepage: &Codepage) -> Option<Encoder> {
        match (codepage.width, codepage.endian) {
            (4, endian) => Some(Encoder::Utf32(endian)),
            (2, endian) => Some(Encoder::Utf16(endian)),
            _ => {
                let encoding = Encoding::for_label(codepage.name.as_bytes())?;
                // labels such as "replacement" decode but cannot be encoded into
                if encoding.output_encoding() != encoding {
                    return None;
                }
                Some(Encoder::Whatwg(encoding.new_encoder()))
            }
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Encoder::Identity)
    }

    /// Appends the encoded form of `line` to `out`.
    ///
    /// Non-identity encoders expect UTF-8; anything else is replaced with
    /// U+FFFD before encoding.
    pub fn encode(&mut self, line: &[u8], out: &mut Vec<u8>) -> io::Result<()> {
        let text: Cow<'_, str> = String::from_utf8_lossy(line);

        match self {
            Encoder::Identity => out.extend_from_slice(line),
            Encoder::Whatwg(encoder) => {
                let mut input: &str = &text;
                loop {
                    let needed = encoder
                        .max_buffer_length_from_utf8_if_no_unmappables(input.len())
                        .unwrap_or(input.len() * 4 + 16);
                    // room for one numeric character reference on top
                    out.reserve(needed + 10);

                    let (result, read, _) = encoder.encode_from_utf8_to_vec(input, out, false);
                    input = &input[read..];
                    if result == CoderResult::InputEmpty {
                        break;
                    }
                }
            }
            Encoder::Utf16(endian) => {
                for unit in text.encode_utf16() {
                    match endian {
                        Endian::Little => out.write_u16::<LittleEndian>(unit)?,
                        Endian::Big => out.write_u16::<BigEndian>(unit)?,
                    }
                }
            }
            Encoder::Utf32(endian) => {
                for ch in text.chars() {
                    match endian {
                        Endian::Little => out.write_u32::<LittleEndian>(ch as u32)?,
                        Endian::Big => out.write_u32::<BigEndian>(ch as u32)?,
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoder::Identity => write!(f, "Identity"),
            Encoder::Whatwg(encoder) => write!(f, "Whatwg({})", encoder.encoding().name()),
            Encoder::Utf16(endian) => write!(f, "Utf16({endian:?})"),
            Encoder::Utf32(endian) => write!(f, "Utf32({endian:?})"),
        }
    }
}

/// A struct to make writing the rewritten lines easier.
///
/// The output BOM, if any, is written when the writer is created. Lines
/// are encoded one at a time and written straight through; nothing is
/// held back between lines.
///
/// # Example
///
/// ```
/// use subsync::codepage::Endian;
/// use subsync::encode::{Encoder, LineWriter};
///
/// let mut buffer = Vec::new();
/// let mut writer = LineWriter::new(&mut buffer, Encoder::Utf16(Endian::Little), b"\xFF\xFE").unwrap();
/// writer.write_line(b"1\n").unwrap();
/// writer.finish().unwrap();
///
/// assert_eq!(buffer, b"\xFF\xFE1\0\n\0");
/// ```
pub struct LineWriter<W: Write> {
    writer: W,
    encoder: Encoder,
    scratch: Vec<u8>,
    line_count: usize,
}

impl<W: Write> LineWriter<W> {
    /// Create a new LineWriter and write the `bom` bytes.
    pub fn new(mut writer: W, encoder: Encoder, bom: &[u8]) -> io::Result<Self> {
        writer.write_all(bom)?;
        Ok(LineWriter {
            writer,
            encoder,
            scratch: Vec::new(),
            line_count: 0,
        })
    }

    /// Encode a rewritten line and write it out.
    pub fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        if self.encoder.is_identity() {
            self.writer.write_all(line)?;
        } else {
            self.scratch.clear();
            self.encoder.encode(line, &mut self.scratch)?;
            self.writer.write_all(&self.scratch)?;
        }
        self.line_count += 1;
        Ok(())
    }

    /// Number of lines written so far.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Flush everything written so far and hand back the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
#[path = "tests/encode_tests.rs"]
mod tests;
