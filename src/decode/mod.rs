//! This module contains the input side of the codec bridge: BOM detection,
//! the per-stream decoder and the line reader built on top of them.
//!
//! Lines come out of the reader as byte vectors. When the source codepage
//! is known and differs from the output codepage the bytes are UTF-8;
//! otherwise they are the raw input bytes, passed through untouched. The
//! retiming engine only looks at ASCII, so either way it can work on them.
//!
//! `encoding_rs` covers every codepage it has a label for. UTF-32 is not
//! part of that set and is decoded here from its code units directly.

pub mod bom;
pub mod read;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use encoding_rs::{CoderResult, Encoding, UTF_16BE, UTF_16LE};

use crate::codepage::{Codepage, Endian};

/// Converts raw line bytes of the source codepage into UTF-8.
pub enum Decoder {
    /// Bytes are passed through as read.
    Identity,
    Whatwg(encoding_rs::Decoder),
    Utf32(Endian),
}

impl Decoder {
    /// Builds a decoder for `codepage`, or `None` if there is no converter
    /// for it.
    ///
    /// The code unit width decides first: 4-byte codepages are UTF-32 and
    /// 2-byte codepages UTF-16 in their byte order. Single byte codepages
    /// are looked up by name. The BOM has already been consumed by
    /// detection, so the decoder must not sniff for one again.
    pub fn for_codepage(codepage: &Codepage) -> Option<Decoder> {
        let encoding: &'static Encoding = match (codepage.width, codepage.endian) {
            (4, endian) => return Some(Decoder::Utf32(endian)),
            (2, Endian::Little) => UTF_16LE,
            (2, Endian::Big) => UTF_16BE,
            _ => Encoding::for_label(codepage.name.as_bytes())?,
        };
        Some(Decoder::Whatwg(encoding.new_decoder_without_bom_handling()))
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Decoder::Identity)
    }

    /// Decodes one raw line.
    ///
    /// `last` marks the final line of the stream. A multi-byte sequence left
    /// incomplete at its end comes out as U+FFFD instead of being held back
    /// for input that never arrives. The decoder must not be used after that.
    pub fn decode(&mut self, raw: &[u8], last: bool) -> Vec<u8> {
        match self {
            Decoder::Identity => raw.to_vec(),
            Decoder::Whatwg(decoder) => {
                let mut text = String::new();
                let mut input = raw;
                loop {
                    let needed = decoder
                        .max_utf8_buffer_length(input.len())
                        .unwrap_or(input.len() * 3 + 16);
                    text.reserve(needed);

                    let (result, read, _) = decoder.decode_to_string(input, &mut text, last);
                    input = &input[read..];
                    if result == CoderResult::InputEmpty {
                        break;
                    }
                }
                text.into_bytes()
            }
            Decoder::Utf32(endian) => {
                let mut text = String::with_capacity(raw.len());
                for unit in raw.chunks_exact(4) {
                    let scalar = match endian {
                        Endian::Little => LittleEndian::read_u32(unit),
                        Endian::Big => BigEndian::read_u32(unit),
                    };
                    text.push(char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                text.into_bytes()
            }
        }
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decoder::Identity => write!(f, "Identity"),
            Decoder::Whatwg(decoder) => write!(f, "Whatwg({})", decoder.encoding().name()),
            Decoder::Utf32(endian) => write!(f, "Utf32({endian:?})"),
        }
    }
}

#[cfg(test)]
#[path = "tests/decode_tests.rs"]
mod tests;
