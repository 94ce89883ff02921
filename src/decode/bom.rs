//! Byte order mark detection.
//!
//! The first bytes of a stream are compared one at a time with the
//! signatures of the known codepages. Reading goes on while some longer
//! signature could still match, so `FF FE 00 00` is read as UTF-32LE
//! rather than stopping at the UTF-16LE mark `FF FE`.
//!
//! Bytes that were read but turned out not to be part of a BOM are handed
//! back in [`Detection::overflow`] so the line reader can deliver them
//! ahead of the rest of the stream.
use byteorder::ReadBytesExt;
use std::io::{self, Read};

use crate::codepage::KNOWN;

/// Longest BOM signature in the table.
pub const MAX_BOM_LEN: usize = 4;

/// The outcome of checking a stream for a BOM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    /// Index of the matched codepage, if any.
    pub codepage: Option<usize>,
    /// Content bytes consumed while looking for it.
    pub overflow: Vec<u8>,
}

/// Reads the start of `reader` for a byte order mark.
///
/// Reaching the end of the stream before a match counts as no match.
///
/// # Example
///
/// ```
/// use subsync::decode::bom::detect;
///
/// let mut input: &[u8] = b"\xEF\xBB\xBF1\r\n";
/// let detection = detect(&mut input).unwrap();
///
/// assert_eq!(detection.codepage, Some(subsync::codepage::UTF_8));
/// assert!(detection.overflow.is_empty());
/// assert_eq!(input, b"1\r\n");
/// ```
///
/// # Errors
///
/// Any I/O error other than an unexpected end of file is propagated.
pub fn detect<R: Read>(reader: &mut R) -> io::Result<Detection> {
    let mut head: Vec<u8> = Vec::with_capacity(MAX_BOM_LEN);
    let mut best: Option<(usize, usize)> = None;

    while head.len() < MAX_BOM_LEN {
        match reader.read_u8() {
            Ok(byte) => head.push(byte),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
        let n = head.len();

        if let Some(index) = KNOWN.iter().position(|cp| cp.signature == &head[..]) {
            best = Some((index, n));
        }

        let partial = KNOWN
            .iter()
            .any(|cp| cp.signature.len() > n && cp.signature.starts_with(&head));
        if !partial {
            break;
        }
    }

    let detection = match best {
        Some((index, len)) => Detection {
            codepage: Some(index),
            overflow: head.split_off(len),
        },
        None => Detection {
            codepage: None,
            overflow: head,
        },
    };
    Ok(detection)
}

#[cfg(test)]
#[path = "tests/bom_tests.rs"]
mod tests;
