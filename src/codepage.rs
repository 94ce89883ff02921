//! Codepage descriptors.
//!
//! A codepage couples an encoding name with the byte order mark that
//! announces it and the width and byte order of its code units. The width
//! and byte order are what the line reader needs to find line terminators
//! before anything is decoded.
//!
//! The table of known codepages is fixed. A [`CodepageTable`] adds one
//! user-defined slot on top of it, filled from an explicit encoding name.
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::borrow::Cow;

use crate::error::{Error, Result};

/// Byte order of multi-byte code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// A named character encoding together with its BOM, code unit width and
/// byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codepage {
    pub signature: &'static [u8],
    pub name: Cow<'static, str>,
    pub width: usize,
    pub endian: Endian,
}

impl Codepage {
    const fn known(signature: &'static [u8], name: &'static str, width: usize, endian: Endian) -> Self {
        Codepage {
            signature,
            name: Cow::Borrowed(name),
            width,
            endian,
        }
    }

    /// Returns true if the code unit in `unit` is the line feed character
    /// for this codepage's width and byte order.
    pub fn is_line_feed(&self, unit: &[u8]) -> bool {
        is_line_feed(unit, self.width, self.endian)
    }
}

/// Index of the UTF-8 descriptor, the default output codepage.
pub const UTF_8: usize = 0;

/// Index of the user-defined slot, just past the known table.
pub const USER_DEFINED: usize = 9;

/// The codepages recognizable by their byte order mark.
pub static KNOWN: [Codepage; 9] = [
    Codepage::known(b"\xEF\xBB\xBF", "UTF-8", 1, Endian::Little),
    Codepage::known(b"\xFE\xFF", "UTF-16BE", 2, Endian::Big),
    Codepage::known(b"\xFF\xFE", "UTF-16LE", 2, Endian::Little),
    Codepage::known(b"\x00\x00\xFE\xFF", "UTF-32BE", 4, Endian::Big),
    Codepage::known(b"\xFF\xFE\x00\x00", "UTF-32LE", 4, Endian::Little),
    Codepage::known(b"\x2B\x2F\x76", "UTF-7", 1, Endian::Little),
    Codepage::known(b"\xF7\x64\x4C", "UTF-1", 1, Endian::Little),
    Codepage::known(b"\xDD\x73\x66\x73", "UTF-EBCDIC", 1, Endian::Little),
    Codepage::known(b"\x84\x31\x95\x33", "GB18030", 1, Endian::Little),
];

/// The known codepages plus the user-defined slot.
///
/// The slot is filled at most once by [`CodepageTable::register`] and then
/// read by every stream processed with this table.
#[derive(Debug, Clone, Default)]
pub struct CodepageTable {
    user_defined: Option<Codepage>,
}

impl CodepageTable {
    pub fn new() -> Self {
        CodepageTable::default()
    }

    /// Registers an explicit encoding name and returns its index.
    ///
    /// A name matching one of the known codepages (ignoring case) returns
    /// that codepage's index and leaves the slot alone. Any other name fills
    /// the user-defined slot. Its width is guessed from "16" or "32" in the
    /// name and its byte order from "BE" or "be"; the defaults are one byte
    /// and little endian.
    ///
    /// # Errors
    ///
    /// The slot holds one codepage. Registering a second, different name
    /// fails with [`Error::CodepageConflict`]; the same name again (ignoring
    /// case) returns the slot.
    pub fn register(&mut self, name: &str) -> Result<usize> {
        if let Some(index) = KNOWN
            .iter()
            .position(|cp| cp.name.eq_ignore_ascii_case(name))
        {
            return Ok(index);
        }

        if let Some(registered) = &self.user_defined {
            if registered.name.eq_ignore_ascii_case(name) {
                return Ok(USER_DEFINED);
            }
            return Err(Error::CodepageConflict {
                registered: registered.name.to_string(),
                requested: name.to_owned(),
            });
        }

        let width = if name.contains("16") {
            2
        } else if name.contains("32") {
            4
        } else {
            1
        };
        let endian = if name.contains("BE") || name.contains("be") {
            Endian::Big
        } else {
            Endian::Little
        };

        self.user_defined = Some(Codepage {
            signature: b"",
            name: Cow::Owned(name.to_owned()),
            width,
            endian,
        });
        Ok(USER_DEFINED)
    }

    /// Looks up a codepage by index. The user-defined index resolves only
    /// after a name has been registered.
    pub fn get(&self, index: usize) -> Option<&Codepage> {
        if index == USER_DEFINED {
            self.user_defined.as_ref()
        } else {
            KNOWN.get(index)
        }
    }

    pub fn user_defined(&self) -> Option<&Codepage> {
        self.user_defined.as_ref()
    }
}

/// Compares a raw code unit against the line feed (0x0A) zero-padded to
/// `width` bytes in the given byte order.
pub fn is_line_feed(unit: &[u8], width: usize, endian: Endian) -> bool {
    if unit.len() != width {
        return false;
    }
    match (width, endian) {
        (1, _) => unit[0] == b'\n',
        (2, Endian::Little) => LittleEndian::read_u16(unit) == 0x0A,
        (2, Endian::Big) => BigEndian::read_u16(unit) == 0x0A,
        (4, Endian::Little) => LittleEndian::read_u32(unit) == 0x0A,
        (4, Endian::Big) => BigEndian::read_u32(unit) == 0x0A,
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/codepage_tests.rs"]
mod tests;
