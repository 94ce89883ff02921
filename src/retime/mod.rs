//! This module contains the retiming engine: the per-line rewrite of time
//! stamps and serial numbers, and the [`retime`] function that drives a
//! whole stream through detection, decoding, rewriting and encoding.
//!
//! Two kinds of time stamp lines are recognized:
//!
//! ```text
//! SRT: 00:02:17,440 --> 00:02:20,375
//! ASS: Dialogue: Marked=0,0:02:42.42,0:02:44.15,Wolf main,autre,0000,0000,0000,,Toujours rien.
//! ```
//!
//! Everything that is not a rewritten time stamp or serial number is copied
//! to the output byte for byte. A line that looks like one of the above but
//! is malformed is copied from the point where it stopped making sense.

pub mod chop;

use std::io::{BufRead, Write};
use tracing::{debug, trace};

use self::chop::{ChopFilter, ChopRange, Format};
use crate::codec::CodecBridge;
use crate::codepage::{CodepageTable, Endian, UTF_8};
use crate::decode::{bom, read::LineReader, read::MAX_LINE};
use crate::encode::LineWriter;
use crate::error::Result;
use crate::timestamp::{self, Timestamp};
use crate::transform::Transform;

pub(crate) const DIALOGUE: &[u8] = b"Dialogue:";

/// A line made of a decimal number alone, up to a control character,
/// whitespace or the end of the line.
pub(crate) fn is_number(text: &[u8]) -> bool {
    let digits = text.iter().take_while(|b| b.is_ascii_digit()).count();
    digits > 0 && text.get(digits).map_or(true, |&b| b <= 0x20)
}

fn leading_space(text: &[u8]) -> usize {
    text.iter().take_while(|&&b| b > 0 && b <= 0x20).count()
}

/// Everything the caller configures for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RetimeOptions {
    pub transform: Transform,
    /// First number to renumber SRT serial numbers from. `None` leaves them.
    pub renumber: Option<u32>,
    pub chop: ChopRange,
    /// Codepage assumed when the input carries no BOM.
    pub source: Option<usize>,
    /// Codepage of the output.
    pub output: usize,
}

impl Default for RetimeOptions {
    fn default() -> Self {
        RetimeOptions {
            transform: Transform::default(),
            renumber: None,
            chop: ChopRange::default(),
            source: None,
            output: UTF_8,
        }
    }
}

impl RetimeOptions {
    pub fn new() -> Self {
        RetimeOptions::default()
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_renumber(mut self, start: u32) -> Self {
        self.renumber = Some(start);
        self
    }

    pub fn with_chop(mut self, chop: ChopRange) -> Self {
        self.chop = chop;
        self
    }

    pub fn with_source(mut self, codepage: usize) -> Self {
        self.source = Some(codepage);
        self
    }

    pub fn with_output(mut self, codepage: usize) -> Self {
        self.output = codepage;
        self
    }

    /// True when running with these options can change anything.
    pub fn has_work(&self) -> bool {
        self.transform.is_enabled() || self.renumber.is_some() || self.chop.is_active()
    }
}

/// What happened to one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetimeReport {
    /// Name of the codepage the input was read in, if one was known.
    pub source: Option<String>,
    pub format: Format,
    /// Transcoding was requested but could not be set up; the output holds
    /// the raw input bytes.
    pub degraded: bool,
    pub lines_read: usize,
    pub lines_written: usize,
    pub lines_chopped: usize,
    pub timestamps_rewritten: usize,
}

type Rule = fn(&mut Retimer, &[u8], &mut Vec<u8>) -> Option<usize>;

/// Tried in order on the text after the leading whitespace; the first rule
/// returning the number of bytes it consumed wins.
const RULES: [Rule; 3] = [
    Retimer::rewrite_dialogue,
    Retimer::rewrite_cue,
    Retimer::renumber_serial,
];

/// Rewrites the lines of one stream.
///
/// # Example
///
/// ```
/// use subsync::retime::{Retimer, RetimeOptions};
/// use subsync::transform::Transform;
///
/// let options = RetimeOptions::new().with_transform(Transform::new().with_offset(1000));
/// let mut retimer = Retimer::new(&options);
///
/// let mut out = Vec::new();
/// retimer.rewrite_line(b"00:02:17,440 --> 00:02:20,375\r\n", &mut out);
/// assert_eq!(out, b"00:02:18,440 --> 00:02:21,375\r\n");
/// ```
#[derive(Debug, Clone)]
pub struct Retimer {
    transform: Transform,
    serial: Option<u64>,
    chop: ChopFilter,
    rewritten: usize,
}

impl Retimer {
    pub fn new(options: &RetimeOptions) -> Self {
        Retimer {
            transform: options.transform,
            serial: options.renumber.filter(|&start| start > 0).map(u64::from),
            chop: ChopFilter::new(options.chop),
            rewritten: 0,
        }
    }

    pub fn format(&self) -> Format {
        self.chop.format()
    }

    /// Number of time stamps rewritten so far.
    pub fn timestamps_rewritten(&self) -> usize {
        self.rewritten
    }

    /// Rewrites one line into `out`.
    ///
    /// Returns false, leaving `out` alone, if the line falls in the chop
    /// range and has to be dropped.
    pub fn rewrite_line(&mut self, line: &[u8], out: &mut Vec<u8>) -> bool {
        if self.chop.should_drop(line) {
            return false;
        }

        let lead = leading_space(line);
        out.extend_from_slice(&line[..lead]);
        let text = &line[lead..];

        let consumed = RULES
            .iter()
            .find_map(|rule| rule(self, text, out))
            .unwrap_or(0);
        out.extend_from_slice(&text[consumed..]);
        true
    }

    fn emit(&mut self, ts: Timestamp, out: &mut Vec<u8>) {
        let moved = Timestamp::new(self.transform.apply(ts.millis), ts.style);
        out.extend_from_slice(moved.to_string().as_bytes());
        self.rewritten += 1;
    }

    /// Rewrites a time stamp at the start of `text`, keeping any whitespace
    /// in front of it. Returns the bytes consumed, or `None` with nothing
    /// written if there is no time stamp.
    fn rewrite_timestamp(&mut self, text: &[u8], out: &mut Vec<u8>) -> Option<usize> {
        let lead = text
            .iter()
            .take_while(|&&b| matches!(b, b' ' | b'\t'))
            .count();
        let (ts, len) = timestamp::parse(&text[lead..])?;
        out.extend_from_slice(&text[..lead]);
        self.emit(ts, out);
        Some(lead + len)
    }

    /// `Dialogue:` lines carry the start and end time stamps in their
    /// second and third comma separated fields.
    fn rewrite_dialogue(&mut self, text: &[u8], out: &mut Vec<u8>) -> Option<usize> {
        if !text.starts_with(DIALOGUE) {
            return None;
        }

        let mut pos = 0;
        for _ in 0..2 {
            let Some(comma) = text[pos..].iter().position(|&b| b == b',') else {
                return Some(pos);
            };
            out.extend_from_slice(&text[pos..=pos + comma]);
            pos += comma + 1;

            match self.rewrite_timestamp(&text[pos..], out) {
                Some(len) => pos += len,
                None => return Some(pos),
            }
        }
        Some(pos)
    }

    /// SRT cue timing lines start with a time stamp; the second one follows
    /// after the arrow, at the next digit.
    fn rewrite_cue(&mut self, text: &[u8], out: &mut Vec<u8>) -> Option<usize> {
        let (first, len) = timestamp::parse(text)?;
        self.emit(first, out);
        let mut pos = len;

        let Some(gap) = text[pos..].iter().position(|b| b.is_ascii_digit()) else {
            return Some(pos);
        };
        out.extend_from_slice(&text[pos..pos + gap]);
        pos += gap;

        if let Some((second, len)) = timestamp::parse(&text[pos..]) {
            self.emit(second, out);
            pos += len;
        }
        Some(pos)
    }

    fn renumber_serial(&mut self, text: &[u8], out: &mut Vec<u8>) -> Option<usize> {
        let serial = self.serial.as_mut()?;
        if !is_number(text) {
            return None;
        }
        out.extend_from_slice(serial.to_string().as_bytes());
        *serial = serial.saturating_add(1);
        Some(text.iter().take_while(|b| b.is_ascii_digit()).count())
    }
}

/// Retimes one subtitle stream from `reader` into `writer`.
///
/// The input is checked for a BOM first; without one `options.source` is
/// assumed, and without that the bytes are passed through as they are.
/// Lines are then decoded, rewritten and encoded into `options.output` one
/// at a time. The writer is flushed at the end.
///
/// # Arguments
///
/// * `reader` - A buffered reader for the input subtitles
/// * `writer` - A writer for the output subtitles
/// * `options` - The transform, renumbering, chop range and codepages
/// * `codepages` - The codepage table, holding any user-defined codepage
///   referred to by `options`
///
/// # Returns
///
/// A [`RetimeReport`] for the stream. A transcoding that could not be set
/// up is not an error; it shows up as `degraded` in the report.
///
/// # Example
///
/// ```
/// use subsync::codepage::CodepageTable;
/// use subsync::retime::{retime, RetimeOptions};
/// use subsync::transform::Transform;
///
/// let input = "\u{FEFF}1\r\n00:02:17,440 --> 00:02:20,375\r\nHello\r\n";
/// let options = RetimeOptions::new().with_transform(Transform::new().with_offset(-2000));
///
/// let mut output = Vec::new();
/// let report = retime(input.as_bytes(), &mut output, &options, &CodepageTable::new()).unwrap();
///
/// assert_eq!(output, b"1\r\n00:02:15,440 --> 00:02:18,375\r\nHello\r\n");
/// assert_eq!(report.source.as_deref(), Some("UTF-8"));
/// assert_eq!(report.timestamps_rewritten, 2);
/// ```
///
/// # Errors
///
/// I/O errors from either stream are propagated.
pub fn retime<R: BufRead, W: Write>(
    mut reader: R,
    writer: W,
    options: &RetimeOptions,
    codepages: &CodepageTable,
) -> Result<RetimeReport> {
    let detection = bom::detect(&mut reader)?;
    if let Some(index) = detection.codepage {
        debug!("detected {} byte order mark", crate::codepage::KNOWN[index].name);
    }

    let source = detection.codepage.or(options.source);
    let source_codepage = source.and_then(|index| codepages.get(index));
    let (width, endian) = source_codepage.map_or((1, Endian::Little), |cp| (cp.width, cp.endian));

    let bridge = CodecBridge::open(codepages, source, options.output);
    let degraded = bridge.degraded;

    let mut lines = LineReader::new(reader, detection.overflow, bridge.decoder, width, endian);
    let mut output = LineWriter::new(writer, bridge.encoder, bridge.bom)?;
    let mut retimer = Retimer::new(options);

    let mut buffer = Vec::with_capacity(MAX_LINE);
    let mut chopped = 0;
    while let Some(line) = lines.next() {
        let line = line?;
        buffer.clear();
        if retimer.rewrite_line(&line, &mut buffer) {
            output.write_line(&buffer)?;
        } else {
            trace!("chopped line {}", lines.line_count());
            chopped += 1;
        }
    }

    let report = RetimeReport {
        source: source_codepage.map(|cp| cp.name.to_string()),
        format: retimer.format(),
        degraded,
        lines_read: lines.line_count(),
        lines_written: output.line_count(),
        lines_chopped: chopped,
        timestamps_rewritten: retimer.timestamps_rewritten(),
    };
    output.finish()?;

    debug!(
        "{} lines read, {} written, {} chopped, {} time stamps rewritten",
        report.lines_read, report.lines_written, report.lines_chopped, report.timestamps_rewritten
    );
    Ok(report)
}

#[cfg(test)]
#[path = "tests/retime_tests.rs"]
mod tests;
