//! Chopping whole subtitles out of a stream by their position.
//!
//! Subtitles are counted from 1 as their start markers go by: a bare serial
//! number line in SRT, a `Dialogue:` line in SSA/ASS. Which of the two
//! applies is inferred from the first recognizable line and then kept for
//! the rest of the stream.
use std::str::FromStr;

use tracing::debug;

use super::{is_number, DIALOGUE};
use crate::error::Error;
use crate::timestamp;

/// The subtitle format of a stream as far as it is known yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Unknown,
    Srt,
    Ass,
}

/// 1-based inclusive range of subtitles to remove. An unset bound does not
/// limit that side; if both are unset nothing is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChopRange {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl ChopRange {
    /// Bounds of zero or less are unset.
    pub fn new(start: i64, end: i64) -> Self {
        let bound = |n: i64| u32::try_from(n).ok().filter(|&n| n > 0);
        ChopRange {
            start: bound(start),
            end: bound(end),
        }
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Whether the subtitle at `index` falls in the range. Index 0, the
    /// lines before the first subtitle, never does.
    pub fn contains(&self, index: u32) -> bool {
        index > 0
            && self.is_active()
            && self.start.map_or(true, |start| index >= start)
            && self.end.map_or(true, |end| index <= end)
    }
}

impl FromStr for ChopRange {
    type Err = Error;

    /// Parses `N:M`, spaces allowed around either number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidChop(s.to_owned());
        let (start, end) = s.split_once(':').ok_or_else(invalid)?;
        let start = start.trim().parse::<i64>().map_err(|_| invalid())?;
        let end = end.trim().parse::<i64>().map_err(|_| invalid())?;
        Ok(ChopRange::new(start, end))
    }
}

/// Tracks the format and the subtitle counter of one stream and decides
/// which lines to drop.
#[derive(Debug, Clone, Default)]
pub struct ChopFilter {
    range: ChopRange,
    format: Format,
    index: u32,
}

impl ChopFilter {
    pub fn new(range: ChopRange) -> Self {
        ChopFilter {
            range,
            ..ChopFilter::default()
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Number of subtitles seen so far.
    pub fn index(&self) -> u32 {
        self.index
    }

    fn classify(&mut self, format: Format) {
        debug!("subtitle format is {format:?}");
        self.format = format;
    }

    /// Feeds one decoded line through the filter and returns true if it
    /// belongs to a subtitle in the chop range.
    ///
    /// * SRT: every line belongs to the subtitle of the last serial number.
    /// * SSA/ASS: only `Dialogue:` lines are subtitles; headers, styles and
    ///   comments are always kept.
    /// * Unknown: a serial number or a time stamp line means SRT and starts
    ///   a subtitle. `[Script Info]` or `[Events]` means SSA/ASS. A
    ///   `Dialogue:` line means SSA/ASS and starts a subtitle. Anything else
    ///   is kept and leaves the format open.
    pub fn should_drop(&mut self, line: &[u8]) -> bool {
        match self.format {
            Format::Srt => {
                if is_number(line) {
                    self.index += 1;
                }
            }
            Format::Ass => {
                if !line.starts_with(DIALOGUE) {
                    return false;
                }
                self.index += 1;
            }
            Format::Unknown => {
                if is_number(line) || timestamp::parse(line).is_some() {
                    self.classify(Format::Srt);
                    self.index += 1;
                } else if line.starts_with(b"[Events]") || line.starts_with(b"[Script Info]") {
                    self.classify(Format::Ass);
                    return false;
                } else if line.starts_with(DIALOGUE) {
                    self.classify(Format::Ass);
                    self.index += 1;
                } else {
                    return false;
                }
            }
        }
        self.range.contains(self.index)
    }
}

#[cfg(test)]
#[path = "tests/chop_tests.rs"]
mod tests;
