//! This module reads and writes the textual time stamps found in subtitle
//! files, and the offset and scale expressions used to configure a
//! [`Transform`](crate::transform::Transform).
//!
//! Five time stamp layouts are recognized, always with four numeric fields:
//!
//! | Style   | Layout        | Example        |
//! |---------|---------------|----------------|
//! | `Srt`   | `H:M:S,mmm`   | `00:02:17,440` |
//! | `Ass`   | `H:M:S.cc`    | `0:02:42.42`   |
//! | `Colon` | `H:M:S:mmm`   | `00:02:17:440` |
//! | `Dot`   | `H.M.S.mmm`   | `00.02.17.440` |
//! | `Dash`  | `H-M-S-mmm`   | `00-02-17-440` |
//!
//! The `Ass` style counts centiseconds, which are widened to milliseconds
//! on parsing and narrowed again on formatting. Any value that is not a
//! multiple of 10 ms loses its last digit when written in that style.
use std::fmt;

/// The textual layout a time stamp was read from, so it can be written back
/// the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Srt,
    Ass,
    Colon,
    Dot,
    Dash,
}

impl Style {
    /// All styles in the order they are tried by [`parse`].
    pub const ALL: [Style; 5] = [Style::Srt, Style::Ass, Style::Colon, Style::Dot, Style::Dash];

    fn delimiters(self) -> [u8; 3] {
        match self {
            Style::Srt => *b"::,",
            Style::Ass => *b"::.",
            Style::Colon => *b":::",
            Style::Dot => *b"...",
            Style::Dash => *b"---",
        }
    }

    fn max_fraction(self) -> i64 {
        match self {
            Style::Ass => 99,
            _ => 999,
        }
    }
}

/// A signed count of milliseconds together with the style it was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub millis: i64,
    pub style: Style,
}

impl Timestamp {
    pub fn new(millis: i64, style: Style) -> Self {
        Timestamp { millis, style }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.millis < 0 { "-" } else { "" };
        let ms = self.millis.unsigned_abs();

        let hh = ms / 3_600_000;
        let mm = ms % 3_600_000 / 60_000;
        let ss = ms % 60_000 / 1000;
        let frac = ms % 1000;

        match self.style {
            Style::Srt => write!(f, "{sign}{hh:02}:{mm:02}:{ss:02},{frac:03}"),
            Style::Ass => write!(f, "{sign}{hh}:{mm:02}:{ss:02}.{:02}", frac / 10),
            Style::Colon => write!(f, "{sign}{hh:02}:{mm:02}:{ss:02}:{frac:03}"),
            Style::Dot => write!(f, "{sign}{hh:02}.{mm:02}.{ss:02}.{frac:03}"),
            Style::Dash => write!(f, "{sign}{hh:02}-{mm:02}-{ss:02}-{frac:03}"),
        }
    }
}

/// `isspace` in the C locale, which unlike `u8::is_ascii_whitespace`
/// includes the vertical tab.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

struct Scanner<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn skip_space(&mut self) {
        while self.text.get(self.pos).copied().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    fn literal(&mut self, c: u8) -> Option<()> {
        self.skip_space();
        if self.text.get(self.pos) == Some(&c) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// An unsigned decimal field. A `+` is tolerated in front of it, a `-`
    /// fails the field.
    fn field(&mut self) -> Option<i64> {
        self.skip_space();
        if self.text.get(self.pos) == Some(&b'+') {
            self.pos += 1;
        }
        let start = self.pos;
        let mut value: i64 = 0;
        while let Some(&b) = self.text.get(self.pos) {
            if !b.is_ascii_digit() {
                break;
            }
            value = value.checked_mul(10)?.checked_add((b - b'0') as i64)?;
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(value)
    }

    fn fields(&mut self, style: Style) -> Option<[i64; 4]> {
        let [d1, d2, d3] = style.delimiters();
        let hour = self.field()?;
        self.literal(d1)?;
        let min = self.field()?;
        self.literal(d2)?;
        let sec = self.field()?;
        self.literal(d3)?;
        let frac = self.field()?;
        Some([hour, min, sec, frac])
    }
}

/// Parses a time stamp at the start of `text`.
///
/// An optional leading `+` or `-` is taken first, then the five styles are
/// tried in order. The first style whose four fields and three delimiters
/// all match decides the outcome: if its minutes, seconds or sub-second
/// field is out of range the text is not a time stamp, and the remaining
/// styles are not tried.
///
/// # Returns
///
/// The time stamp and the number of bytes consumed, sign included, or
/// `None` if `text` does not start with a valid time stamp.
///
/// # Example
///
/// ```
/// use subsync::timestamp::{parse, Style};
///
/// let (ts, len) = parse(b"00:02:17,440 --> 00:02:20,375").unwrap();
/// assert_eq!(ts.millis, 137_440);
/// assert_eq!(ts.style, Style::Srt);
/// assert_eq!(len, 12);
/// ```
pub fn parse(text: &[u8]) -> Option<(Timestamp, usize)> {
    let (negative, body_start) = match text.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };

    let (style, fields, end) = Style::ALL.iter().find_map(|&style| {
        let mut scanner = Scanner {
            text,
            pos: body_start,
        };
        scanner
            .fields(style)
            .map(|fields| (style, fields, scanner.pos))
    })?;

    let [hour, min, sec, frac] = fields;
    if !(0..=59).contains(&min) || !(0..=59).contains(&sec) {
        return None;
    }
    if !(0..=style.max_fraction()).contains(&frac) {
        return None;
    }
    let frac = if style == Style::Ass { frac * 10 } else { frac };

    let millis = hour
        .checked_mul(60)?
        .checked_add(min)?
        .checked_mul(60)?
        .checked_add(sec)?
        .checked_mul(1000)?
        .checked_add(frac)?;
    let millis = if negative { -millis } else { millis };

    Some((Timestamp::new(millis, style), end))
}

/// Renders `millis` in the given style. Shorthand for formatting a
/// [`Timestamp`].
pub fn format(millis: i64, style: Style) -> String {
    Timestamp::new(millis, style).to_string()
}

/// Parses a whole string as a single time stamp, ignoring surrounding
/// whitespace.
fn parse_exact(text: &str) -> Option<Timestamp> {
    let text = text.trim_start();
    let (ts, len) = parse(text.as_bytes())?;
    text[len..].trim().is_empty().then_some(ts)
}

/// Frame rate conversion ratios that can be given by name.
pub const FRAME_RATES: [(&str, f64); 6] = [
    ("N-P", 1.1988),  // NTSC 29.97 to PAL 25
    ("P-N", 0.83417), // PAL to NTSC
    ("N-C", 1.25),    // NTSC to cinema 23.976
    ("C-N", 0.8),     // cinema to NTSC
    ("P-C", 1.04271), // PAL to cinema
    ("C-P", 0.95904), // cinema to PAL
];

/// Parses a time offset expression into milliseconds.
///
/// Accepted forms:
///
/// * a signed time stamp: `-0:0:10,199`, `+1:0:12.66`
/// * a difference of two time stamps, the expected time minus the actual
///   time: `+01:44:31,660-01:44:36,290`. The leading sign only marks the
///   argument as an offset and is ignored.
/// * a signed number of milliseconds: `+19700`, `-10000`
///
/// Expressions containing `/` are scale ratios and are rejected here.
///
/// ```
/// use subsync::timestamp::parse_offset;
///
/// assert_eq!(parse_offset("+12000"), Some(12_000));
/// assert_eq!(parse_offset("-00:00:01,500"), Some(-1_500));
/// assert_eq!(parse_offset("+00:00:52,570-0:11:00,140"), Some(52_570 - 660_140));
/// assert_eq!(parse_offset("-01:44:30,290/01:44:31,660"), None);
/// ```
pub fn parse_offset(text: &str) -> Option<i64> {
    if text.contains('/') {
        return None;
    }

    let body = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    if body.contains('-') {
        let (expected, len) = parse(body.as_bytes())?;
        let rest = body[len..].trim_start();
        if rest.is_empty() {
            // a dash style time stamp on its own
            return parse_exact(text).map(|ts| ts.millis);
        }
        let actual = parse_exact(rest.strip_prefix('-')?)?;
        return expected.millis.checked_sub(actual.millis);
    }

    if let Some(ts) = parse_exact(text) {
        return Some(ts.millis);
    }
    text.trim().parse::<i64>().ok()
}

/// Parses a time scale expression into a ratio.
///
/// Accepted forms, any leading sign being ignored:
///
/// * one of the ids in [`FRAME_RATES`], such as `N-P`
/// * a ratio of two time stamps, the expected time divided by the actual
///   time: `-01:44:30,290/01:44:31,660`
/// * a real number containing a `.`: `1.000955`
///
/// `None` stands for the zero factor, which leaves time stamps unscaled.
///
/// ```
/// use subsync::timestamp::parse_scale;
///
/// assert_eq!(parse_scale("-N-C"), Some(1.25));
/// assert_eq!(parse_scale("-1.000955"), Some(1.000955));
/// assert_eq!(parse_scale("12000"), None);
/// ```
pub fn parse_scale(text: &str) -> Option<f64> {
    let body = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);

    let ratio = if let Some(&(_, factor)) = FRAME_RATES.iter().find(|(id, _)| *id == body) {
        factor
    } else if let Some((expected, actual)) = body.split_once('/') {
        let expected = parse_exact(expected)?;
        let actual = parse_exact(actual)?;
        if actual.millis == 0 {
            return None;
        }
        expected.millis as f64 / actual.millis as f64
    } else if body.contains('.') {
        body.parse::<f64>().ok()?
    } else {
        return None;
    };

    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}

#[cfg(test)]
#[path = "tests/timestamp_tests.rs"]
mod tests;
