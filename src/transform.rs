//! The linear time transform applied to every rewritten time stamp.

/// Inclusive range of time stamps, in milliseconds, that the transform is
/// applied to. An unset bound does not limit that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        TimeRange { start, end }
    }

    pub fn contains(&self, ms: i64) -> bool {
        self.start.map_or(true, |start| ms >= start) && self.end.map_or(true, |end| ms <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Offset and scale applied to a time stamp, in that order.
///
/// A zero offset and a zero scale are both "disabled", so the default
/// transform is the identity.
///
/// # Example
///
/// ```
/// use subsync::transform::{TimeRange, Transform};
///
/// let transform = Transform::new()
///     .with_offset(1000)
///     .with_range(TimeRange::new(Some(1000), Some(5000)));
///
/// assert_eq!(transform.apply(500), 500);
/// assert_eq!(transform.apply(1000), 2000);
/// assert_eq!(transform.apply(5001), 5001);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub offset: i64,
    pub scale: f64,
    pub range: TimeRange,
}

impl Transform {
    pub fn new() -> Self {
        Transform::default()
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    /// True when applying the transform can change a time stamp.
    pub fn is_enabled(&self) -> bool {
        self.offset != 0 || self.scale != 0.0
    }

    /// Maps a time stamp in milliseconds to its new value.
    ///
    /// Values outside the range are returned untouched. Otherwise the offset
    /// is added first and the sum is multiplied by the scale, truncating
    /// toward zero.
    pub fn apply(&self, ms: i64) -> i64 {
        if !self.range.contains(ms) {
            return ms;
        }

        let mut ms = ms;
        if self.offset != 0 {
            ms = ms.saturating_add(self.offset);
        }
        if self.scale != 0.0 {
            ms = (ms as f64 * self.scale) as i64;
        }
        ms
    }
}

#[cfg(test)]
#[path = "tests/transform_tests.rs"]
mod tests;
