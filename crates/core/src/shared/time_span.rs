use serde::{Deserialize, Serialize};

/// Minimum span duration in seconds. Engine output with `start == end`
/// is widened to this so downstream duration arithmetic stays well-defined.
pub const MIN_SPAN_DURATION: f64 = 0.01;

/// A half-open interval of time in seconds, `end > start`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Overlapping portion of two spans, or `None` when they don't touch.
    pub fn intersection(&self, other: &TimeSpan) -> Option<TimeSpan> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end > start {
            Some(TimeSpan { start, end })
        } else {
            None
        }
    }

    /// Shift both endpoints by `offset` seconds.
    pub fn shifted(&self, offset: f64) -> TimeSpan {
        TimeSpan {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Widen a degenerate span to `MIN_SPAN_DURATION`, keeping `start`.
    pub fn widened_to_min(&self) -> TimeSpan {
        if self.duration() < MIN_SPAN_DURATION {
            TimeSpan {
                start: self.start,
                end: self.start + MIN_SPAN_DURATION,
            }
        } else {
            *self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duration_and_midpoint() {
        let span = TimeSpan::new(1.0, 3.0);
        assert_relative_eq!(span.duration(), 2.0);
        assert_relative_eq!(span.midpoint(), 2.0);
    }

    #[test]
    fn test_contains_endpoints() {
        let span = TimeSpan::new(1.0, 3.0);
        assert!(span.contains(1.0));
        assert!(span.contains(3.0));
        assert!(!span.contains(3.01));
    }

    #[test]
    fn test_intersection_overlapping() {
        let a = TimeSpan::new(0.0, 32.0);
        let b = TimeSpan::new(30.0, 62.0);
        let overlap = a.intersection(&b).unwrap();
        assert_relative_eq!(overlap.start, 30.0);
        assert_relative_eq!(overlap.end, 32.0);
    }

    #[test]
    fn test_intersection_disjoint_is_none() {
        let a = TimeSpan::new(0.0, 10.0);
        let b = TimeSpan::new(10.0, 20.0);
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_shifted() {
        let span = TimeSpan::new(1.0, 2.0).shifted(30.0);
        assert_relative_eq!(span.start, 31.0);
        assert_relative_eq!(span.end, 32.0);
    }

    #[test]
    fn test_widened_to_min_expands_zero_length() {
        let span = TimeSpan::new(5.0, 5.0).widened_to_min();
        assert_relative_eq!(span.start, 5.0);
        assert_relative_eq!(span.duration(), MIN_SPAN_DURATION);
    }

    #[test]
    fn test_widened_to_min_keeps_normal_span() {
        let span = TimeSpan::new(5.0, 6.0);
        assert_eq!(span.widened_to_min(), span);
    }
}
