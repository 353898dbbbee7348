use std::time::Duration;

const NSEC_PER_SEC: i64 = 1_000_000_000;

/// Device clock timestamp
///
/// Stored as whole seconds plus a nanosecond remainder. Every constructor
/// normalizes so that `0 <= nsec < 1_000_000_000`; negative instants carry
/// the sign in `sec` alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub sec: i64,
    pub nsec: i32,
}

impl Timestamp {
    /// Build a timestamp, carrying any out of range nanoseconds into `sec`
    pub fn new(sec: i64, nsec: i64) -> Self {
        let sec = sec.saturating_add(nsec.div_euclid(NSEC_PER_SEC));
        let nsec = nsec.rem_euclid(NSEC_PER_SEC) as i32;
        Self { sec, nsec }
    }

    /// Build a timestamp from floating point seconds.
    ///
    /// The fractional part is re-derived from the truncated seconds rather
    /// than from the input, then rounded to the nearest nanosecond. Non-finite
    /// input maps to zero.
    pub fn from_secs_f64(ts: f64) -> Self {
        if !ts.is_finite() {
            return Self::default();
        }
        let sec = ts.floor() as i64;
        let nsec = ((ts - sec as f64) * 1e9).round() as i64;
        Self::new(sec, nsec)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + f64::from(self.nsec) / 1e9
    }

    /// `None` for instants before the device epoch
    pub fn as_duration(&self) -> Option<Duration> {
        let sec = u64::try_from(self.sec).ok()?;
        Some(Duration::new(sec, self.nsec as u32))
    }

    pub fn is_normalized(&self) -> bool {
        (0..NSEC_PER_SEC as i32).contains(&self.nsec)
    }
}

impl From<Duration> for Timestamp {
    fn from(value: Duration) -> Self {
        let sec = i64::try_from(value.as_secs()).unwrap_or(i64::MAX);
        Self::new(sec, i64::from(value.subsec_nanos()))
    }
}

/// Untyped wire message: owned payload plus routing metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBuffer {
    pub data: Vec<u8>,
    pub sequence_num: u64,
    pub ts: Timestamp,
}

impl RawBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_carries_nanoseconds() {
        let ts = Timestamp::new(1, 2_500_000_000);
        assert_eq!(ts, Timestamp { sec: 3, nsec: 500_000_000 });

        let ts = Timestamp::new(1, -1);
        assert_eq!(ts, Timestamp { sec: 0, nsec: 999_999_999 });
    }

    #[test]
    fn test_from_secs_f64() {
        let ts = Timestamp::from_secs_f64(12.25);
        assert_eq!(ts, Timestamp { sec: 12, nsec: 250_000_000 });
        assert!((ts.as_secs_f64() - 12.25).abs() < 1e-9);
    }

    #[test]
    fn test_negative_seconds_normalize() {
        let ts = Timestamp::from_secs_f64(-1.5);
        assert_eq!(ts, Timestamp { sec: -2, nsec: 500_000_000 });
        assert!(ts.is_normalized());
        assert_eq!(ts.as_duration(), None);
    }

    #[test]
    fn test_rounding_carries_into_seconds() {
        // 0.9999999999 rounds up to a full second
        let ts = Timestamp::from_secs_f64(4.999_999_999_9);
        assert_eq!(ts, Timestamp { sec: 5, nsec: 0 });
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(Timestamp::from_secs_f64(f64::NAN), Timestamp::default());
        assert_eq!(Timestamp::from_secs_f64(f64::INFINITY), Timestamp::default());
    }

    #[test]
    fn test_duration_round_trip() {
        let d = Duration::new(1_700_000_000, 123_456_789);
        let ts = Timestamp::from(d);
        assert_eq!(ts.as_duration(), Some(d));
    }
}
