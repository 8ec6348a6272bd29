//! Server time representation.
//!
//! The media server counts time in 100-nanosecond ticks. Everything inside
//! the player works in milliseconds and converts at the reporting boundary.

pub const TICKS_PER_MILLISECOND: u64 = 10_000;

/// A position or duration in server ticks (1 tick = 100 ns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Ticks(u64);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    pub fn new(ticks: u64) -> Self {
        Ticks(ticks)
    }

    pub fn from_millis(ms: u64) -> Self {
        Ticks(ms.saturating_mul(TICKS_PER_MILLISECOND))
    }

    /// Truncates sub-millisecond remainders.
    pub fn as_millis(&self) -> u64 {
        self.0 / TICKS_PER_MILLISECOND
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Ticks {
    fn from(ticks: u64) -> Self {
        Ticks(ticks)
    }
}

impl std::fmt::Display for Ticks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_millisecond_is_ten_thousand_ticks() {
        assert_eq!(Ticks::from_millis(1).value(), 10_000);
        assert_eq!(Ticks::from_millis(5_700_000).value(), 57_000_000_000);
    }

    #[test]
    fn converting_back_truncates() {
        assert_eq!(Ticks::new(19_999).as_millis(), 1);
        assert_eq!(Ticks::new(9_999).as_millis(), 0);
    }

    #[test]
    fn huge_millis_saturate_instead_of_wrapping() {
        assert_eq!(Ticks::from_millis(u64::MAX).value(), u64::MAX);
    }
}
