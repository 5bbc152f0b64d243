//! Typewriter cadence newtype with a smart constructor.

use super::error::CadenceError;
use std::fmt;
use std::num::NonZeroU64;
use std::time::Duration;

/// Delay between two revealed characters, in milliseconds.
///
/// Always strictly positive: a zero cadence cannot be represented, so the
/// engine can never enter a zero-delay tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cadence(NonZeroU64);

impl Cadence {
    /// Default cadence: 50 ms per character.
    pub const DEFAULT_MILLIS: u64 = 50;

    /// Smart constructor: rejects zero.
    pub fn from_millis(millis: u64) -> Result<Self, CadenceError> {
        NonZeroU64::new(millis).map(Self).ok_or(CadenceError::Zero)
    }

    /// Smart constructor for signed input (config files, CLI): rejects zero
    /// and negative values.
    pub fn from_signed_millis(millis: i64) -> Result<Self, CadenceError> {
        match u64::try_from(millis) {
            Ok(value) => Self::from_millis(value),
            Err(_) => Err(CadenceError::Negative(millis)),
        }
    }

    /// Cadence in milliseconds.
    pub fn as_millis(self) -> u64 {
        self.0.get()
    }

    /// Cadence as a timer delay.
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0.get())
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self(NonZeroU64::MIN.saturating_add(Self::DEFAULT_MILLIS - 1))
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fifty_millis() {
        assert_eq!(Cadence::default().as_millis(), 50);
        assert_eq!(Cadence::default().as_duration(), Duration::from_millis(50));
    }

    #[test]
    fn zero_is_rejected() {
        assert_eq!(Cadence::from_millis(0), Err(CadenceError::Zero));
        assert_eq!(Cadence::from_signed_millis(0), Err(CadenceError::Zero));
    }

    #[test]
    fn negative_is_rejected() {
        assert_eq!(
            Cadence::from_signed_millis(-20),
            Err(CadenceError::Negative(-20))
        );
    }

    #[test]
    fn positive_is_accepted() {
        let cadence = Cadence::from_signed_millis(75).unwrap();
        assert_eq!(cadence.as_millis(), 75);
        assert_eq!(cadence.to_string(), "75ms");
    }
}
