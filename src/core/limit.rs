//! Validated concurrency ceiling.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use super::LimiterError;

/// Maximum number of tasks a limiter runs at once.
///
/// Always an integer greater than zero and never changed once a limiter
/// holds it. Build one with `TryFrom` from any integer type or from `f64`:
///
/// ```
/// use prometheus_limiter::core::Limit;
///
/// assert_eq!(Limit::try_from(4).unwrap().get(), 4);
/// assert!(Limit::try_from(0).is_err());
/// assert!(Limit::try_from(-1_i64).is_err());
/// assert!(Limit::try_from(1.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "usize")]
pub struct Limit(NonZeroUsize);

impl Limit {
    /// Wrap an already non-zero value.
    pub const fn new(value: NonZeroUsize) -> Self {
        Self(value)
    }

    /// One slot per logical CPU on this host.
    pub fn available_parallelism() -> Self {
        Self(NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN))
    }

    /// The ceiling as a plain integer.
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NonZeroUsize> for Limit {
    fn from(value: NonZeroUsize) -> Self {
        Self(value)
    }
}

impl From<Limit> for usize {
    fn from(limit: Limit) -> Self {
        limit.get()
    }
}

fn invalid(value: impl fmt::Display) -> LimiterError {
    LimiterError::InvalidArgument(format!(
        "expected `max_running` to be an integer greater than 0, got {value}"
    ))
}

macro_rules! limit_from_integer {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for Limit {
                type Error = LimiterError;

                fn try_from(value: $ty) -> Result<Self, Self::Error> {
                    usize::try_from(value)
                        .ok()
                        .and_then(NonZeroUsize::new)
                        .map(Self)
                        .ok_or_else(|| invalid(value))
                }
            }
        )*
    };
}

limit_from_integer!(i32, i64, u32, u64, usize);

impl TryFrom<f64> for Limit {
    type Error = LimiterError;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > usize::MAX as f64 {
            return Err(invalid(value));
        }
        NonZeroUsize::new(value as usize).map(Self).ok_or_else(|| invalid(value))
    }
}
