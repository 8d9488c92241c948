use std::{
    fmt::Display,
    num::{NonZeroU8, TryFromIntError},
    time::Duration,
};

use serde::Deserialize;

/// Whole seconds, 1 to 255. Zero is rejected as it would expire every
/// network operation immediately.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Clone, Copy)]
#[serde(transparent)]
pub struct Seconds(NonZeroU8);
impl Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}

const DEFAULT_SECONDS: NonZeroU8 = match NonZeroU8::new(30) {
    Some(secs) => secs,
    None => panic!("default timeout must be non-zero"),
};

impl Default for Seconds {
    fn default() -> Self {
        Self(DEFAULT_SECONDS)
    }
}

impl TryFrom<u8> for Seconds {
    type Error = TryFromIntError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        NonZeroU8::try_from(value).map(Self)
    }
}

impl From<Seconds> for u64 {
    fn from(value: Seconds) -> Self {
        value.0.get() as u64
    }
}

impl From<Seconds> for Duration {
    fn from(value: Seconds) -> Self {
        Duration::from_secs(value.into())
    }
}
