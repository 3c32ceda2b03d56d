// This file is part of Warden.
//
// Warden is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Warden is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Warden.
// If not, see https://www.gnu.org/licenses/.

use std::{
    fmt::{Display, Formatter},
    ops::{Add, Sub},
    time::{SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point in time measured in whole seconds since the Unix epoch.
///
/// Time-validity checks run on integer seconds everywhere; no fractional
/// clock reads.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Largest value representable in the 48-bit on-chain encoding.
    pub const MAX_U48: Timestamp = Timestamp((1 << 48) - 1);

    /// Creates a timestamp from seconds since epoch.
    pub const fn new(seconds_since_epoch: u64) -> Self {
        Self(seconds_since_epoch)
    }

    /// The current wall-clock time, floored to whole seconds.
    pub fn now() -> Self {
        Self(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        )
    }

    /// Seconds since the Unix epoch.
    pub const fn seconds_since_epoch(self) -> u64 {
        self.0
    }

    /// Subtracts whole seconds, stopping at the epoch.
    pub const fn saturating_sub(self, seconds: u64) -> Self {
        Self(self.0.saturating_sub(seconds))
    }

    /// True if the encoded value fits in 48 bits.
    pub const fn fits_u48(self) -> bool {
        self.0 <= Self::MAX_U48.0
    }
}

impl From<u64> for Timestamp {
    fn from(seconds: u64) -> Self {
        Self(seconds)
    }
}

impl Add<u64> for Timestamp {
    type Output = Timestamp;

    fn add(self, seconds: u64) -> Self::Output {
        Timestamp(self.0 + seconds)
    }
}

impl Sub<u64> for Timestamp {
    type Output = Timestamp;

    fn sub(self, seconds: u64) -> Self::Output {
        Timestamp(self.0 - seconds)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match DateTime::<Utc>::from_timestamp(self.0 as i64, 0) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}s", self.0),
        }
    }
}

/// The window of time during which a user operation's validation holds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidTimeRange {
    /// Earliest time at which the operation is valid
    pub valid_after: Timestamp,
    /// Latest time at which the operation is valid
    pub valid_until: Timestamp,
}

impl ValidTimeRange {
    /// Creates a new time range.
    pub const fn new(valid_after: Timestamp, valid_until: Timestamp) -> Self {
        Self {
            valid_after,
            valid_until,
        }
    }

    /// The range spanning all representable time.
    pub const fn all_time() -> Self {
        Self {
            valid_after: Timestamp::new(0),
            valid_until: Timestamp::MAX_U48,
        }
    }

    /// True if the range contains `time` with `buffer` seconds of slack
    /// remaining before expiry.
    pub fn contains(self, time: Timestamp, buffer: u64) -> bool {
        self.valid_after <= time && time + buffer <= self.valid_until
    }
}

impl Default for ValidTimeRange {
    fn default() -> Self {
        Self::all_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rfc3339() {
        let t = Timestamp::new(0);
        assert_eq!(t.to_string(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_saturating_sub() {
        assert_eq!(Timestamp::new(3).saturating_sub(10), Timestamp::new(0));
        assert_eq!(Timestamp::new(10).saturating_sub(3), Timestamp::new(7));
    }

    #[test]
    fn test_contains_with_buffer() {
        let range = ValidTimeRange::new(Timestamp::new(100), Timestamp::new(200));
        assert!(range.contains(Timestamp::new(150), 30));
        assert!(range.contains(Timestamp::new(170), 30));
        assert!(!range.contains(Timestamp::new(171), 30));
        assert!(!range.contains(Timestamp::new(99), 0));
    }

    #[test]
    fn test_all_time() {
        let range = ValidTimeRange::all_time();
        assert!(range.contains(Timestamp::now(), 30));
        assert_eq!(range.valid_until, Timestamp::MAX_U48);
    }
}
