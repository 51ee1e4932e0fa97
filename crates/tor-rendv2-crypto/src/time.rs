//! Manipulate time periods (as used in the v2 onion service system)

use std::time::{Duration, SystemTime};

use crate::PermanentId;

/// The length of a v2 time period, in seconds.
pub const PERIOD_LENGTH_SEC: u32 = 24 * 60 * 60;

/// A period of time, as used to rotate v2 descriptor identifiers.
///
/// Every v2 time period is one day long, but different services start their
/// days at different times so that they don't all rotate at once.  The
/// offset is derived from the first byte of the service's [`PermanentId`]:
/// a service whose id begins with `b0` adds `b0 * 86400 / 256` seconds to
/// the time before dividing by the period length.  (rend-spec-v2 section
/// 1.3.)
///
/// So the period numbered `n` covers
/// `n * 86400 - offset` up to but not including `(n + 1) * 86400 - offset`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TimePeriodV2 {
    /// Index of the time periods that have passed since the unix epoch,
    /// once the offset is applied.
    interval_num: u32,
    /// How far ahead of the epoch this service's periods are, in seconds.
    offset_in_sec: u32,
}

/// Two [`TimePeriodV2`]s are ordered with respect to one another if they
/// have the same offset, which is to say if they belong to services whose
/// permanent ids share a first byte.
impl PartialOrd for TimePeriodV2 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.offset_in_sec == other.offset_in_sec {
            Some(self.interval_num.cmp(&other.interval_num))
        } else {
            None
        }
    }
}

impl TimePeriodV2 {
    /// Construct the time period that contains `when` for the service with
    /// the permanent id `id`.
    ///
    /// Return None if `when` is before the epoch, or if its period number
    /// does not fit in 32 bits.
    pub fn new(id: &PermanentId, when: SystemTime) -> Option<Self> {
        let offset_in_sec = Self::offset_for(id);
        let unix = when.duration_since(SystemTime::UNIX_EPOCH).ok()?.as_secs();
        let interval_num =
            unix.checked_add(offset_in_sec.into())? / u64::from(PERIOD_LENGTH_SEC);
        Some(TimePeriodV2 {
            interval_num: u32::try_from(interval_num).ok()?,
            offset_in_sec,
        })
    }

    /// Return the offset, in seconds, that `id` applies to the time before
    /// computing its period number.
    pub fn offset_for(id: &PermanentId) -> u32 {
        // The product is divided before it is added; the result is always
        // less than one period.
        u32::from(id.as_bytes()[0]) * PERIOD_LENGTH_SEC / 256
    }

    /// Return the time period after this one.
    ///
    /// Return None if this is the last representable time period.
    pub fn next(&self) -> Option<Self> {
        Some(TimePeriodV2 {
            interval_num: self.interval_num.checked_add(1)?,
            ..*self
        })
    }

    /// Return the time period before this one.
    ///
    /// Return None if this is the first representable time period.
    pub fn prev(&self) -> Option<Self> {
        Some(TimePeriodV2 {
            interval_num: self.interval_num.checked_sub(1)?,
            ..*self
        })
    }

    /// Return true if this time period contains `when`.
    ///
    /// # Limitations
    ///
    /// This function always returns false if the time period contains any
    /// times that cannot be represented as a `SystemTime`.
    pub fn contains(&self, when: SystemTime) -> bool {
        match self.range() {
            Some(r) => r.contains(&when),
            None => false,
        }
    }

    /// Return a range representing the [`SystemTime`] values contained
    /// within this time period.
    ///
    /// Return None if any of those times can't be represented as a
    /// `SystemTime`, or if the period begins before the epoch.
    pub fn range(&self) -> Option<std::ops::Range<SystemTime>> {
        let length = u64::from(PERIOD_LENGTH_SEC);
        let offset = u64::from(self.offset_in_sec);
        let start_sec = u64::from(self.interval_num)
            .checked_mul(length)?
            .checked_sub(offset)?;
        let end_sec = start_sec.checked_add(length)?;
        let start = SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(start_sec))?;
        let end = SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(end_sec))?;
        Some(start..end)
    }

    /// Return the numeric index of this time period.
    ///
    /// This is the value that gets hashed into a [`SecretIdPart`](crate::SecretIdPart).
    pub fn interval_num(&self) -> u32 {
        self.interval_num
    }

    /// Return the offset of this time period from the epoch, in seconds.
    pub fn offset_in_sec(&self) -> u32 {
        self.offset_in_sec
    }
}
