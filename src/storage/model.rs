//! Storage model types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::NEVER_EXPIRES_SENTINEL;

/// Relative lifetime supplied by callers, or reported as "time left" by a tier.
///
/// `Secs(0)` is rejected wherever a caller supplies a TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// Entry never expires.
    Never,
    /// Entry expires this many seconds after it is written.
    Secs(u64),
}

impl Ttl {
    /// Returns the number of seconds, or `None` for [`Ttl::Never`].
    #[inline]
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Ttl::Never => None,
            Ttl::Secs(secs) => Some(*secs),
        }
    }

    /// Converts a remaining lifetime (`None` = never) into a writable TTL.
    ///
    /// Returns `None` when nothing is left (`Some(0)`): such an entry has lapsed.
    #[inline]
    pub fn from_remaining(remaining: Option<u64>) -> Option<Ttl> {
        match remaining {
            None => Some(Ttl::Never),
            Some(0) => None,
            Some(secs) => Some(Ttl::Secs(secs)),
        }
    }
}

impl std::fmt::Display for Ttl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ttl::Never => write!(f, "never"),
            Ttl::Secs(secs) => write!(f, "{}s", secs),
        }
    }
}

/// Absolute expiry instant (epoch seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiry {
    /// Entry never expires.
    Never,
    /// Entry is live up to and including this instant.
    At(i64),
}

impl Expiry {
    /// Converts a relative TTL into an absolute expiry as of `now`.
    #[inline]
    pub fn from_ttl(ttl: Ttl, now: i64) -> Self {
        match ttl {
            Ttl::Never => Expiry::Never,
            Ttl::Secs(secs) => {
                Expiry::At(now.saturating_add(i64::try_from(secs).unwrap_or(i64::MAX)))
            }
        }
    }

    /// Decodes the on-disk integer form (`<= 0` is never).
    #[inline]
    pub fn from_epoch(value: i64) -> Self {
        if value <= NEVER_EXPIRES_SENTINEL {
            Expiry::Never
        } else {
            Expiry::At(value)
        }
    }

    /// Encodes to the on-disk integer form.
    #[inline]
    pub fn to_epoch(self) -> i64 {
        match self {
            Expiry::Never => NEVER_EXPIRES_SENTINEL,
            Expiry::At(at) => at,
        }
    }

    /// Returns `true` once `now` has moved past the expiry instant.
    #[inline]
    pub fn is_expired(&self, now: i64) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(at) => *at < now,
        }
    }

    /// Seconds left as of `now` (`None` = never, `Some(0)` = nothing left).
    #[inline]
    pub fn remaining(&self, now: i64) -> Option<u64> {
        match self {
            Expiry::Never => None,
            Expiry::At(at) => Some(u64::try_from(at.saturating_sub(now)).unwrap_or(0)),
        }
    }

    /// Remaining lifetime as a writable [`Ttl`], or `None` if it has lapsed.
    #[inline]
    pub fn remaining_ttl(&self, now: i64) -> Option<Ttl> {
        Ttl::from_remaining(self.remaining(now))
    }
}

/// On-disk representation of a cache entry: `{"data": ..., "expiry": <epoch secs>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesystemRecord {
    /// Stored payload.
    pub data: Value,
    /// Absolute expiry in epoch seconds, `0` for never.
    pub expiry: i64,
}

impl FilesystemRecord {
    /// Builds a record from a payload and an absolute expiry.
    pub fn new(data: Value, expiry: Expiry) -> Self {
        Self {
            data,
            expiry: expiry.to_epoch(),
        }
    }

    /// Returns the decoded expiry.
    #[inline]
    pub fn expiry(&self) -> Expiry {
        Expiry::from_epoch(self.expiry)
    }
}
