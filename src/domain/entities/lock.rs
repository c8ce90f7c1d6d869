//! Lock entity - persisted metadata describing who holds a resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lock metadata as written to the lock file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Named resource (platform + target directory)
    pub resource: String,
    /// Owning process id
    pub pid: u32,
    /// Host the owner runs on; liveness is only checked on the same host
    #[serde(default)]
    pub hostname: String,
    /// Unique per acquisition, so release never removes a successor's lock
    pub token: String,
    pub acquired_at: DateTime<Utc>,
    /// Lease duration in milliseconds (the stale threshold at acquire time)
    pub lease_ms: u64,
}

impl LockInfo {
    /// Time elapsed since acquisition (zero if the clock went backwards)
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.acquired_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whether the lock is older than `stale_after`
    pub fn is_expired(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        self.age(now) > stale_after
    }
}
