use crate::error::Result;
use crate::types::ids::UserId;
use crate::types::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IpActivityRecord {
    pub ip_address: IpAddr,
    pub user_id: UserId,
    pub recorded_at: Timestamp,
}

/// Append-only activity log; records are never mutated or deleted.
pub struct IpActivityLog {
    records: Vec<IpActivityRecord>,
}

impl IpActivityLog {
    pub fn new() -> Self {
        IpActivityLog {
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, ip_address: IpAddr, user_id: UserId, now: Timestamp) {
        self.records.push(IpActivityRecord {
            ip_address,
            user_id,
            recorded_at: now,
        });
    }

    /// Distinct users seen from `ip_address` within the trailing window.
    /// Fallible signature so callers can keep their fail-open handling even
    /// though the in-memory scan cannot currently fail.
    pub fn distinct_users_within(
        &self,
        ip_address: IpAddr,
        window: Duration,
        now: Timestamp,
    ) -> Result<HashSet<UserId>> {
        let cutoff = Timestamp::from_millis(
            now.to_millis().saturating_sub(window.as_millis() as u64),
        );
        let users = self
            .records
            .iter()
            .filter(|r| r.ip_address == ip_address && r.recorded_at >= cutoff)
            .map(|r| r.user_id)
            .collect();
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn counts_distinct_users_per_ip() {
        let mut log = IpActivityLog::new();
        let now = Timestamp::from_millis(100_000_000);
        let window = Duration::from_secs(24 * 3600);

        let alice = UserId::new();
        let bob = UserId::new();
        log.record(ip(1), alice, now);
        log.record(ip(1), alice, now);
        log.record(ip(1), bob, now);
        log.record(ip(2), UserId::new(), now);

        let users = log.distinct_users_within(ip(1), window, now).unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.contains(&alice));
    }

    #[test]
    fn window_excludes_old_records() {
        let mut log = IpActivityLog::new();
        let window = Duration::from_secs(24 * 3600);
        let t0 = Timestamp::from_millis(1_000_000_000);
        let later = t0 + Duration::from_secs(25 * 3600);

        log.record(ip(1), UserId::new(), t0);
        let recent = UserId::new();
        log.record(ip(1), recent, later);

        let users = log.distinct_users_within(ip(1), window, later).unwrap();
        assert_eq!(users.len(), 1);
        assert!(users.contains(&recent));
    }
}
