use crate::config::limits::LimitsConfig;
use crate::error::{Error, Result};
use crate::store::ip_log::IpActivityLog;
use crate::store::streams::Stream;
use crate::types::ids::UserId;
use crate::types::timestamp::Timestamp;
use std::net::IpAddr;
use std::time::Duration;

/// Pre-credit checks for earn attempts: stream liveness and the per-IP
/// account fan-out ceiling. The per-user cooldown itself lives inside
/// BalanceStore::try_credit so it stays atomic with the credit.
#[derive(Clone)]
pub struct AbuseGuard {
    ip_user_ceiling: usize,
    ip_window: Duration,
}

impl AbuseGuard {
    pub fn new(limits: &LimitsConfig) -> Self {
        AbuseGuard {
            ip_user_ceiling: limits.ip_user_ceiling,
            ip_window: limits.ip_window(),
        }
    }

    /// Earn attempts are only valid against a live stream; anything else is
    /// a terminal rejection.
    pub fn check_stream(&self, stream: &Stream) -> Result<()> {
        if !stream.is_live() {
            return Err(Error::StreamNotLive(stream.stream_id));
        }
        Ok(())
    }

    /// Reject when the IP has already been used by `ip_user_ceiling`
    /// distinct users in the trailing window and this user is not among
    /// them. Fail-open: a lookup failure allows the request rather than
    /// blocking legitimate users. On allow, the activity is recorded
    /// best-effort.
    pub fn check_ip(
        &self,
        log: &mut IpActivityLog,
        ip_address: IpAddr,
        user_id: UserId,
        now: Timestamp,
    ) -> Result<()> {
        match log.distinct_users_within(ip_address, self.ip_window, now) {
            Ok(users) => {
                if users.len() >= self.ip_user_ceiling && !users.contains(&user_id) {
                    return Err(Error::IpAccountLimitReached);
                }
            }
            Err(e) => {
                tracing::warn!(%ip_address, error = %e, "IP activity lookup failed, allowing request");
            }
        }

        log.record(ip_address, user_id, now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::streams::StreamStatus;
    use crate::types::points::Points;

    fn guard() -> AbuseGuard {
        AbuseGuard::new(&LimitsConfig::default())
    }

    fn ip() -> IpAddr {
        IpAddr::from([203, 0, 113, 9])
    }

    #[test]
    fn rejects_ended_stream() {
        let mut stream = Stream::live("test", Points::from_i64(10));
        stream.status = StreamStatus::Ended;
        assert!(matches!(
            guard().check_stream(&stream),
            Err(Error::StreamNotLive(_))
        ));
    }

    #[test]
    fn fifth_user_from_one_ip_is_rejected() {
        let guard = guard();
        let mut log = IpActivityLog::new();
        let now = Timestamp::from_millis(1_000_000_000);

        let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
        for user in &users {
            guard.check_ip(&mut log, ip(), *user, now).unwrap();
        }

        // A fifth, unseen user is turned away
        assert!(matches!(
            guard.check_ip(&mut log, ip(), UserId::new(), now),
            Err(Error::IpAccountLimitReached)
        ));

        // The original four keep earning
        for user in &users {
            guard.check_ip(&mut log, ip(), *user, now).unwrap();
        }
    }

    #[test]
    fn other_networks_are_unaffected() {
        let guard = guard();
        let mut log = IpActivityLog::new();
        let now = Timestamp::from_millis(1_000_000_000);

        for _ in 0..4 {
            guard.check_ip(&mut log, ip(), UserId::new(), now).unwrap();
        }

        let other_ip = IpAddr::from([198, 51, 100, 1]);
        guard
            .check_ip(&mut log, other_ip, UserId::new(), now)
            .unwrap();
    }
}
