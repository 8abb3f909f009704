use crate::config::limits::LimitsConfig;
use crate::error::Result;
use crate::guard::AbuseGuard;
use crate::observability::metrics;
use crate::store::balance_store::BalanceStore;
use crate::store::ip_log::IpActivityLog;
use crate::store::streams::StreamRegistry;
use crate::types::ids::{StreamId, UserId};
use crate::types::points::Points;
use crate::types::timestamp::Timestamp;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Orchestrates one watch-event credit: stream lookup, abuse guard, then
/// the atomic cooldown-gated credit.
pub struct EarnPolicy {
    streams: Arc<RwLock<StreamRegistry>>,
    balances: Arc<RwLock<BalanceStore>>,
    ip_log: Arc<RwLock<IpActivityLog>>,
    guard: AbuseGuard,
    cooldown: Duration,
}

impl EarnPolicy {
    pub fn new(
        streams: Arc<RwLock<StreamRegistry>>,
        balances: Arc<RwLock<BalanceStore>>,
        ip_log: Arc<RwLock<IpActivityLog>>,
        limits: &LimitsConfig,
    ) -> Self {
        EarnPolicy {
            streams,
            balances,
            ip_log,
            guard: AbuseGuard::new(limits),
            cooldown: limits.earn_cooldown(),
        }
    }

    pub async fn earn(
        &self,
        user_id: UserId,
        stream_id: StreamId,
        ip_address: IpAddr,
    ) -> Result<Points> {
        let now = Timestamp::now();

        let points_per_minute = {
            let streams = self.streams.read().await;
            let stream = streams.get(stream_id)?;
            self.guard.check_stream(stream)?;
            stream.points_per_minute
        };

        {
            let mut ip_log = self.ip_log.write().await;
            self.guard
                .check_ip(&mut ip_log, ip_address, user_id, now)?;
        }

        let mut balances = self.balances.write().await;
        match balances.try_credit(user_id, points_per_minute, self.cooldown, now) {
            Ok(balance_after) => {
                metrics::EARN_CREDITS.inc();
                tracing::info!(
                    %user_id,
                    %stream_id,
                    points = %points_per_minute,
                    balance = %balance_after,
                    "earn credit applied"
                );
                Ok(points_per_minute)
            }
            Err(e) => {
                metrics::EARN_REJECTIONS.inc();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::streams::{Stream, StreamStatus};

    fn setup(stream: Stream) -> (EarnPolicy, StreamId) {
        let stream_id = stream.stream_id;
        let mut registry = StreamRegistry::new();
        registry.upsert(stream);

        let policy = EarnPolicy::new(
            Arc::new(RwLock::new(registry)),
            Arc::new(RwLock::new(BalanceStore::new())),
            Arc::new(RwLock::new(IpActivityLog::new())),
            &LimitsConfig::default(),
        );
        (policy, stream_id)
    }

    fn ip() -> IpAddr {
        IpAddr::from([192, 0, 2, 1])
    }

    #[tokio::test]
    async fn first_earn_credits_points_per_minute() {
        let (policy, stream_id) = setup(Stream::live("live", Points::from_i64(10)));
        let user = UserId::new();

        let earned = policy.earn(user, stream_id, ip()).await.unwrap();
        assert_eq!(earned, Points::from_i64(10));

        let balances = policy.balances.read().await;
        let account = balances.get_account(user).unwrap();
        assert_eq!(account.points, Points::from_i64(10));
        assert_eq!(account.total_earned, Points::from_i64(10));
    }

    #[tokio::test]
    async fn second_earn_within_cooldown_is_rejected() {
        let (policy, stream_id) = setup(Stream::live("live", Points::from_i64(10)));
        let user = UserId::new();

        policy.earn(user, stream_id, ip()).await.unwrap();
        let err = policy.earn(user, stream_id, ip()).await.unwrap_err();
        assert!(matches!(err, Error::CooldownActive { .. }));

        let balances = policy.balances.read().await;
        assert_eq!(balances.balance(user), Points::from_i64(10));
    }

    #[tokio::test]
    async fn ended_stream_is_terminal() {
        let mut stream = Stream::live("over", Points::from_i64(10));
        stream.status = StreamStatus::Ended;
        let (policy, stream_id) = setup(stream);

        let err = policy
            .earn(UserId::new(), stream_id, ip())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StreamNotLive(_)));
    }

    #[tokio::test]
    async fn unknown_stream_is_rejected_without_mutation() {
        let (policy, _) = setup(Stream::live("live", Points::from_i64(10)));
        let user = UserId::new();

        let err = policy.earn(user, StreamId::new(), ip()).await.unwrap_err();
        assert!(matches!(err, Error::StreamNotFound(_)));

        let balances = policy.balances.read().await;
        assert_eq!(balances.balance(user), Points::zero());
    }
}
