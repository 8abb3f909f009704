use crate::types::ids::{StreamId, UserId};
use tracing::Span;
use tracing_subscriber::EnvFilter;

pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

pub fn trace_earn(user_id: &UserId, stream_id: &StreamId) -> Span {
    tracing::info_span!(
        "earn_points",
        user_id = %user_id,
        stream_id = %stream_id,
    )
}

pub fn trace_webhook(payment_id: &str) -> Span {
    tracing::info_span!(
        "webhook_reconcile",
        payment_id = %payment_id,
    )
}
