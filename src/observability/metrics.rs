use lazy_static::lazy_static;
use prometheus::{Counter, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Earning metrics
    pub static ref EARN_CREDITS: Counter = Counter::new(
        "earn_credits_total",
        "Total number of watch-time credits applied"
    ).unwrap();

    pub static ref EARN_REJECTIONS: Counter = Counter::new(
        "earn_rejections_total",
        "Total number of earn attempts rejected by policy"
    ).unwrap();

    // Deposit metrics
    pub static ref DEPOSITS_CREATED: Counter = Counter::new(
        "deposits_created_total",
        "Total number of pending deposits created"
    ).unwrap();

    pub static ref DEPOSITS_SETTLED: Counter = Counter::new(
        "deposits_settled_total",
        "Total number of deposits settled and credited"
    ).unwrap();

    // Withdrawal metrics
    pub static ref WITHDRAWALS_REQUESTED: Counter = Counter::new(
        "withdrawals_requested_total",
        "Total number of withdrawal reservations"
    ).unwrap();

    pub static ref WITHDRAWALS_FINALIZED: Counter = Counter::new(
        "withdrawals_finalized_total",
        "Total number of withdrawals approved or rejected"
    ).unwrap();

    // Webhook metrics
    pub static ref WEBHOOK_SIGNATURE_FAILURES: Counter = Counter::new(
        "webhook_signature_failures_total",
        "Total number of webhook notifications with bad signatures"
    ).unwrap();

    pub static ref RECONCILIATION_ANOMALIES: Counter = Counter::new(
        "reconciliation_anomalies_total",
        "Total number of credited-but-unsettled deposit anomalies"
    ).unwrap();
}

pub fn register_metrics() {
    REGISTRY.register(Box::new(EARN_CREDITS.clone())).unwrap();
    REGISTRY.register(Box::new(EARN_REJECTIONS.clone())).unwrap();
    REGISTRY.register(Box::new(DEPOSITS_CREATED.clone())).unwrap();
    REGISTRY.register(Box::new(DEPOSITS_SETTLED.clone())).unwrap();
    REGISTRY.register(Box::new(WITHDRAWALS_REQUESTED.clone())).unwrap();
    REGISTRY.register(Box::new(WITHDRAWALS_FINALIZED.clone())).unwrap();
    REGISTRY.register(Box::new(WEBHOOK_SIGNATURE_FAILURES.clone())).unwrap();
    REGISTRY.register(Box::new(RECONCILIATION_ANOMALIES.clone())).unwrap();
}
