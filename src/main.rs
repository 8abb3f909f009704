use std::net::SocketAddr;
use std::sync::Arc;
use streampoints::api::rest::{ApiState, create_router};
use streampoints::config::loader::AppConfig;
use streampoints::earning::EarnPolicy;
use streampoints::gateway::mercado_pago::MercadoPago;
use streampoints::gateway::signature::WebhookVerifier;
use streampoints::observability;
use streampoints::settlement::deposit::DepositFlow;
use streampoints::settlement::withdrawal::WithdrawalFlow;
use streampoints::store::balance_store::BalanceStore;
use streampoints::store::deposit_store::DepositStore;
use streampoints::store::ip_log::IpActivityLog;
use streampoints::store::streams::StreamRegistry;
use streampoints::store::withdrawal_store::WithdrawalStore;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::tracing::init();
    observability::metrics::register_metrics();

    let env = std::env::var("STREAMPOINTS_ENV").unwrap_or_else(|_| "default".to_string());
    let config = AppConfig::load(&env)?;

    let balances = Arc::new(RwLock::new(BalanceStore::new()));
    let deposits = Arc::new(RwLock::new(DepositStore::new()));
    let withdrawals = Arc::new(RwLock::new(WithdrawalStore::new()));
    let ip_log = Arc::new(RwLock::new(IpActivityLog::new()));
    let streams = Arc::new(RwLock::new(StreamRegistry::new()));
    let gateway = Arc::new(MercadoPago::new(&config.gateway));

    let state = Arc::new(ApiState {
        earn: EarnPolicy::new(
            streams.clone(),
            balances.clone(),
            ip_log,
            &config.limits,
        ),
        deposits: DepositFlow::new(
            deposits,
            balances.clone(),
            gateway,
            config.economy.clone(),
        ),
        withdrawals: WithdrawalFlow::new(balances, withdrawals, config.economy.clone()),
        streams,
        webhook_verifier: WebhookVerifier::new(&config.gateway.webhook_secret),
    });

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!(addr = %config.server.bind_addr, "streampoints listening");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
