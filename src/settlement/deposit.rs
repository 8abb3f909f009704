use crate::config::economy::EconomyConfig;
use crate::error::{Error, Result};
use crate::interfaces::payment_gateway::{ChargeRequest, PaymentGateway, PaymentStatus, Payer};
use crate::observability::metrics;
use crate::store::balance_store::BalanceStore;
use crate::store::deposit_store::{Deposit, DepositStatus, DepositStore};
use crate::store::ledger::EntryType;
use crate::types::ids::UserId;
use crate::types::money::BrlAmount;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything the caller needs to pay: the charge id plus PIX QR codes.
#[derive(Clone, Debug)]
pub struct PaymentIntent {
    pub payment_id: String,
    pub qr_code: String,
    pub qr_code_base64: String,
}

pub struct DepositFlow {
    deposits: Arc<RwLock<DepositStore>>,
    balances: Arc<RwLock<BalanceStore>>,
    gateway: Arc<dyn PaymentGateway>,
    economy: EconomyConfig,
}

impl DepositFlow {
    pub fn new(
        deposits: Arc<RwLock<DepositStore>>,
        balances: Arc<RwLock<BalanceStore>>,
        gateway: Arc<dyn PaymentGateway>,
        economy: EconomyConfig,
    ) -> Self {
        DepositFlow {
            deposits,
            balances,
            gateway,
            economy,
        }
    }

    /// Create a pending deposit and request the matching PIX charge. The
    /// deposit id doubles as the gateway external reference and the
    /// idempotency key, so a retried charge request cannot double-charge.
    pub async fn create(
        &self,
        user_id: UserId,
        amount: BrlAmount,
        payer: Payer,
    ) -> Result<PaymentIntent> {
        if amount <= BrlAmount::zero() {
            return Err(Error::InvalidAmount);
        }

        let points_awarded = self.economy.points_for_deposit(amount);
        let deposit = Deposit::pending(user_id, amount, points_awarded);
        let deposit_id = deposit.id;
        let reference = deposit_id.to_string();

        {
            self.deposits.write().await.insert(deposit);
        }
        metrics::DEPOSITS_CREATED.inc();

        let request = ChargeRequest {
            external_reference: reference.clone(),
            idempotency_key: reference,
            amount,
            payer,
            description: "Stream points purchase".to_string(),
        };

        match self.gateway.create_charge(&request).await {
            Ok(charge) => {
                self.deposits
                    .write()
                    .await
                    .attach_payment(deposit_id, &charge.payment_id)?;
                tracing::info!(%deposit_id, payment_id = %charge.payment_id, "PIX charge created");
                Ok(PaymentIntent {
                    payment_id: charge.payment_id,
                    qr_code: charge.qr_code,
                    qr_code_base64: charge.qr_code_base64,
                })
            }
            Err(e) => {
                // No charge exists, so the pending record would never settle
                self.deposits
                    .write()
                    .await
                    .settle(deposit_id, DepositStatus::Rejected, None)?;
                tracing::warn!(%deposit_id, error = %e, "PIX charge creation failed");
                Err(e)
            }
        }
    }

    /// Reconcile a webhook notification. Fetches the authoritative payment
    /// status from the gateway, locates the deposit by external reference,
    /// credits exactly once while the deposit is still pending, then flips
    /// the status. Redelivered notifications are balance no-ops.
    pub async fn reconcile(&self, payment_id: &str) -> Result<()> {
        let payment = self.gateway.payment_status(payment_id).await?;
        let reference = payment.external_reference.clone().ok_or_else(|| {
            Error::GatewayError(format!("payment {} has no external reference", payment_id))
        })?;

        // Lock order: deposits -> balances
        let mut deposits = self.deposits.write().await;
        let (deposit_id, user_id, points_awarded, was_pending) = {
            let deposit = deposits.find_by_reference(&reference)?;
            (
                deposit.id,
                deposit.user_id,
                deposit.points_awarded,
                deposit.status == DepositStatus::Pending,
            )
        };

        let new_status = match payment.status {
            PaymentStatus::Approved => DepositStatus::Completed,
            PaymentStatus::Rejected => DepositStatus::Rejected,
            PaymentStatus::Pending => {
                tracing::debug!(%deposit_id, "payment still pending at gateway");
                return Ok(());
            }
            PaymentStatus::Other(ref s) => {
                tracing::warn!(%deposit_id, status = %s, "unrecognized gateway status, leaving deposit pending");
                return Ok(());
            }
        };

        let credited = if new_status == DepositStatus::Completed && was_pending {
            let mut balances = self.balances.write().await;
            balances.credit(
                user_id,
                points_awarded,
                EntryType::DepositCredit,
                &reference,
            )?;
            true
        } else {
            false
        };

        if let Err(e) = deposits.settle(deposit_id, new_status, Some(payment.payment_id.clone())) {
            if credited {
                // Points are on the balance but the deposit still reads
                // pending; retrying blindly would double-credit.
                metrics::RECONCILIATION_ANOMALIES.inc();
                tracing::error!(
                    %deposit_id,
                    %user_id,
                    points = %points_awarded,
                    error = %e,
                    "deposit credited but status update failed"
                );
                return Err(Error::ReconciliationAnomaly(format!(
                    "deposit {} credited but not settled: {}",
                    deposit_id, e
                )));
            }
            return Err(e);
        }

        if credited {
            metrics::DEPOSITS_SETTLED.inc();
            tracing::info!(%deposit_id, %user_id, points = %points_awarded, "deposit settled and credited");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::payment_gateway::{GatewayPayment, MockPaymentGateway, PixCharge};
    use crate::types::points::Points;

    fn payer() -> Payer {
        Payer {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            cpf: "12345678901".to_string(),
        }
    }

    struct Fixture {
        flow: DepositFlow,
        deposits: Arc<RwLock<DepositStore>>,
        balances: Arc<RwLock<BalanceStore>>,
    }

    fn fixture(gateway: MockPaymentGateway) -> Fixture {
        let deposits = Arc::new(RwLock::new(DepositStore::new()));
        let balances = Arc::new(RwLock::new(BalanceStore::new()));
        let flow = DepositFlow::new(
            deposits.clone(),
            balances.clone(),
            Arc::new(gateway),
            EconomyConfig::default(),
        );
        Fixture {
            flow,
            deposits,
            balances,
        }
    }

    fn pix_charge() -> PixCharge {
        PixCharge {
            payment_id: "987654".to_string(),
            qr_code: "qr".to_string(),
            qr_code_base64: "cXI=".to_string(),
        }
    }

    async fn only_reference(deposits: &Arc<RwLock<DepositStore>>) -> String {
        let deposits = deposits.read().await;
        deposits.iter().next().unwrap().id.to_string()
    }

    #[tokio::test]
    async fn create_awards_floor_of_amount_times_rate() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_charge()
            .returning(|_| Ok(pix_charge()));
        let fx = fixture(gateway);
        let user = UserId::new();

        let intent = fx
            .flow
            .create(user, BrlAmount::from_reais(10.0), payer())
            .await
            .unwrap();
        assert_eq!(intent.payment_id, "987654");

        let deposits = fx.deposits.read().await;
        let deposit = deposits.iter().next().unwrap();
        assert_eq!(deposit.points_awarded, Points::from_i64(6000));
        assert_eq!(deposit.status, DepositStatus::Pending);
        assert_eq!(deposit.gateway_payment_id.as_deref(), Some("987654"));
        // Nothing credited until the webhook settles it
        assert_eq!(fx.balances.read().await.balance(user), Points::zero());
    }

    #[tokio::test]
    async fn approved_webhook_credits_exactly_once() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_charge()
            .returning(|_| Ok(pix_charge()));
        let fx = fixture(gateway);
        let user = UserId::new();

        fx.flow
            .create(user, BrlAmount::from_reais(10.0), payer())
            .await
            .unwrap();
        let reference = only_reference(&fx.deposits).await;

        // Rebuild the flow with a gateway that now reports approved
        let mut gateway = MockPaymentGateway::new();
        let reference_for_mock = reference.clone();
        gateway.expect_payment_status().returning(move |id| {
            Ok(GatewayPayment {
                payment_id: id.to_string(),
                status: PaymentStatus::Approved,
                external_reference: Some(reference_for_mock.clone()),
            })
        });
        let flow = DepositFlow::new(
            fx.deposits.clone(),
            fx.balances.clone(),
            Arc::new(gateway),
            EconomyConfig::default(),
        );

        flow.reconcile("987654").await.unwrap();
        assert_eq!(
            fx.balances.read().await.balance(user),
            Points::from_i64(6000)
        );

        // Duplicate delivery: balance unchanged, status stays terminal
        flow.reconcile("987654").await.unwrap();
        assert_eq!(
            fx.balances.read().await.balance(user),
            Points::from_i64(6000)
        );
        let deposits = fx.deposits.read().await;
        let deposit = deposits.find_by_reference(&reference).unwrap();
        assert_eq!(deposit.status, DepositStatus::Completed);
    }

    #[tokio::test]
    async fn rejected_payment_never_credits() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_charge()
            .returning(|_| Ok(pix_charge()));
        let fx = fixture(gateway);
        let user = UserId::new();

        fx.flow
            .create(user, BrlAmount::from_reais(5.0), payer())
            .await
            .unwrap();
        let reference = only_reference(&fx.deposits).await;

        let mut gateway = MockPaymentGateway::new();
        let reference_for_mock = reference.clone();
        gateway.expect_payment_status().returning(move |id| {
            Ok(GatewayPayment {
                payment_id: id.to_string(),
                status: PaymentStatus::Rejected,
                external_reference: Some(reference_for_mock.clone()),
            })
        });
        let flow = DepositFlow::new(
            fx.deposits.clone(),
            fx.balances.clone(),
            Arc::new(gateway),
            EconomyConfig::default(),
        );

        flow.reconcile("987654").await.unwrap();
        assert_eq!(fx.balances.read().await.balance(user), Points::zero());
        let deposits = fx.deposits.read().await;
        let deposit = deposits.find_by_reference(&reference).unwrap();
        assert_eq!(deposit.status, DepositStatus::Rejected);
    }

    #[tokio::test]
    async fn charge_failure_rejects_the_pending_deposit() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_charge()
            .returning(|_| Err(Error::GatewayError("boom".to_string())));
        let fx = fixture(gateway);

        let err = fx
            .flow
            .create(UserId::new(), BrlAmount::from_reais(10.0), payer())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GatewayError(_)));

        let deposits = fx.deposits.read().await;
        let deposit = deposits.iter().next().unwrap();
        assert_eq!(deposit.status, DepositStatus::Rejected);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected_before_any_side_effect() {
        let gateway = MockPaymentGateway::new();
        let fx = fixture(gateway);

        let err = fx
            .flow
            .create(UserId::new(), BrlAmount::zero(), payer())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount));
    }
}
