use crate::config::economy::EconomyConfig;
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::store::balance_store::BalanceStore;
use crate::store::withdrawal_store::{
    PixKeyType, Withdrawal, WithdrawalStatus, WithdrawalStore,
};
use crate::types::ids::{UserId, WithdrawalId};
use crate::types::points::Points;
use crate::types::timestamp::Timestamp;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalAction {
    Approve,
    Reject,
}

pub struct WithdrawalFlow {
    balances: Arc<RwLock<BalanceStore>>,
    withdrawals: Arc<RwLock<WithdrawalStore>>,
    economy: EconomyConfig,
}

impl WithdrawalFlow {
    pub fn new(
        balances: Arc<RwLock<BalanceStore>>,
        withdrawals: Arc<RwLock<WithdrawalStore>>,
        economy: EconomyConfig,
    ) -> Self {
        WithdrawalFlow {
            balances,
            withdrawals,
            economy,
        }
    }

    /// Reserve points for a withdrawal. The balance re-check, the debit,
    /// and the pending insert all happen while both write guards are held,
    /// so two concurrent requests that together exceed the balance resolve
    /// first-committer-wins.
    pub async fn request(
        &self,
        user_id: UserId,
        amount_points: Points,
        pix_key_type: PixKeyType,
        pix_key: String,
    ) -> Result<Withdrawal> {
        if amount_points < self.economy.min_withdraw_points {
            return Err(Error::BelowMinimumWithdrawal {
                minimum: self.economy.min_withdraw_points,
            });
        }
        if pix_key.trim().is_empty() {
            return Err(Error::InvalidPixKey("key must not be empty".to_string()));
        }

        let amount_brl = self.economy.brl_for_withdrawal(amount_points);
        let withdrawal =
            Withdrawal::pending(user_id, amount_points, amount_brl, pix_key_type, pix_key);

        // Lock order: balances -> withdrawals
        let mut balances = self.balances.write().await;
        let mut withdrawals = self.withdrawals.write().await;

        balances.reserve(user_id, amount_points, &withdrawal.id.to_string())?;
        withdrawals.insert(withdrawal.clone());

        metrics::WITHDRAWALS_REQUESTED.inc();
        tracing::info!(
            %user_id,
            withdrawal_id = %withdrawal.id,
            points = %amount_points,
            amount = %amount_brl,
            created_at = %withdrawal.created_at,
            "withdrawal reserved"
        );
        Ok(withdrawal)
    }

    /// Admin decision on a pending withdrawal. Approval finalizes with no
    /// further balance mutation (points were debited at request time);
    /// rejection refunds only when the economy config says so.
    pub async fn decide(
        &self,
        withdrawal_id: WithdrawalId,
        action: WithdrawalAction,
    ) -> Result<Withdrawal> {
        let status = match action {
            WithdrawalAction::Approve => WithdrawalStatus::Completed,
            WithdrawalAction::Reject => WithdrawalStatus::Rejected,
        };

        // Lock order: balances -> withdrawals
        let mut balances = self.balances.write().await;
        let mut withdrawals = self.withdrawals.write().await;

        let withdrawal = withdrawals.finalize(withdrawal_id, status, Timestamp::now())?;

        if action == WithdrawalAction::Reject && self.economy.refund_rejected_withdrawals {
            balances.refund(
                withdrawal.user_id,
                withdrawal.amount_points,
                &withdrawal_id.to_string(),
            )?;
        }

        metrics::WITHDRAWALS_FINALIZED.inc();
        tracing::info!(
            %withdrawal_id,
            user_id = %withdrawal.user_id,
            status = ?withdrawal.status,
            "withdrawal finalized"
        );
        Ok(withdrawal)
    }
}
