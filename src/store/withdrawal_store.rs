use crate::error::{Error, Result};
use crate::types::ids::{UserId, WithdrawalId};
use crate::types::money::BrlAmount;
use crate::types::points::Points;
use crate::types::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixKeyType {
    Cpf,
    Email,
    Phone,
    Random,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub user_id: UserId,
    pub amount_points: Points,
    pub amount: BrlAmount,
    pub pix_key_type: PixKeyType,
    pub pix_key: String,
    pub status: WithdrawalStatus,
    pub created_at: Timestamp,
    pub processed_at: Option<Timestamp>,
}

impl Withdrawal {
    pub fn pending(
        user_id: UserId,
        amount_points: Points,
        amount: BrlAmount,
        pix_key_type: PixKeyType,
        pix_key: String,
    ) -> Self {
        Withdrawal {
            id: WithdrawalId::new(),
            user_id,
            amount_points,
            amount,
            pix_key_type,
            pix_key,
            status: WithdrawalStatus::Pending,
            created_at: Timestamp::now(),
            processed_at: None,
        }
    }
}

pub struct WithdrawalStore {
    withdrawals: HashMap<WithdrawalId, Withdrawal>,
}

impl WithdrawalStore {
    pub fn new() -> Self {
        WithdrawalStore {
            withdrawals: HashMap::new(),
        }
    }

    pub fn insert(&mut self, withdrawal: Withdrawal) {
        self.withdrawals.insert(withdrawal.id, withdrawal);
    }

    pub fn get(&self, id: WithdrawalId) -> Result<&Withdrawal> {
        self.withdrawals
            .get(&id)
            .ok_or(Error::WithdrawalNotFound(id))
    }

    /// Pending-only transition to a terminal status. A second decision on
    /// the same id fails with WithdrawalNotPending instead of silently
    /// re-applying.
    pub fn finalize(
        &mut self,
        id: WithdrawalId,
        status: WithdrawalStatus,
        now: Timestamp,
    ) -> Result<Withdrawal> {
        let withdrawal = self
            .withdrawals
            .get_mut(&id)
            .ok_or(Error::WithdrawalNotFound(id))?;

        if withdrawal.status != WithdrawalStatus::Pending {
            return Err(Error::WithdrawalNotPending(id));
        }

        withdrawal.status = status;
        withdrawal.processed_at = Some(now);
        Ok(withdrawal.clone())
    }
}
