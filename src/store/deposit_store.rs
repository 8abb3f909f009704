use crate::error::{Error, Result};
use crate::types::ids::{DepositId, UserId};
use crate::types::money::BrlAmount;
use crate::types::points::Points;
use crate::types::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl DepositStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DepositStatus::Pending)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,
    pub user_id: UserId,
    pub amount: BrlAmount,
    pub points_awarded: Points,
    pub status: DepositStatus,
    pub gateway_payment_id: Option<String>,
    pub created_at: Timestamp,
}

impl Deposit {
    pub fn pending(user_id: UserId, amount: BrlAmount, points_awarded: Points) -> Self {
        Deposit {
            id: DepositId::new(),
            user_id,
            amount,
            points_awarded,
            status: DepositStatus::Pending,
            gateway_payment_id: None,
            created_at: Timestamp::now(),
        }
    }
}

pub struct DepositStore {
    deposits: HashMap<DepositId, Deposit>,
}

impl DepositStore {
    pub fn new() -> Self {
        DepositStore {
            deposits: HashMap::new(),
        }
    }

    pub fn insert(&mut self, deposit: Deposit) {
        self.deposits.insert(deposit.id, deposit);
    }

    pub fn get(&self, id: DepositId) -> Option<&Deposit> {
        self.deposits.get(&id)
    }

    /// Resolve a gateway external reference (the deposit's own id) back to
    /// the deposit it was created for.
    pub fn find_by_reference(&self, reference: &str) -> Result<&Deposit> {
        let id = DepositId::parse(reference)
            .map_err(|_| Error::DepositNotFound(reference.to_string()))?;
        self.deposits
            .get(&id)
            .ok_or_else(|| Error::DepositNotFound(reference.to_string()))
    }

    pub fn attach_payment(&mut self, id: DepositId, gateway_payment_id: &str) -> Result<()> {
        let deposit = self
            .deposits
            .get_mut(&id)
            .ok_or_else(|| Error::DepositNotFound(id.to_string()))?;
        deposit.gateway_payment_id = Some(gateway_payment_id.to_string());
        Ok(())
    }

    /// Conditional transition out of `pending`. Returns true when the
    /// transition applied, false when the deposit had already left pending
    /// (the idempotency short-circuit for redelivered webhooks).
    pub fn settle(
        &mut self,
        id: DepositId,
        status: DepositStatus,
        gateway_payment_id: Option<String>,
    ) -> Result<bool> {
        let deposit = self
            .deposits
            .get_mut(&id)
            .ok_or_else(|| Error::DepositNotFound(id.to_string()))?;

        if deposit.status.is_terminal() {
            return Ok(false);
        }

        deposit.status = status;
        if let Some(payment_id) = gateway_payment_id {
            deposit.gateway_payment_id = Some(payment_id);
        }
        Ok(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Deposit> {
        self.deposits.values()
    }

    /// Completed deposits, for reconciliation sweeps.
    pub fn completed(&self) -> Vec<&Deposit> {
        self.deposits
            .values()
            .filter(|d| d.status == DepositStatus::Completed)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_applies_once() {
        let mut store = DepositStore::new();
        let deposit = Deposit::pending(
            UserId::new(),
            BrlAmount::from_centavos(1000),
            Points::from_i64(6000),
        );
        let id = deposit.id;
        store.insert(deposit);

        assert!(store
            .settle(id, DepositStatus::Completed, Some("pay-1".to_string()))
            .unwrap());
        // Redelivery: no transition
        assert!(!store
            .settle(id, DepositStatus::Completed, Some("pay-1".to_string()))
            .unwrap());
        assert_eq!(store.get(id).unwrap().status, DepositStatus::Completed);
    }

    #[test]
    fn find_by_reference_round_trips_the_id() {
        let mut store = DepositStore::new();
        let deposit = Deposit::pending(
            UserId::new(),
            BrlAmount::from_centavos(500),
            Points::from_i64(3000),
        );
        let reference = deposit.id.to_string();
        store.insert(deposit);

        let found = store.find_by_reference(&reference).unwrap();
        assert_eq!(found.points_awarded, Points::from_i64(3000));
    }

    #[test]
    fn find_by_reference_rejects_garbage() {
        let store = DepositStore::new();
        assert!(matches!(
            store.find_by_reference("not-a-uuid"),
            Err(Error::DepositNotFound(_))
        ));
    }
}
