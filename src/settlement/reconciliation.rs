use crate::error::{Error, Result};
use crate::store::balance_store::BalanceStore;
use crate::store::deposit_store::DepositStore;
use crate::store::ledger::EntryType;
use crate::types::ids::UserId;
use crate::types::points::Points;

pub struct Reconciliation;

impl Reconciliation {
    /// Verify an account's balance against the sum of its ledger entries.
    pub fn reconcile_account(balances: &BalanceStore, user_id: UserId) -> Result<()> {
        let account = balances.get_account(user_id)?;

        let from_ledger: i64 = balances
            .ledger
            .entries_for_user(user_id)
            .iter()
            .map(|e| e.amount.to_i64())
            .sum();

        let expected = Points::from_i64(from_ledger);
        if account.points != expected {
            return Err(Error::LedgerMismatch {
                expected,
                actual: account.points,
            });
        }

        Ok(())
    }

    /// Every completed deposit must have credited exactly once. More than
    /// one credit entry means a duplicate webhook slipped past the pending
    /// guard; zero means the status flipped without the credit landing.
    pub fn verify_deposit_credits(
        balances: &BalanceStore,
        deposits: &DepositStore,
    ) -> Result<()> {
        for deposit in deposits.completed() {
            let credits = balances
                .ledger
                .entries_for_reference(&deposit.id.to_string())
                .iter()
                .filter(|e| e.entry_type == EntryType::DepositCredit)
                .count();

            if credits != 1 {
                return Err(Error::ReconciliationAnomaly(format!(
                    "deposit {} completed with {} credit entries",
                    deposit.id, credits
                )));
            }
        }

        Ok(())
    }
}
