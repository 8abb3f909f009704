use crate::error::{Error, Result};
use crate::store::accounts::Account;
use crate::store::ledger::{EntryType, Ledger, LedgerEntry};
use crate::types::ids::{EntryId, UserId};
use crate::types::points::Points;
use crate::types::timestamp::Timestamp;
use std::collections::HashMap;
use std::time::Duration;

pub struct BalanceStore {
    pub accounts: HashMap<UserId, Account>,
    pub ledger: Ledger,
}

impl BalanceStore {
    pub fn new() -> Self {
        BalanceStore {
            accounts: HashMap::new(),
            ledger: Ledger::new(),
        }
    }

    pub fn get_account(&self, user_id: UserId) -> Result<&Account> {
        self.accounts
            .get(&user_id)
            .ok_or(Error::AccountNotFound(user_id))
    }

    /// Current balance, zero for users with no account yet.
    pub fn balance(&self, user_id: UserId) -> Points {
        self.accounts
            .get(&user_id)
            .map(|a| a.points)
            .unwrap_or_else(Points::zero)
    }

    /// Unconditionally credit `amount`, creating the account on first use.
    /// Bumps `total_earned` alongside `points`.
    pub fn credit(
        &mut self,
        user_id: UserId,
        amount: Points,
        entry_type: EntryType,
        reference_id: &str,
    ) -> Result<Points> {
        if amount <= Points::zero() {
            return Err(Error::InvalidAmount);
        }

        let balance_after;
        {
            let account = self
                .accounts
                .entry(user_id)
                .or_insert_with(|| Account::new(user_id));
            account.points = account.points + amount;
            account.total_earned = account.total_earned + amount;
            account.updated_at = Timestamp::now();
            balance_after = account.points;
        }

        self.record_ledger_entry(
            user_id,
            entry_type,
            amount,
            balance_after,
            reference_id.to_string(),
            "Points credit".to_string(),
        );

        Ok(balance_after)
    }

    /// Cooldown-gated credit: succeeds only if at least `cooldown` has
    /// elapsed since the user's last accepted credit. The check and the
    /// mutation happen under the same &mut borrow, so concurrent earn
    /// attempts serialized by the store lock see exactly one winner.
    pub fn try_credit(
        &mut self,
        user_id: UserId,
        amount: Points,
        cooldown: Duration,
        now: Timestamp,
    ) -> Result<Points> {
        if amount <= Points::zero() {
            return Err(Error::InvalidAmount);
        }

        let balance_after;
        {
            let account = self
                .accounts
                .entry(user_id)
                .or_insert_with(|| Account::new(user_id));

            if let Some(last) = account.last_credit_at {
                let elapsed = now - last;
                if elapsed < cooldown {
                    let wait = cooldown - elapsed;
                    return Err(Error::CooldownActive {
                        wait_secs: wait.as_secs().max(1),
                    });
                }
            }

            account.last_credit_at = Some(now);
            account.points = account.points + amount;
            account.total_earned = account.total_earned + amount;
            account.updated_at = now;
            balance_after = account.points;
        }

        self.record_ledger_entry(
            user_id,
            EntryType::EarnCredit,
            amount,
            balance_after,
            "earn".to_string(),
            "Watch-time credit".to_string(),
        );

        Ok(balance_after)
    }

    /// Conditional debit backing a withdrawal reservation. Re-validates the
    /// balance and debits in one step; `total_earned` is untouched.
    pub fn reserve(&mut self, user_id: UserId, amount: Points, reference_id: &str) -> Result<Points> {
        if amount <= Points::zero() {
            return Err(Error::InvalidAmount);
        }

        let available = self.balance(user_id);
        if available < amount {
            return Err(Error::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let balance_after;
        {
            // Balance check above guarantees the account exists
            let account = self
                .accounts
                .get_mut(&user_id)
                .ok_or(Error::AccountNotFound(user_id))?;
            account.points = account.points - amount;
            account.updated_at = Timestamp::now();
            balance_after = account.points;
        }

        self.record_ledger_entry(
            user_id,
            EntryType::WithdrawalReserve,
            -amount,
            balance_after,
            reference_id.to_string(),
            "Withdrawal reservation".to_string(),
        );

        Ok(balance_after)
    }

    /// Return previously reserved points to the balance. Does not bump
    /// `total_earned`, since the points were earned once already.
    pub fn refund(&mut self, user_id: UserId, amount: Points, reference_id: &str) -> Result<Points> {
        let balance_after;
        {
            let account = self
                .accounts
                .get_mut(&user_id)
                .ok_or(Error::AccountNotFound(user_id))?;
            account.points = account.points + amount;
            account.updated_at = Timestamp::now();
            balance_after = account.points;
        }

        self.record_ledger_entry(
            user_id,
            EntryType::WithdrawalRefund,
            amount,
            balance_after,
            reference_id.to_string(),
            "Withdrawal rejection refund".to_string(),
        );

        Ok(balance_after)
    }

    fn record_ledger_entry(
        &mut self,
        user_id: UserId,
        entry_type: EntryType,
        amount: Points,
        balance_after: Points,
        reference_id: String,
        description: String,
    ) {
        let entry = LedgerEntry {
            entry_id: EntryId::new(),
            timestamp: Timestamp::now(),
            entry_type,
            user_id,
            amount,
            balance_after,
            reference_id,
            description,
        };

        self.ledger.record_entry(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(60);

    #[test]
    fn credit_creates_account_on_first_use() {
        let mut store = BalanceStore::new();
        let user = UserId::new();

        let after = store
            .credit(user, Points::from_i64(500), EntryType::DepositCredit, "dep-1")
            .unwrap();

        assert_eq!(after, Points::from_i64(500));
        let account = store.get_account(user).unwrap();
        assert_eq!(account.total_earned, Points::from_i64(500));
    }

    #[test]
    fn try_credit_rejects_within_cooldown() {
        let mut store = BalanceStore::new();
        let user = UserId::new();
        let t0 = Timestamp::from_millis(1_000_000);

        store
            .try_credit(user, Points::from_i64(10), COOLDOWN, t0)
            .unwrap();

        // 10 seconds later: rejected, balance unchanged
        let t1 = t0 + Duration::from_secs(10);
        let err = store
            .try_credit(user, Points::from_i64(10), COOLDOWN, t1)
            .unwrap_err();
        match err {
            Error::CooldownActive { wait_secs } => assert_eq!(wait_secs, 50),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.balance(user), Points::from_i64(10));
    }

    #[test]
    fn try_credit_allows_after_cooldown() {
        let mut store = BalanceStore::new();
        let user = UserId::new();
        let t0 = Timestamp::from_millis(1_000_000);

        store
            .try_credit(user, Points::from_i64(10), COOLDOWN, t0)
            .unwrap();
        let after = store
            .try_credit(user, Points::from_i64(10), COOLDOWN, t0 + COOLDOWN)
            .unwrap();

        assert_eq!(after, Points::from_i64(20));
        assert_eq!(
            store.get_account(user).unwrap().total_earned,
            Points::from_i64(20)
        );
    }

    #[test]
    fn reserve_rejects_insufficient_balance() {
        let mut store = BalanceStore::new();
        let user = UserId::new();
        store
            .credit(user, Points::from_i64(100), EntryType::EarnCredit, "earn")
            .unwrap();

        let err = store.reserve(user, Points::from_i64(101), "w-1").unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { .. }));
        assert_eq!(store.balance(user), Points::from_i64(100));
    }

    #[test]
    fn reserve_debits_exact_balance_to_zero() {
        let mut store = BalanceStore::new();
        let user = UserId::new();
        store
            .credit(user, Points::from_i64(7000), EntryType::EarnCredit, "earn")
            .unwrap();

        let after = store.reserve(user, Points::from_i64(7000), "w-1").unwrap();
        assert_eq!(after, Points::zero());
        // total_earned untouched by the debit
        assert_eq!(
            store.get_account(user).unwrap().total_earned,
            Points::from_i64(7000)
        );
    }

    #[test]
    fn refund_restores_points_without_total_earned() {
        let mut store = BalanceStore::new();
        let user = UserId::new();
        store
            .credit(user, Points::from_i64(7000), EntryType::EarnCredit, "earn")
            .unwrap();
        store.reserve(user, Points::from_i64(7000), "w-1").unwrap();

        let after = store.refund(user, Points::from_i64(7000), "w-1").unwrap();
        assert_eq!(after, Points::from_i64(7000));
        assert_eq!(
            store.get_account(user).unwrap().total_earned,
            Points::from_i64(7000)
        );
    }

    #[test]
    fn reserve_for_unknown_user_reports_zero_available() {
        let mut store = BalanceStore::new();
        let err = store
            .reserve(UserId::new(), Points::from_i64(10), "w-1")
            .unwrap_err();
        match err {
            Error::InsufficientBalance { available, .. } => {
                assert_eq!(available, Points::zero())
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    proptest::proptest! {
        #[test]
        fn ledger_entries_sum_to_balance(
            amounts in proptest::collection::vec(1i64..10_000, 1..20)
        ) {
            let mut store = BalanceStore::new();
            let user = UserId::new();
            for a in &amounts {
                store
                    .credit(user, Points::from_i64(*a), EntryType::EarnCredit, "earn")
                    .unwrap();
            }

            let total: i64 = amounts.iter().sum();
            proptest::prop_assert_eq!(store.balance(user), Points::from_i64(total));

            let from_ledger: i64 = store
                .ledger
                .entries_for_user(user)
                .iter()
                .map(|e| e.amount.to_i64())
                .sum();
            proptest::prop_assert_eq!(from_ledger, total);
        }
    }
}
