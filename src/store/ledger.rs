use crate::types::ids::{EntryId, UserId};
use crate::types::points::Points;
use crate::types::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub timestamp: Timestamp,
    pub entry_type: EntryType,
    pub user_id: UserId,
    pub amount: Points, // Signed: positive = credit, negative = debit
    pub balance_after: Points,
    pub reference_id: String,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    EarnCredit,
    DepositCredit,
    WithdrawalReserve,
    WithdrawalRefund,
}

pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            entries: Vec::new(),
        }
    }

    pub fn record_entry(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    pub fn entries_for_user(&self, user_id: UserId) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.user_id == user_id).collect()
    }

    pub fn entries_for_reference(&self, reference_id: &str) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.reference_id == reference_id)
            .collect()
    }
}
