pub mod deposit;
pub mod reconciliation;
pub mod withdrawal;
