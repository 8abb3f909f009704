// Owned storage for all durable entities. Each store is wrapped in a
// single RwLock by the flows that use it; every mutating method performs
// its whole check-and-mutate under one &mut borrow, so holding the write
// guard for the call gives the operation its atomicity.
//
// Lock order where a flow needs two stores:
//   deposits -> balances (webhook reconciliation)
//   balances -> withdrawals (withdrawal request and admin decision)

pub mod accounts;
pub mod balance_store;
pub mod deposit_store;
pub mod ip_log;
pub mod ledger;
pub mod streams;
pub mod withdrawal_store;
