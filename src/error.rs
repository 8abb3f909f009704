use crate::types::ids::{StreamId, UserId, WithdrawalId};
use crate::types::points::Points;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Authentication / Authorization Errors
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Admin privileges required")]
    AdminRequired,

    // Input Validation Errors
    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid PIX key: {0}")]
    InvalidPixKey(String),

    // Policy Rejections
    #[error("Please wait {wait_secs}s before earning again")]
    CooldownActive { wait_secs: u64 },

    #[error("Too many accounts active from this network")]
    IpAccountLimitReached,

    #[error("Stream has ended: {0}")]
    StreamNotLive(StreamId),

    #[error("Insufficient balance: requested={requested}, available={available}")]
    InsufficientBalance {
        requested: Points,
        available: Points,
    },

    #[error("Minimum withdrawal is {minimum} points")]
    BelowMinimumWithdrawal { minimum: Points },

    // Lookup Errors
    #[error("Stream not found: {0}")]
    StreamNotFound(StreamId),

    #[error("Account not found: {0}")]
    AccountNotFound(UserId),

    #[error("Deposit not found for reference: {0}")]
    DepositNotFound(String),

    #[error("Withdrawal not found: {0}")]
    WithdrawalNotFound(WithdrawalId),

    // Settlement State Errors
    #[error("Withdrawal {0} is no longer pending")]
    WithdrawalNotPending(WithdrawalId),

    #[error("Reconciliation anomaly: {0}")]
    ReconciliationAnomaly(String),

    #[error("Ledger mismatch: expected={expected}, actual={actual}")]
    LedgerMismatch { expected: Points, actual: Points },

    // Gateway Errors
    #[error("Invalid webhook signature")]
    InvalidWebhookSignature,

    #[error("Payment gateway error: {0}")]
    GatewayError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
