pub mod api;
pub mod config;
pub mod earning;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod interfaces;
pub mod observability;
pub mod settlement;
pub mod store;
pub mod types;

// Payment id the gateway uses for its synthetic webhook test notification
pub const SYNTHETIC_WEBHOOK_PAYMENT_ID: &str = "123456";
