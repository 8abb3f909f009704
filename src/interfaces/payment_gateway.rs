use crate::error::Result;
use crate::types::money::BrlAmount;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct Payer {
    pub first_name: String,
    pub last_name: String,
    pub cpf: String,
}

#[derive(Clone, Debug)]
pub struct ChargeRequest {
    /// Correlation id threaded through the gateway so webhook notifications
    /// can be matched back to the pending deposit.
    pub external_reference: String,
    /// Guards against duplicate charge creation when the request is retried.
    pub idempotency_key: String,
    pub amount: BrlAmount,
    pub payer: Payer,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct PixCharge {
    pub payment_id: String,
    pub qr_code: String,
    pub qr_code_base64: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentStatus {
    Approved,
    Rejected,
    Pending,
    Other(String),
}

#[derive(Clone, Debug)]
pub struct GatewayPayment {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub external_reference: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a PIX charge and return its copy-paste and base64 QR codes.
    async fn create_charge(&self, request: &ChargeRequest) -> Result<PixCharge>;

    /// Fetch the authoritative status of a payment. Webhook payloads are
    /// never trusted for status; callers re-fetch through this.
    async fn payment_status(&self, payment_id: &str) -> Result<GatewayPayment>;
}
