use crate::config::gateway::GatewayConfig;
use crate::error::{Error, Result};
use crate::interfaces::payment_gateway::{
    ChargeRequest, GatewayPayment, PaymentGateway, PaymentStatus, PixCharge,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub struct MercadoPago {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MercadoPago {
    pub fn new(config: &GatewayConfig) -> Self {
        MercadoPago {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }
}

#[derive(Serialize)]
struct CreatePaymentBody<'a> {
    transaction_amount: f64,
    description: &'a str,
    payment_method_id: &'a str,
    external_reference: &'a str,
    payer: PayerBody<'a>,
}

#[derive(Serialize)]
struct PayerBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    identification: IdentificationBody<'a>,
}

#[derive(Serialize)]
struct IdentificationBody<'a> {
    #[serde(rename = "type")]
    id_type: &'a str,
    number: &'a str,
}

#[derive(Deserialize)]
struct PaymentResponse {
    id: serde_json::Number,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    external_reference: Option<String>,
    #[serde(default)]
    point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Deserialize)]
struct PointOfInteraction {
    transaction_data: Option<TransactionData>,
}

#[derive(Deserialize)]
struct TransactionData {
    qr_code: Option<String>,
    qr_code_base64: Option<String>,
}

fn parse_status(status: &str) -> PaymentStatus {
    match status {
        "approved" => PaymentStatus::Approved,
        "rejected" | "cancelled" | "refunded" | "charged_back" => PaymentStatus::Rejected,
        "pending" | "in_process" | "authorized" => PaymentStatus::Pending,
        other => PaymentStatus::Other(other.to_string()),
    }
}

#[async_trait]
impl PaymentGateway for MercadoPago {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<PixCharge> {
        let body = CreatePaymentBody {
            transaction_amount: request.amount.to_reais(),
            description: &request.description,
            payment_method_id: "pix",
            external_reference: &request.external_reference,
            payer: PayerBody {
                first_name: &request.payer.first_name,
                last_name: &request.payer.last_name,
                identification: IdentificationBody {
                    id_type: "CPF",
                    number: &request.payer.cpf,
                },
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/payments", self.base_url))
            .bearer_auth(&self.access_token)
            .header("X-Idempotency-Key", &request.idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::GatewayError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::GatewayError(format!(
                "charge creation failed ({}): {}",
                status, detail
            )));
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| Error::GatewayError(e.to_string()))?;

        let transaction_data = payment
            .point_of_interaction
            .and_then(|p| p.transaction_data)
            .ok_or_else(|| Error::GatewayError("missing PIX transaction data".to_string()))?;

        Ok(PixCharge {
            payment_id: payment.id.to_string(),
            qr_code: transaction_data.qr_code.unwrap_or_default(),
            qr_code_base64: transaction_data.qr_code_base64.unwrap_or_default(),
        })
    }

    async fn payment_status(&self, payment_id: &str) -> Result<GatewayPayment> {
        let response = self
            .http
            .get(format!("{}/v1/payments/{}", self.base_url, payment_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::GatewayError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::GatewayError(format!(
                "payment lookup failed ({})",
                response.status()
            )));
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| Error::GatewayError(e.to_string()))?;

        let status = payment
            .status
            .as_deref()
            .map(parse_status)
            .ok_or_else(|| Error::GatewayError("payment response missing status".to_string()))?;

        Ok(GatewayPayment {
            payment_id: payment.id.to_string(),
            status,
            external_reference: payment.external_reference,
        })
    }
}
