use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies Mercado Pago webhook signatures. The gateway sends
/// `x-signature: ts=<unix>,v1=<hex hmac>` where the HMAC-SHA256 is taken
/// over `id:<data.id>;request-id:<x-request-id>;ts:<ts>;` with the shared
/// webhook secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Self {
        WebhookVerifier {
            secret: secret.to_string(),
        }
    }

    pub fn verify(&self, signature_header: &str, request_id: &str, data_id: &str) -> Result<()> {
        let (ts, v1) = parse_signature_header(signature_header)?;

        let manifest = format!("id:{};request-id:{};ts:{};", data_id, request_id, ts);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::GatewayError(e.to_string()))?;
        mac.update(manifest.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        if !expected.eq_ignore_ascii_case(&v1) {
            return Err(Error::InvalidWebhookSignature);
        }
        Ok(())
    }
}

fn parse_signature_header(header: &str) -> Result<(String, String)> {
    let mut ts = None;
    let mut v1 = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("ts", value)) => ts = Some(value.to_string()),
            Some(("v1", value)) => v1 = Some(value.to_string()),
            _ => {}
        }
    }

    match (ts, v1) {
        (Some(ts), Some(v1)) => Ok((ts, v1)),
        _ => Err(Error::InvalidWebhookSignature),
    }
}
