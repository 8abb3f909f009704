use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub access_token: String,
    pub webhook_secret: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            base_url: "https://api.mercadopago.com".to_string(),
            access_token: String::new(),
            webhook_secret: String::new(),
        }
    }
}
