use serde::{Deserialize, Serialize};

pub mod economy;
pub mod gateway;
pub mod limits;
pub mod loader;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}
