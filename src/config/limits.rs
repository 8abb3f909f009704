use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LimitsConfig {
    pub earn_cooldown_secs: u64,
    pub ip_user_ceiling: usize,
    pub ip_window_hours: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            earn_cooldown_secs: 60,
            ip_user_ceiling: 4,
            ip_window_hours: 24,
        }
    }
}

impl LimitsConfig {
    pub fn earn_cooldown(&self) -> Duration {
        Duration::from_secs(self.earn_cooldown_secs)
    }

    pub fn ip_window(&self) -> Duration {
        Duration::from_secs(self.ip_window_hours * 3600)
    }
}
