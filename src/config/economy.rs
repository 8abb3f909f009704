use crate::types::money::BrlAmount;
use crate::types::points::Points;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EconomyConfig {
    pub points_per_real_deposit: i64,
    pub points_per_real_withdrawal: i64,
    pub min_withdraw_points: Points,
    /// Whether rejecting a pending withdrawal credits the reserved points
    /// back. The observed production behavior burns them at request time,
    /// so this defaults to false.
    pub refund_rejected_withdrawals: bool,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        EconomyConfig {
            points_per_real_deposit: 600,
            points_per_real_withdrawal: 700,
            min_withdraw_points: Points::from_i64(7000), // R$ 10.00
            refund_rejected_withdrawals: false,
        }
    }
}

impl EconomyConfig {
    /// Points awarded for a deposit: floor(amount_brl * points_per_real).
    pub fn points_for_deposit(&self, amount: BrlAmount) -> Points {
        Points::from_i64(amount.to_centavos() * self.points_per_real_deposit / 100)
    }

    /// BRL payout for a withdrawal: amount_points / points_per_real.
    pub fn brl_for_withdrawal(&self, points: Points) -> BrlAmount {
        BrlAmount::from_centavos(points.to_i64() * 100 / self.points_per_real_withdrawal)
    }
}
