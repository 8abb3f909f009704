use crate::types::ids::UserId;
use crate::types::points::Points;
use crate::types::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub points: Points,
    pub total_earned: Points,
    pub last_credit_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    pub fn new(user_id: UserId) -> Self {
        let now = Timestamp::now();
        Account {
            user_id,
            points: Points::zero(),
            total_earned: Points::zero(),
            last_credit_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
