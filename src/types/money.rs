use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BrlAmount(i64); // Centavos, to keep currency math exact

impl BrlAmount {
    pub fn from_centavos(value: i64) -> Self {
        BrlAmount(value)
    }

    pub fn to_centavos(&self) -> i64 {
        self.0
    }

    /// Parse a decimal BRL amount as received from API callers.
    pub fn from_reais(value: f64) -> Self {
        BrlAmount((value * 100.0).round() as i64)
    }

    /// Decimal BRL value as expected by the payment gateway wire format.
    pub fn to_reais(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn zero() -> Self {
        BrlAmount(0)
    }
}

impl Add for BrlAmount {
    type Output = BrlAmount;
    fn add(self, other: BrlAmount) -> BrlAmount {
        BrlAmount(self.0 + other.0)
    }
}

impl Sub for BrlAmount {
    type Output = BrlAmount;
    fn sub(self, other: BrlAmount) -> BrlAmount {
        BrlAmount(self.0 - other.0)
    }
}

impl fmt::Display for BrlAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}
