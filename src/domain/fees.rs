//! Fee calculation.
//! Pure arithmetic over an amount and a partner fee structure.

use serde::{Deserialize, Serialize};

/// Partner fee configuration, stored as JSONB on the partner row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeStructure {
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub fixed: f64,
    #[serde(default)]
    pub cap: Option<f64>,
}

impl Default for FeeStructure {
    /// Fallback applied when a partner carries no fee configuration.
    fn default() -> Self {
        Self {
            percentage: 1.5,
            fixed: 2000.0,
            cap: Some(10000.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeBreakdown {
    pub fee: f64,
    pub net_amount: f64,
}

/// `fee = min(fixed + amount * percentage / 100, cap)`, uncapped when `cap`
/// is absent. The caller validates `amount > 0` before this stage.
pub fn compute_fee(amount: f64, structure: &FeeStructure) -> FeeBreakdown {
    let raw = structure.fixed + amount * structure.percentage / 100.0;
    let fee = match structure.cap {
        Some(cap) => raw.min(cap),
        None => raw,
    };

    FeeBreakdown {
        fee,
        net_amount: amount - fee,
    }
}
