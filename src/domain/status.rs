//! Transaction status lifecycle.
//!
//! ```text
//! PENDING --(partner call succeeds)--> PROCESSING
//! PENDING --(partner call fails)-----> FAILED
//! PROCESSING --(external update)-----> SUCCESS | FAILED | EXPIRED
//! ```
//! SUCCESS, FAILED and EXPIRED are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Expired,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Processing => "PROCESSING",
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Expired => "EXPIRED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Success | TransactionStatus::Failed | TransactionStatus::Expired
        )
    }

    /// An active transaction blocks creation of a duplicate under the same
    /// reference id. SUCCESS counts: the payment already went through.
    pub fn blocks_duplicate(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Pending | TransactionStatus::Processing | TransactionStatus::Success
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "PROCESSING" => Ok(TransactionStatus::Processing),
            "SUCCESS" => Ok(TransactionStatus::Success),
            "FAILED" => Ok(TransactionStatus::Failed),
            "EXPIRED" => Ok(TransactionStatus::Expired),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}
