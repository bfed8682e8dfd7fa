//! Transaction domain entity.
//! Framework-agnostic representation of a payment transaction.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db::models::TransactionRow;
use crate::domain::status::TransactionStatus;

/// Every transaction expires this long after creation. Fixed policy.
pub const EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_id: String,
    pub reference_id: Option<String>,
    pub partner_id: Uuid,
    pub payment_method_id: Uuid,
    pub amount: f64,
    pub fee: f64,
    pub net_amount: f64,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
}

impl NewTransaction {
    /// Row id, PENDING status, timestamps and the 24h expiry are stamped
    /// here; everything else comes from the orchestrator.
    pub fn into_row(self) -> TransactionRow {
        let now = Utc::now();
        TransactionRow {
            id: Uuid::new_v4(),
            transaction_id: self.transaction_id,
            reference_id: self.reference_id,
            partner_id: self.partner_id,
            payment_method_id: self.payment_method_id,
            amount: self.amount,
            fee: self.fee,
            net_amount: self.net_amount,
            status: TransactionStatus::Pending.as_str().to_string(),
            customer_email: self.customer_email,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            description: self.description,
            partner_transaction_id: None,
            payment_url: None,
            virtual_account: None,
            qr_data: None,
            payment_data: None,
            expires_at: now + Duration::hours(EXPIRY_HOURS),
            settled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewTransaction {
        NewTransaction {
            transaction_id: "TRX1700000000000ABCDEF".to_string(),
            reference_id: Some("ORDER-1".to_string()),
            partner_id: Uuid::new_v4(),
            payment_method_id: Uuid::new_v4(),
            amount: 50000.0,
            fee: 2750.0,
            net_amount: 47250.0,
            customer_email: Some("a@b.com".to_string()),
            customer_name: Some("A".to_string()),
            customer_phone: None,
            description: None,
        }
    }

    #[test]
    fn test_new_transaction_starts_pending() {
        let row = sample().into_row();
        assert_eq!(row.status, "PENDING");
        assert!(row.settled_at.is_none());
        assert!(row.payment_url.is_none());
    }

    #[test]
    fn test_expiry_is_24_hours_from_creation() {
        let row = sample().into_row();
        let expiry = row.expires_at - row.created_at;
        assert_eq!(expiry.num_hours(), EXPIRY_HOURS);
    }
}
