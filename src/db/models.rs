use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Payment method joined with its owning partner, as needed to orchestrate
/// a payment in one lookup.
#[derive(Debug, Clone, FromRow)]
pub struct MethodWithPartner {
    pub method_id: Uuid,
    pub method_code: String,
    pub method_name: String,
    pub partner_id: Uuid,
    pub partner_code: String,
    pub partner_name: String,
    pub partner_kind: String,
    pub credentials: serde_json::Value,
    pub fee_structure: Option<serde_json::Value>,
    pub mapping_schema: Option<serde_json::Value>,
}

/// Caller-facing listing entry for `GET /api/payments/methods`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MethodListing {
    pub code: String,
    pub name: String,
    pub partner_name: String,
    pub partner_code: String,
    pub fee_structure: Option<serde_json::Value>,
    pub ordering: i32,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: Uuid,
    pub transaction_id: String,
    pub reference_id: Option<String>,
    pub partner_id: Uuid,
    pub payment_method_id: Uuid,
    pub amount: f64,
    pub fee: f64,
    pub net_amount: f64,
    pub status: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
    pub partner_transaction_id: Option<String>,
    pub payment_url: Option<String>,
    pub virtual_account: Option<String>,
    pub qr_data: Option<String>,
    pub payment_data: Option<serde_json::Value>,
    pub expires_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transaction joined with partner identity, returned by status checks.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionView {
    pub transaction_id: String,
    pub reference_id: Option<String>,
    pub amount: f64,
    pub fee: f64,
    pub net_amount: f64,
    pub status: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub description: Option<String>,
    pub partner_transaction_id: Option<String>,
    pub payment_url: Option<String>,
    pub virtual_account: Option<String>,
    pub qr_data: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub partner_code: String,
    pub partner_name: String,
    pub partner_kind: String,
}
