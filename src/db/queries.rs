use chrono::{DateTime, Utc};
use sqlx::{PgPool, Result};

use crate::db::models::{MethodListing, MethodWithPartner, TransactionRow, TransactionView};

// --- Payment method queries ---

/// Resolve an active payment method by caller-facing code, joined with its
/// partner. Inactive methods and inactive partners are invisible here.
pub async fn find_active_method(pool: &PgPool, code: &str) -> Result<Option<MethodWithPartner>> {
    sqlx::query_as::<_, MethodWithPartner>(
        r#"
        SELECT
            m.id AS method_id,
            m.code AS method_code,
            m.name AS method_name,
            p.id AS partner_id,
            p.code AS partner_code,
            p.name AS partner_name,
            p.kind AS partner_kind,
            p.credentials,
            p.fee_structure,
            p.mapping_schema
        FROM payment_methods m
        JOIN payment_partners p ON p.id = m.partner_id
        WHERE m.code = $1 AND m.is_active = TRUE AND p.status = 'ACTIVE'
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await
}

pub async fn list_active_methods(pool: &PgPool) -> Result<Vec<MethodListing>> {
    sqlx::query_as::<_, MethodListing>(
        r#"
        SELECT
            m.code,
            m.name,
            p.name AS partner_name,
            p.code AS partner_code,
            p.fee_structure,
            m.ordering
        FROM payment_methods m
        JOIN payment_partners p ON p.id = m.partner_id
        WHERE m.is_active = TRUE AND p.status = 'ACTIVE'
        ORDER BY m.ordering
        "#,
    )
    .fetch_all(pool)
    .await
}

// --- Transaction queries ---

pub async fn insert_transaction(pool: &PgPool, tx: &TransactionRow) -> Result<TransactionRow> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO transactions (
            id, transaction_id, reference_id, partner_id, payment_method_id,
            amount, fee, net_amount, status,
            customer_email, customer_name, customer_phone, description,
            expires_at, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING *
        "#,
    )
    .bind(tx.id)
    .bind(&tx.transaction_id)
    .bind(&tx.reference_id)
    .bind(tx.partner_id)
    .bind(tx.payment_method_id)
    .bind(tx.amount)
    .bind(tx.fee)
    .bind(tx.net_amount)
    .bind(&tx.status)
    .bind(&tx.customer_email)
    .bind(&tx.customer_name)
    .bind(&tx.customer_phone)
    .bind(&tx.description)
    .bind(tx.expires_at)
    .bind(tx.created_at)
    .bind(tx.updated_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_transaction_id(
    pool: &PgPool,
    transaction_id: &str,
) -> Result<Option<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE transaction_id = $1")
        .bind(transaction_id)
        .fetch_optional(pool)
        .await
}

/// Most recent transaction under a caller-supplied reference id. Latest
/// `created_at` wins; ties fall back to insertion order via ctid.
pub async fn find_latest_by_reference(
    pool: &PgPool,
    reference_id: &str,
) -> Result<Option<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT * FROM transactions
        WHERE reference_id = $1
        ORDER BY created_at DESC, ctid DESC
        LIMIT 1
        "#,
    )
    .bind(reference_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_view_by_transaction_id(
    pool: &PgPool,
    transaction_id: &str,
) -> Result<Option<TransactionView>> {
    sqlx::query_as::<_, TransactionView>(
        r#"
        SELECT
            t.transaction_id, t.reference_id,
            t.amount, t.fee, t.net_amount, t.status,
            t.customer_email, t.customer_name, t.description,
            t.partner_transaction_id, t.payment_url, t.virtual_account, t.qr_data,
            t.expires_at, t.settled_at, t.created_at, t.updated_at,
            p.code AS partner_code,
            p.name AS partner_name,
            p.kind AS partner_kind
        FROM transactions t
        JOIN payment_partners p ON p.id = t.partner_id
        WHERE t.transaction_id = $1
        "#,
    )
    .bind(transaction_id)
    .fetch_optional(pool)
    .await
}

/// Second write of the create flow: attach partner-derived payment
/// affordances and move the transaction out of PENDING.
pub async fn update_payment_data(
    pool: &PgPool,
    transaction_id: &str,
    status: &str,
    partner_transaction_id: Option<&str>,
    payment_url: Option<&str>,
    virtual_account: Option<&str>,
    qr_data: Option<&str>,
    payment_data: &serde_json::Value,
) -> Result<TransactionRow> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        UPDATE transactions SET
            status = $2,
            partner_transaction_id = $3,
            payment_url = $4,
            virtual_account = $5,
            qr_data = $6,
            payment_data = $7,
            updated_at = NOW()
        WHERE transaction_id = $1
        RETURNING *
        "#,
    )
    .bind(transaction_id)
    .bind(status)
    .bind(partner_transaction_id)
    .bind(payment_url)
    .bind(virtual_account)
    .bind(qr_data)
    .bind(payment_data)
    .fetch_one(pool)
    .await
}

pub async fn update_status(
    pool: &PgPool,
    transaction_id: &str,
    status: &str,
    settled_at: Option<DateTime<Utc>>,
) -> Result<TransactionRow> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        UPDATE transactions SET
            status = $2,
            settled_at = COALESCE($3, settled_at),
            updated_at = NOW()
        WHERE transaction_id = $1
        RETURNING *
        "#,
    )
    .bind(transaction_id)
    .bind(status)
    .bind(settled_at)
    .fetch_one(pool)
    .await
}
