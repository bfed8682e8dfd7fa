//! Payment orchestration: composes the fee calculator, idempotency
//! resolver, mapping engine and webhook dispatcher into the three public
//! operations of this core.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::db::models::{MethodWithPartner, TransactionView};
use crate::db::queries;
use crate::domain::{FeeStructure, TransactionStatus, compute_fee};
use crate::domain::transaction::NewTransaction;
use crate::error::AppError;
use crate::services::idempotency::{IdempotencyResolver, Resolution};
use crate::services::partner::{self, PartnerContext, PartnerKind, PaymentAffordances};
use crate::services::retry::RetryPolicy;
use crate::services::webhook::WebhookDispatcher;

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerData {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub reference_id: Option<String>,
}

/// Normalized result of `create_payment`, identical for fresh and reused
/// transactions apart from `is_existing`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResult {
    pub transaction_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub status: String,
    pub is_existing: bool,
}

#[derive(Clone)]
pub struct PaymentOrchestrator {
    pool: PgPool,
    http: reqwest::Client,
    webhooks: WebhookDispatcher,
    idempotency: IdempotencyResolver,
    partner_retry: RetryPolicy,
    public_base_url: String,
}

impl PaymentOrchestrator {
    pub fn new(
        pool: PgPool,
        webhooks: WebhookDispatcher,
        public_base_url: String,
        partner_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(partner_timeout).build()?;
        Ok(Self {
            idempotency: IdempotencyResolver::new(pool.clone()),
            pool,
            http,
            webhooks,
            partner_retry: RetryPolicy::new(3, Duration::from_millis(250)),
            public_base_url,
        })
    }

    /// `TRX` + unix millis + 8 chars of uuid entropy. Uniqueness matters
    /// here, the encoding does not.
    fn generate_transaction_id() -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "TRX{}{}",
            Utc::now().timestamp_millis(),
            suffix[..8].to_uppercase()
        )
    }

    pub async fn create_payment(
        &self,
        amount: f64,
        payment_method_code: &str,
        customer: CustomerData,
    ) -> Result<PaymentResult, AppError> {
        // Idempotency short-circuit before any writes.
        if let Some(reference_id) = customer.reference_id.as_deref() {
            if let Resolution::Reuse(existing) = self.idempotency.resolve(reference_id).await? {
                let instructions = existing
                    .payment_data
                    .as_ref()
                    .and_then(|d| d.get("instructions"))
                    .and_then(|v| serde_json::from_value(v.clone()).ok());
                return Ok(PaymentResult {
                    transaction_id: existing.transaction_id,
                    amount: existing.amount,
                    payment_url: existing.payment_url,
                    virtual_account: existing.virtual_account,
                    qr_data: existing.qr_data,
                    instructions,
                    expires_at: existing.expires_at,
                    status: existing.status,
                    is_existing: true,
                });
            }
        }

        let method = queries::find_active_method(&self.pool, payment_method_code)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Payment method {} not found", payment_method_code))
            })?;

        let fee_structure = match method.fee_structure.as_ref() {
            Some(raw) => match serde_json::from_value::<FeeStructure>(raw.clone()) {
                Ok(structure) => structure,
                Err(e) => {
                    tracing::warn!(
                        partner = %method.partner_code,
                        error = %e,
                        "malformed fee_structure, billing at default rates"
                    );
                    FeeStructure::default()
                }
            },
            None => FeeStructure::default(),
        };
        let breakdown = compute_fee(amount, &fee_structure);

        let transaction_id = Self::generate_transaction_id();
        let row = NewTransaction {
            transaction_id: transaction_id.clone(),
            reference_id: customer.reference_id.clone(),
            partner_id: method.partner_id,
            payment_method_id: method.method_id,
            amount,
            fee: breakdown.fee,
            net_amount: breakdown.net_amount,
            customer_email: customer.email.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            description: customer.description.clone(),
        }
        .into_row();
        let pending = queries::insert_transaction(&self.pool, &row).await?;

        tracing::info!(
            transaction_id = %transaction_id,
            method = payment_method_code,
            partner = %method.partner_code,
            amount,
            fee = breakdown.fee,
            "transaction created"
        );

        let affordances = self
            .generate_affordances(&method, &transaction_id, amount, &customer)
            .await;

        let affordances = match affordances {
            Ok(a) => a,
            Err(e) => {
                // Converge to a terminal, queryable state before surfacing
                // the partner failure.
                let error_data = json!({"error": e.to_string()});
                queries::update_payment_data(
                    &self.pool,
                    &transaction_id,
                    TransactionStatus::Failed.as_str(),
                    None,
                    None,
                    None,
                    None,
                    &error_data,
                )
                .await?;
                tracing::error!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "partner call failed, transaction marked FAILED"
                );
                return Err(e);
            }
        };

        let partner_transaction_id = affordances
            .partner_transaction_id
            .clone()
            .unwrap_or_else(|| format!("EXT-{}", transaction_id));
        let updated = queries::update_payment_data(
            &self.pool,
            &transaction_id,
            TransactionStatus::Processing.as_str(),
            Some(&partner_transaction_id),
            affordances.payment_url.as_deref(),
            affordances.virtual_account.as_deref(),
            affordances.qr_data.as_deref(),
            &affordances.raw,
        )
        .await?;

        Ok(PaymentResult {
            transaction_id: updated.transaction_id,
            amount: updated.amount,
            payment_url: updated.payment_url,
            virtual_account: updated.virtual_account,
            qr_data: updated.qr_data,
            instructions: affordances.instructions,
            expires_at: pending.expires_at,
            status: updated.status,
            is_existing: false,
        })
    }

    async fn generate_affordances(
        &self,
        method: &MethodWithPartner,
        transaction_id: &str,
        amount: f64,
        customer: &CustomerData,
    ) -> Result<PaymentAffordances, AppError> {
        let kind = PartnerKind::resolve(&method.partner_kind, method.mapping_schema.as_ref());

        match &kind {
            PartnerKind::Dynamic(schema) => {
                let context = self.mapping_context(method, transaction_id, amount, customer);
                partner::dynamic_affordances(&self.http, schema, &context, &self.partner_retry)
                    .await
            }
            built_in => {
                let ctx = PartnerContext {
                    transaction_id,
                    partner_code: &method.partner_code,
                    customer_name: customer.name.as_deref(),
                    public_base_url: &self.public_base_url,
                };
                Ok(partner::built_in_affordances(built_in, &ctx))
            }
        }
    }

    /// Context the mapping engine resolves `{{dot.path}}` placeholders
    /// against.
    fn mapping_context(
        &self,
        method: &MethodWithPartner,
        transaction_id: &str,
        amount: f64,
        customer: &CustomerData,
    ) -> Value {
        let description = customer
            .description
            .clone()
            .unwrap_or_else(|| format!("Payment for {}", transaction_id));

        json!({
            "transaction_id": transaction_id,
            "amount": amount.floor() as i64,
            "customer": {
                "email": customer.email,
                "name": customer.name,
                "phone": customer.phone,
            },
            "description": description,
            "credentials": method.credentials,
            "callback_url": format!("{}/api/payments/webhook", self.public_base_url),
            "return_url": format!("{}/api/payments/status/{}", self.public_base_url, transaction_id),
        })
    }

    pub async fn check_status(&self, transaction_id: &str) -> Result<TransactionView, AppError> {
        queries::find_view_by_transaction_id(&self.pool, transaction_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Transaction {} not found", transaction_id))
            })
    }

    /// Overwrite the status of a non-terminal transaction, stamping
    /// `settled_at` on the transition into SUCCESS, then notify the
    /// merchant asynchronously. Webhook failures never surface here.
    pub async fn update_status(
        &self,
        transaction_id: &str,
        new_status: TransactionStatus,
    ) -> Result<TransactionView, AppError> {
        let current = queries::find_by_transaction_id(&self.pool, transaction_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Transaction {} not found", transaction_id))
            })?;

        let current_status = current
            .status
            .parse::<TransactionStatus>()
            .map_err(AppError::Internal)?;
        if current_status.is_terminal() {
            return Err(AppError::Validation(format!(
                "Transaction {} is already {} and cannot change status",
                transaction_id, current_status
            )));
        }

        let settled_at = (new_status == TransactionStatus::Success).then(Utc::now);
        let updated =
            queries::update_status(&self.pool, transaction_id, new_status.as_str(), settled_at)
                .await?;

        tracing::info!(
            transaction_id,
            from = %current_status,
            to = %new_status,
            "transaction status updated"
        );

        self.webhooks
            .notify(transaction_id, new_status.as_str(), updated.updated_at);

        self.check_status(transaction_id).await
    }
}
