use axum::{
    Json,
    extract::{Path, State},
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;
use crate::db::queries;
use crate::domain::TransactionStatus;
use crate::error::AppError;
use crate::services::orchestrator::CustomerData;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub payment_method: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
    pub reference_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatusUpdateRequest {
    pub transaction_id: String,
    pub status: String,
}

pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_payment_request(&request)?;

    let customer = CustomerData {
        email: request.customer_email,
        name: request.customer_name,
        phone: request.customer_phone,
        description: request.description,
        reference_id: request.reference_id,
    };

    let result = state
        .orchestrator
        .create_payment(request.amount, &request.payment_method, customer)
        .await?;

    Ok(Json(json!({"success": true, "data": result})))
}

pub async fn check_status(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = state.orchestrator.check_status(&transaction_id).await?;
    Ok(Json(json!({"success": true, "data": view})))
}

pub async fn list_methods(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let methods = queries::list_active_methods(&state.db).await?;
    Ok(Json(json!({"success": true, "data": methods})))
}

/// Inbound status update from a partner or back-office tool.
pub async fn update_status(
    State(state): State<AppState>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = request
        .status
        .parse::<TransactionStatus>()
        .map_err(AppError::Validation)?;

    let view = state
        .orchestrator
        .update_status(&request.transaction_id, status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Payment status updated successfully",
        "data": view
    })))
}

/// Demo affordance: the link built-in e-wallet payments point at. Drives
/// the transaction to SUCCESS and renders a minimal confirmation page.
/// Re-opening the link after settlement renders the same page again.
pub async fn simulate_success(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = state.orchestrator.check_status(&transaction_id).await?;
    if view.status != TransactionStatus::Success.as_str() {
        state
            .orchestrator
            .update_status(&transaction_id, TransactionStatus::Success)
            .await?;
    }

    Ok(Html(format!(
        "<html><body style=\"font-family: sans-serif; text-align: center; padding: 50px;\">\
         <h1>Payment complete</h1>\
         <p>Transaction <strong>{}</strong> has been settled.</p>\
         <p>Status: <strong>SUCCESS</strong></p>\
         </body></html>",
        transaction_id
    )))
}
