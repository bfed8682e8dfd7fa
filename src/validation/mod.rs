//! Request validation boundary. Everything here runs before orchestration;
//! the orchestrator assumes a well-formed request.

use crate::error::AppError;
use crate::handlers::payments::PaymentRequest;

pub fn validate_payment_request(request: &PaymentRequest) -> Result<(), AppError> {
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(AppError::Validation(
            "amount must be a positive number".to_string(),
        ));
    }

    if request.payment_method.trim().is_empty() {
        return Err(AppError::Validation(
            "payment_method is required".to_string(),
        ));
    }

    if let Some(email) = request.customer_email.as_deref() {
        if !is_plausible_email(email) {
            return Err(AppError::Validation(format!(
                "customer_email '{}' is not a valid email address",
                email
            )));
        }
    }

    Ok(())
}

/// Shape check only: one '@' with non-empty local part and a dotted domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}
