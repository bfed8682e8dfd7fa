//! Reference-id based idempotency.
//!
//! Best-effort read-then-act: the check holds no lock, so two concurrent
//! requests with the same reference id can both pass it and both insert.
//! Callers wanting a hard guarantee need a store-level constraint; this
//! core documents the race instead of hiding it.

use sqlx::PgPool;

use crate::db::models::TransactionRow;
use crate::db::queries;
use crate::domain::TransactionStatus;
use crate::error::AppError;

#[derive(Debug)]
pub enum Resolution {
    /// A prior transaction under this reference is still active (or already
    /// succeeded); return its view instead of creating a duplicate.
    Reuse(Box<TransactionRow>),
    /// No usable prior transaction; create a new one.
    Proceed,
}

#[derive(Clone)]
pub struct IdempotencyResolver {
    pool: PgPool,
}

impl IdempotencyResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn resolve(&self, reference_id: &str) -> Result<Resolution, AppError> {
        let prior = queries::find_latest_by_reference(&self.pool, reference_id).await?;

        match prior {
            Some(tx) => {
                let status = tx
                    .status
                    .parse::<TransactionStatus>()
                    .map_err(AppError::Internal)?;
                if status.blocks_duplicate() {
                    tracing::info!(
                        reference_id,
                        transaction_id = %tx.transaction_id,
                        status = %status,
                        "reusing existing transaction for reference"
                    );
                    Ok(Resolution::Reuse(Box::new(tx)))
                } else {
                    // FAILED or EXPIRED: the caller gets a fresh attempt.
                    Ok(Resolution::Proceed)
                }
            }
            None => Ok(Resolution::Proceed),
        }
    }
}
