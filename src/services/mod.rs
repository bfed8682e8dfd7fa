pub mod idempotency;
pub mod orchestrator;
pub mod partner;
pub mod retry;
pub mod webhook;
