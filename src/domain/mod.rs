pub mod fees;
pub mod status;
pub mod transaction;

pub use fees::{FeeBreakdown, FeeStructure, compute_fee};
pub use status::TransactionStatus;
