//! Aid request lifecycle operations and the disbursement guard.

pub mod guard;
pub mod service;

pub use guard::{DisbursementGuard, FundsDecision};
pub use service::AidRequestService;
