//! # aidhub-core
//!
//! Core crate for AidHub. Contains configuration schemas, typed
//! identifiers, the loose-equality user reference, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other AidHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
