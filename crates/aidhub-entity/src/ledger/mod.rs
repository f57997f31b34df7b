//! Pooled fund and inventory snapshots, and derived dashboard counters.

pub mod pool;
pub mod stats;

pub use pool::{EssentialsInventory, FundPool, ItemStock};
pub use stats::DashboardStats;
