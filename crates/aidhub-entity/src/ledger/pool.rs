//! Fund pool and essentials inventory snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aid_request::RequestedItem;

/// Live state of the pooled financial contributions.
///
/// Amounts are in minor currency units. The pool is only ever mutated by
/// the ledger's atomic disburse; everything else reads a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundPool {
    /// Total contributed by donors.
    pub total_contributed: i64,
    /// Total already disbursed.
    pub total_disbursed: i64,
}

impl FundPool {
    /// Funds currently available for disbursement.
    pub fn available(&self) -> i64 {
        self.total_contributed - self.total_disbursed
    }

    /// Check whether the pool can cover the given amount in full.
    pub fn can_cover(&self, amount: i64) -> bool {
        amount <= self.available()
    }
}

/// Donated and distributed unit counts for one essentials item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStock {
    /// Units donated.
    pub donated_units: u32,
    /// Units already distributed.
    pub distributed_units: u32,
}

impl ItemStock {
    /// Units currently available.
    pub fn available_units(&self) -> u32 {
        self.donated_units.saturating_sub(self.distributed_units)
    }
}

/// Per-item inventory of donated essentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssentialsInventory {
    items: BTreeMap<String, ItemStock>,
}

impl EssentialsInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Available units for an item name (zero when unknown).
    pub fn available_units(&self, name: &str) -> u32 {
        self.items
            .get(name)
            .map(ItemStock::available_units)
            .unwrap_or(0)
    }

    /// Record a donation of units for an item.
    pub fn donate(&mut self, name: &str, units: u32) {
        self.items.entry(name.to_string()).or_default().donated_units += units;
    }

    /// Check whether every requested item/quantity pair is covered.
    pub fn covers(&self, requested: &[RequestedItem]) -> bool {
        requested
            .iter()
            .all(|item| item.quantity <= self.available_units(&item.name))
    }

    /// Distribute the requested items, all or nothing.
    ///
    /// Returns `false` and changes nothing when any line is short.
    pub fn distribute(&mut self, requested: &[RequestedItem]) -> bool {
        if !self.covers(requested) {
            return false;
        }
        for item in requested {
            if let Some(stock) = self.items.get_mut(&item.name) {
                stock.distributed_units += item.quantity;
            }
        }
        true
    }

    /// Return previously distributed units to the pool.
    ///
    /// Used to roll back a distribution whose status write lost a race.
    pub fn release(&mut self, requested: &[RequestedItem]) {
        for item in requested {
            if let Some(stock) = self.items.get_mut(&item.name) {
                stock.distributed_units = stock.distributed_units.saturating_sub(item.quantity);
            }
        }
    }

    /// Iterate over item names and their stock.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ItemStock)> {
        self.items.iter()
    }
}
