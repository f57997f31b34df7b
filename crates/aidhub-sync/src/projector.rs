//! Incremental dashboard counters with refetch-wins reconciliation.

use aidhub_entity::aid_request::AidStatus;
use aidhub_entity::ledger::DashboardStats;

/// Projects dashboard counters from two sources that must agree: individual
/// events adjust the values between refreshes, and every authoritative
/// block (pushed aggregate or periodic refetch) overwrites them outright.
///
/// A missed or out-of-order event can therefore skew a counter for at most
/// one refresh interval.
#[derive(Debug, Clone, Default)]
pub struct StatsProjector {
    stats: DashboardStats,
    unread: u64,
}

impl StatsProjector {
    /// Create a projector with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current aggregate block.
    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    /// Current unread count.
    pub fn unread(&self) -> u64 {
        self.unread
    }

    /// A new unread notification arrived for this session's user.
    pub fn note_new_unread(&mut self) {
        self.unread += 1;
    }

    /// This session's user read a notification.
    pub fn note_read(&mut self) {
        self.unread = self.unread.saturating_sub(1);
    }

    /// A request moved between statuses.
    ///
    /// `old` is `None` for a request this session had not seen before.
    pub fn note_status_change(&mut self, old: Option<AidStatus>, new: AidStatus) {
        self.stats.apply_status_change(old, new);
    }

    /// Overwrite the aggregate block with an authoritative one.
    ///
    /// Used for both the pushed aggregate broadcast and the periodic
    /// refetch; the authoritative value always wins over whatever the
    /// incremental adjustments produced.
    pub fn set_aggregates(&mut self, stats: DashboardStats) {
        self.stats = stats;
    }

    /// Overwrite the unread count with a recomputed authoritative value.
    pub fn set_unread(&mut self, unread: u64) {
        self.unread = unread;
    }
}
