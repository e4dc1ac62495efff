//! Credit award engine.
//!
//! The one piece of genuine behavioural logic in the system: a pure policy
//! mapping report status transitions to credit bonuses. Persistence adapters
//! dispatch a [`StatusTransition`] to this policy inside the same storage
//! transaction that applies the status change, so a status update and its
//! bonus are committed or rolled back together.
//!
//! The policy is stateless per report: oscillating back into `VERIFIED`
//! awards the bonus again. That mirrors the deployed behaviour and is kept
//! deliberately (see DESIGN.md); any dedupe would need per-report award
//! memory this schema does not carry.

use super::report::ReportStatus;

/// Base award recorded on every report at creation.
///
/// Bookkeeping only: the base value sits on the report row and is never
/// transferred to the owner's balance.
pub const BASE_AWARD: i32 = 5;

/// Bonus credited to the owner when a report transitions into `VERIFIED`.
pub const VERIFIED_BONUS: i32 = 10;

/// Bonus credited to the owner when a report transitions into `COMPLETED`.
pub const COMPLETED_BONUS: i32 = 5;

/// A report status mutation, tagged by whether the status actually changed.
///
/// An update that rewrites other fields but leaves the status alone is
/// [`StatusTransition::Unchanged`] and never awards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// The new status equals the old one.
    Unchanged(ReportStatus),
    /// The status moved from one value to a different one.
    Changed {
        from: ReportStatus,
        to: ReportStatus,
    },
}

impl StatusTransition {
    /// Classify a status update as changed or unchanged.
    pub fn classify(from: ReportStatus, to: ReportStatus) -> Self {
        if from == to {
            Self::Unchanged(from)
        } else {
            Self::Changed { from, to }
        }
    }

    /// The status in effect after the update.
    pub const fn resulting_status(self) -> ReportStatus {
        match self {
            Self::Unchanged(status) | Self::Changed { to: status, .. } => status,
        }
    }
}

/// Bonus owed to the report owner for a status transition.
///
/// Fires exactly once per qualifying transition: only a change of status
/// qualifies, and only transitions *into* `VERIFIED` or `COMPLETED` carry a
/// bonus. Everything else (including no-op updates) awards nothing.
pub const fn bonus_for(transition: StatusTransition) -> i32 {
    match transition {
        StatusTransition::Unchanged(_) => 0,
        StatusTransition::Changed { to, .. } => match to {
            ReportStatus::Verified => VERIFIED_BONUS,
            ReportStatus::Completed => COMPLETED_BONUS,
            ReportStatus::Pending | ReportStatus::Rejected | ReportStatus::InProgress => 0,
        },
    }
}
