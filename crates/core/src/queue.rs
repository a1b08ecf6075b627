//! Queue status state machine, counter selection and wait estimation.
//!
//! Everything here is pure so the repository layer can call it from inside
//! a transaction and the HTTP layer can call it when building responses.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Average minutes a counter needs per customer.
pub const DEFAULT_AVG_SERVICE_MINUTES: i32 = 2;

/// Customers at or below this waiting position get an "almost your turn" notice.
pub const DEFAULT_NOTIFY_AHEAD: i32 = 3;

/// Position stored for entries that are no longer in a waiting set.
pub const NOT_WAITING_POSITION: i32 = 0;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Queue entry status IDs matching `queue_entry_statuses` seed data.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting = 1,
    Called = 2,
    Served = 3,
}

impl QueueStatus {
    /// Return the database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    /// Resolve a database status ID. Unknown IDs return `None`.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Waiting),
            2 => Some(Self::Called),
            3 => Some(Self::Served),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Called => "called",
            Self::Served => "served",
        }
    }

    /// Waiting and called entries still occupy the counter.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Waiting | Self::Called)
    }
}

pub mod state_machine {
    use super::QueueStatus;

    /// Statuses reachable from `from`. `Served` is terminal.
    pub fn valid_transitions(from: QueueStatus) -> &'static [QueueStatus] {
        match from {
            QueueStatus::Waiting => &[QueueStatus::Called, QueueStatus::Served],
            QueueStatus::Called => &[QueueStatus::Served],
            QueueStatus::Served => &[],
        }
    }

    pub fn can_transition(from: QueueStatus, to: QueueStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a transition, returning a human-readable message for invalid ones.
    pub fn validate_transition(from: QueueStatus, to: QueueStatus) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!(
                "Invalid transition: {} -> {}",
                from.name(),
                to.name()
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Counter selection
// ---------------------------------------------------------------------------

/// Number of waiting entries at one active counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterLoad {
    pub counter_id: DbId,
    pub counter_number: i32,
    pub waiting: i64,
}

/// Pick the counter with the shortest waiting line.
///
/// Ties go to the lowest counter number. Returns `None` for an empty slice.
pub fn select_shortest_counter(loads: &[CounterLoad]) -> Option<&CounterLoad> {
    loads
        .iter()
        .min_by_key(|load| (load.waiting, load.counter_number))
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// Tunables for wait estimates and proximity notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    pub avg_service_minutes: i32,
    pub notify_ahead: i32,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            avg_service_minutes: DEFAULT_AVG_SERVICE_MINUTES,
            notify_ahead: DEFAULT_NOTIFY_AHEAD,
        }
    }
}

/// Estimated minutes until a customer at `position` is served.
pub fn estimate_wait_minutes(position: i32, settings: &QueueSettings) -> i32 {
    position.max(0) * settings.avg_service_minutes
}

/// Number of waiting customers in front of `position`.
pub fn people_ahead(position: i32) -> i32 {
    (position - 1).max(0)
}

/// Whether a customer should be told to get ready.
pub fn is_almost_turn(status: QueueStatus, position: i32, settings: &QueueSettings) -> bool {
    status == QueueStatus::Waiting
        && position > NOT_WAITING_POSITION
        && position <= settings.notify_ahead
}
