//! Event kinds attached at dispatch time

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::telemetry::TelemetryEventType;

/// Lifecycle change a hearing event represents.
///
/// Not carried in the payload; the ingress route decides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Update,
    Result,
    Delete,
}

impl EventKind {
    /// Telemetry label recorded for this kind
    pub fn telemetry_event_type(self) -> TelemetryEventType {
        match self {
            EventKind::Update => TelemetryEventType::CourtHearingUpdateEventReceived,
            EventKind::Result => TelemetryEventType::CourtHearingResultEventReceived,
            EventKind::Delete => TelemetryEventType::CourtHearingDeleteEventReceived,
        }
    }

    /// `messageType` routing token for published messages.
    ///
    /// Deletes have no publish contract and so no token.
    pub fn message_type(self) -> Option<&'static str> {
        match self {
            EventKind::Update => Some("COMMON_PLATFORM_HEARING"),
            EventKind::Result => Some("COMMON_PLATFORM_HEARING_RESULT"),
            EventKind::Delete => None,
        }
    }

    pub fn is_publishable(self) -> bool {
        self.message_type().is_some()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Update => write!(f, "update"),
            EventKind::Result => write!(f, "result"),
            EventKind::Delete => write!(f, "delete"),
        }
    }
}
