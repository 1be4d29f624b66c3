//! Telemetry emitter contract
//!
//! Every inbound hearing event is recorded here, whether or not it is relayed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named telemetry events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TelemetryEventType {
    CourtHearingUpdateEventReceived,
    CourtHearingResultEventReceived,
    CourtHearingDeleteEventReceived,
}

impl TelemetryEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            TelemetryEventType::CourtHearingUpdateEventReceived => {
                "COURT_HEARING_UPDATE_EVENT_RECEIVED"
            }
            TelemetryEventType::CourtHearingResultEventReceived => {
                "COURT_HEARING_RESULT_EVENT_RECEIVED"
            }
            TelemetryEventType::CourtHearingDeleteEventReceived => {
                "COURT_HEARING_DELETE_EVENT_RECEIVED"
            }
        }
    }
}

impl fmt::Display for TelemetryEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat property map; `None` values are recorded as null
pub type TelemetryProperties = BTreeMap<String, Option<String>>;

/// Sink for telemetry events.
///
/// Fire-and-forget: implementations own delivery, retries and failure
/// handling, and must never fail or block the caller.
#[cfg_attr(test, mockall::automock)]
pub trait TelemetryEmitter: Send + Sync {
    fn track_event(&self, event_type: TelemetryEventType, properties: TelemetryProperties);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_name_matches_label() {
        let json = serde_json::to_string(&TelemetryEventType::CourtHearingUpdateEventReceived).unwrap();
        assert_eq!(json, "\"COURT_HEARING_UPDATE_EVENT_RECEIVED\"");
        assert_eq!(
            TelemetryEventType::CourtHearingUpdateEventReceived.to_string(),
            "COURT_HEARING_UPDATE_EVENT_RECEIVED"
        );
    }
}
