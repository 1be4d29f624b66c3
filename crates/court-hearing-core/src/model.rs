//! Hearing event payload types
//!
//! [`HearingEvent`] keeps the JSON document it was parsed from and writes
//! that document back out unchanged, so a relayed body carries explicit
//! nulls, absent members and values the typed view does not model. The typed
//! structs below are a read-only view used for validation and routing; each
//! keeps members it does not model in an `extra` map.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Root payload posted by the case-management platform
#[derive(Debug, Clone, PartialEq)]
pub struct HearingEvent {
    hearing: Hearing,
    document: Value,
}

#[derive(Deserialize)]
struct HearingView {
    #[serde(default)]
    hearing: Hearing,
}

#[derive(Serialize)]
struct HearingViewRef<'a> {
    hearing: &'a Hearing,
}

impl HearingEvent {
    /// Build an event from a typed hearing; the document is its serialized form
    pub fn new(hearing: Hearing) -> serde_json::Result<Self> {
        let document = serde_json::to_value(HearingViewRef { hearing: &hearing })?;
        Ok(Self { hearing, document })
    }

    /// Wrap a received document, reading the typed view from it
    pub fn from_value(document: Value) -> serde_json::Result<Self> {
        let view = HearingView::deserialize(&document)?;
        Ok(Self {
            hearing: view.hearing,
            document,
        })
    }

    /// Parse a payload from its JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn hearing(&self) -> &Hearing {
        &self.hearing
    }

    /// The document as received
    pub fn document(&self) -> &Value {
        &self.document
    }
}

impl Serialize for HearingEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HearingEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = Value::deserialize(deserializer)?;
        Self::from_value(document).map_err(de::Error::custom)
    }
}

/// A single court hearing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hearing {
    /// Hearing identifier assigned by the platform
    #[serde(default)]
    pub id: String,

    /// Where the hearing is listed
    #[serde(default)]
    pub court_centre: CourtCentre,

    /// Hearing type, sent as `type`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub hearing_type: Option<HearingType>,

    /// e.g. `CROWN` or `MAGISTRATES`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction_type: Option<String>,

    #[serde(default)]
    pub hearing_days: Vec<HearingDay>,

    /// Cases heard; only the first feeds telemetry
    #[serde(default)]
    pub prosecution_cases: Vec<ProsecutionCase>,

    /// Members not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Hearing {
    /// The first prosecution case, the only one inspected for routing facts
    pub fn first_case(&self) -> Option<&ProsecutionCase> {
        self.prosecution_cases.first()
    }
}

/// Court centre a hearing is listed at
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtCentre {
    /// Court centre identifier
    #[serde(default)]
    pub id: String,

    /// Full court centre code; its first five characters are the court code
    #[serde(default)]
    pub code: String,

    /// Courtroom identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,

    /// Courtroom name, e.g. "Crown Court 3-1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CourtCentre {
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_room(mut self, room_id: impl Into<String>, room_name: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self.room_name = Some(room_name.into());
        self
    }
}

/// Hearing type, e.g. "Sentence"
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingType {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub description: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One day the hearing sits
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingDay {
    /// Sitting date-time as sent, not parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitting_day: Option<String>,

    /// Any JSON number; the view does not narrow it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_duration_minutes: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_sequence: Option<Number>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A prosecution case heard at the hearing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsecutionCase {
    /// Case identifier, reported as `caseId`
    #[serde(default)]
    pub id: String,

    /// Case reference numbers
    #[serde(default)]
    pub prosecution_case_identifier: ProsecutionCaseIdentifier,

    #[serde(default)]
    pub defendants: Vec<Defendant>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProsecutionCase {
    pub fn new(id: impl Into<String>, case_urn: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prosecution_case_identifier: ProsecutionCaseIdentifier {
                case_urn: Some(case_urn.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn case_urn(&self) -> Option<&str> {
        self.prosecution_case_identifier.case_urn.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsecutionCaseIdentifier {
    /// Unique reference number, sent as `caseURN`
    #[serde(rename = "caseURN", default, skip_serializing_if = "Option::is_none")]
    pub case_urn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosecution_authority_code: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defendant {
    #[serde(default)]
    pub id: String,

    /// Present for individuals, absent for organisations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_defendant: Option<PersonDefendant>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Personal details wrapper; `personDetails` is mandatory when present
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDefendant {
    #[serde(default)]
    pub person_details: Option<PersonDetails>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,

    /// Required whenever person details are sent
    #[serde(default)]
    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
