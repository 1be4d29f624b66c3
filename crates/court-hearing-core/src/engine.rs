//! Relay decision engine
//!
//! For each hearing event the engine:
//!
//! 1. derives the court code from the first five characters of the court
//!    centre code
//! 2. reads the hearing id and the first prosecution case, if any
//! 3. records telemetry for the event, always
//! 4. publishes the event when the allow-list permits its court
//!
//! Telemetry never depends on the filter result, and a filtered event is
//! still a success for the caller.

use std::sync::Arc;

use crate::error::RelayResult;
use crate::filter::{court_code, AllowList};
use crate::kind::EventKind;
use crate::model::HearingEvent;
use crate::publisher::{MessagePublisher, PublishReceipt};
use crate::telemetry::{TelemetryEmitter, TelemetryProperties};

/// Facts extracted from a hearing event for telemetry and filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingFacts {
    pub court_code: String,
    pub hearing_id: String,
    pub case_id: Option<String>,
    pub case_urn: Option<String>,
}

impl RoutingFacts {
    /// Extract facts from `event`. Only the first prosecution case is read.
    pub fn extract(event: &HearingEvent) -> RelayResult<Self> {
        let hearing = event.hearing();
        let court_code = court_code(&hearing.court_centre.code)?.to_string();
        let first_case = hearing.first_case();

        Ok(Self {
            court_code,
            hearing_id: hearing.id.clone(),
            case_id: first_case.map(|c| c.id.clone()),
            case_urn: first_case.and_then(|c| c.case_urn().map(str::to_string)),
        })
    }

    pub fn to_properties(&self) -> TelemetryProperties {
        TelemetryProperties::from([
            ("courtCode".to_string(), Some(self.court_code.clone())),
            ("hearingId".to_string(), Some(self.hearing_id.clone())),
            ("caseId".to_string(), self.case_id.clone()),
            ("caseUrn".to_string(), self.case_urn.clone()),
        ])
    }
}

/// What happened to an event that was handled without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Published to the topic
    Relayed(PublishReceipt),
    /// Recorded, but the court is not on the active allow-list
    Filtered { court_code: String },
    /// Recorded only; the kind has no publish contract
    Recorded,
}

/// Orchestrates telemetry and publishing for inbound hearing events
pub struct RelayEngine {
    allow_list: AllowList,
    telemetry: Arc<dyn TelemetryEmitter>,
    publisher: Arc<dyn MessagePublisher>,
}

impl RelayEngine {
    pub fn new(
        allow_list: AllowList,
        telemetry: Arc<dyn TelemetryEmitter>,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Self {
        Self {
            allow_list,
            telemetry,
            publisher,
        }
    }

    /// Record and conditionally relay a validated hearing event
    pub async fn handle(&self, kind: EventKind, event: &HearingEvent) -> RelayResult<RelayOutcome> {
        let facts = RoutingFacts::extract(event)?;

        self.telemetry
            .track_event(kind.telemetry_event_type(), facts.to_properties());

        if !kind.is_publishable() {
            return Ok(RelayOutcome::Recorded);
        }

        if !self.allow_list.permits(&facts.court_code) {
            tracing::debug!(
                court_code = %facts.court_code,
                hearing_id = %facts.hearing_id,
                "Court not on allow-list, event not relayed"
            );
            return Ok(RelayOutcome::Filtered {
                court_code: facts.court_code,
            });
        }

        let receipt = self.publisher.publish(kind, event).await?;
        tracing::info!(
            court_code = %facts.court_code,
            hearing_id = %facts.hearing_id,
            message_id = %receipt.message_id,
            kind = %kind,
            "Relayed hearing event"
        );

        Ok(RelayOutcome::Relayed(receipt))
    }

    /// Record a hearing deletion. Deletes are never published.
    pub fn handle_delete(&self, id: &str) -> RelayOutcome {
        self.telemetry.track_event(
            EventKind::Delete.telemetry_event_type(),
            TelemetryProperties::from([("id".to_string(), Some(id.to_string()))]),
        );
        RelayOutcome::Recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::model::Hearing;
    use crate::publisher::{MockMessagePublisher, PublishError, TransportError};
    use crate::telemetry::{MockTelemetryEmitter, TelemetryEventType};
    use mockall::predicate::eq;
    use proptest::prelude::*;

    const MINIMAL: &str = include_str!("../tests/fixtures/court-application-minimal.json");
    const HEARING_ID: &str = "59cb14a6-e8de-4615-9c9d-94fa5ef81ad2";
    const NORTH_TYNESIDE: &str = "B10JQ";
    const LEICESTER: &str = "B33HU";

    fn hearing_event() -> HearingEvent {
        HearingEvent::from_json(MINIMAL).unwrap()
    }

    fn hearing_event_with(edit: impl FnOnce(&mut Hearing)) -> HearingEvent {
        let mut hearing = hearing_event().hearing().clone();
        edit(&mut hearing);
        HearingEvent::new(hearing).unwrap()
    }

    fn included_courts(enabled: bool) -> AllowList {
        AllowList::new([NORTH_TYNESIDE, LEICESTER], enabled)
    }

    fn expected_properties() -> TelemetryProperties {
        TelemetryProperties::from([
            ("courtCode".to_string(), Some(NORTH_TYNESIDE.to_string())),
            ("hearingId".to_string(), Some(HEARING_ID.to_string())),
            (
                "caseId".to_string(),
                Some("1d1861ed-e18c-429d-bad0-671802f9cdba".to_string()),
            ),
            ("caseUrn".to_string(), Some("80GD8183221".to_string())),
        ])
    }

    fn telemetry_once(event_type: TelemetryEventType, properties: TelemetryProperties) -> MockTelemetryEmitter {
        let mut telemetry = MockTelemetryEmitter::new();
        telemetry
            .expect_track_event()
            .with(eq(event_type), eq(properties))
            .times(1)
            .return_const(());
        telemetry
    }

    fn publisher_once(expected_kind: EventKind, expected: HearingEvent) -> MockMessagePublisher {
        let mut publisher = MockMessagePublisher::new();
        publisher
            .expect_publish()
            .withf(move |kind, event| *kind == expected_kind && *event == expected)
            .times(1)
            .returning(|_, _| Ok(PublishReceipt::new("message-1")));
        publisher
    }

    fn publisher_never() -> MockMessagePublisher {
        let mut publisher = MockMessagePublisher::new();
        publisher.expect_publish().times(0);
        publisher
    }

    fn engine(
        allow_list: AllowList,
        telemetry: MockTelemetryEmitter,
        publisher: MockMessagePublisher,
    ) -> RelayEngine {
        RelayEngine::new(allow_list, Arc::new(telemetry), Arc::new(publisher))
    }

    #[tokio::test]
    async fn test_update_for_included_court_is_relayed() {
        let event = hearing_event();
        let engine = engine(
            included_courts(true),
            telemetry_once(TelemetryEventType::CourtHearingUpdateEventReceived, expected_properties()),
            publisher_once(EventKind::Update, event.clone()),
        );

        let outcome = engine.handle(EventKind::Update, &event).await.unwrap();

        assert_eq!(outcome, RelayOutcome::Relayed(PublishReceipt::new("message-1")));
    }

    #[tokio::test]
    async fn test_update_without_cases_tracks_null_case_fields() {
        let event = hearing_event_with(|hearing| hearing.prosecution_cases.clear());

        let properties = TelemetryProperties::from([
            ("courtCode".to_string(), Some(NORTH_TYNESIDE.to_string())),
            ("hearingId".to_string(), Some(HEARING_ID.to_string())),
            ("caseId".to_string(), None),
            ("caseUrn".to_string(), None),
        ]);
        let engine = engine(
            included_courts(true),
            telemetry_once(TelemetryEventType::CourtHearingUpdateEventReceived, properties),
            publisher_once(EventKind::Update, event.clone()),
        );

        engine.handle(EventKind::Update, &event).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_for_excluded_court_is_tracked_not_relayed() {
        let engine = engine(
            AllowList::new(Vec::<String>::new(), true),
            telemetry_once(TelemetryEventType::CourtHearingUpdateEventReceived, expected_properties()),
            publisher_never(),
        );

        let outcome = engine.handle(EventKind::Update, &hearing_event()).await.unwrap();

        assert_eq!(
            outcome,
            RelayOutcome::Filtered {
                court_code: NORTH_TYNESIDE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_result_for_included_court_is_relayed() {
        let event = hearing_event();
        let engine = engine(
            included_courts(true),
            telemetry_once(TelemetryEventType::CourtHearingResultEventReceived, expected_properties()),
            publisher_once(EventKind::Result, event.clone()),
        );

        engine.handle(EventKind::Result, &event).await.unwrap();
    }

    #[tokio::test]
    async fn test_result_for_included_court_with_list_disabled_is_relayed() {
        let event = hearing_event();
        let engine = engine(
            included_courts(false),
            telemetry_once(TelemetryEventType::CourtHearingResultEventReceived, expected_properties()),
            publisher_once(EventKind::Result, event.clone()),
        );

        engine.handle(EventKind::Result, &event).await.unwrap();
    }

    #[tokio::test]
    async fn test_result_for_excluded_court_is_tracked_not_relayed() {
        let engine = engine(
            AllowList::new(Vec::<String>::new(), true),
            telemetry_once(TelemetryEventType::CourtHearingResultEventReceived, expected_properties()),
            publisher_never(),
        );

        engine.handle(EventKind::Result, &hearing_event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_result_for_excluded_court_with_list_disabled_is_relayed() {
        let event = hearing_event();
        let engine = engine(
            AllowList::disabled(),
            telemetry_once(TelemetryEventType::CourtHearingResultEventReceived, expected_properties()),
            publisher_once(EventKind::Result, event.clone()),
        );

        engine.handle(EventKind::Result, &event).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_tracks_id_only() {
        let engine = engine(
            included_courts(true),
            telemetry_once(
                TelemetryEventType::CourtHearingDeleteEventReceived,
                TelemetryProperties::from([("id".to_string(), Some("abc".to_string()))]),
            ),
            publisher_never(),
        );

        assert_eq!(engine.handle_delete("abc"), RelayOutcome::Recorded);
    }

    #[tokio::test]
    async fn test_delete_kind_with_body_is_never_published() {
        let engine = engine(
            AllowList::disabled(),
            telemetry_once(TelemetryEventType::CourtHearingDeleteEventReceived, expected_properties()),
            publisher_never(),
        );

        let outcome = engine.handle(EventKind::Delete, &hearing_event()).await.unwrap();
        assert_eq!(outcome, RelayOutcome::Recorded);
    }

    #[tokio::test]
    async fn test_short_court_code_fails_before_telemetry() {
        let event = hearing_event_with(|hearing| hearing.court_centre.code = "B10".to_string());

        let mut telemetry = MockTelemetryEmitter::new();
        telemetry.expect_track_event().times(0);
        let engine = engine(AllowList::disabled(), telemetry, publisher_never());

        let err = engine.handle(EventKind::Update, &event).await.unwrap_err();
        assert!(matches!(err, RelayError::CourtCodeOutOfRange { length: 3, .. }));
    }

    #[tokio::test]
    async fn test_publish_failure_propagates_after_telemetry() {
        let mut publisher = MockMessagePublisher::new();
        publisher.expect_publish().times(1).returning(|_, _| {
            Err(PublishError::Transport(TransportError::Network(
                "connection reset".to_string(),
            )))
        });
        let engine = engine(
            included_courts(true),
            telemetry_once(TelemetryEventType::CourtHearingUpdateEventReceived, expected_properties()),
            publisher,
        );

        let err = engine.handle(EventKind::Update, &hearing_event()).await.unwrap_err();
        assert!(matches!(err, RelayError::Publish(PublishError::Transport(_))));
    }

    #[test]
    fn test_extract_reads_first_case_only() {
        let event = hearing_event_with(|hearing| {
            let mut second = hearing.prosecution_cases[0].clone();
            second.id = "second-case".to_string();
            hearing.prosecution_cases.push(second);
        });

        let facts = RoutingFacts::extract(&event).unwrap();
        assert_eq!(facts.case_id.as_deref(), Some("1d1861ed-e18c-429d-bad0-671802f9cdba"));
        assert_eq!(facts.to_properties(), expected_properties());
    }

    proptest! {
        #[test]
        fn prop_unlisted_courts_record_but_never_publish(code in "[A-Z0-9]{5,10}") {
            prop_assume!(!code.starts_with(NORTH_TYNESIDE) && !code.starts_with(LEICESTER));
            let event = hearing_event_with(|hearing| hearing.court_centre.code = code);

            let mut telemetry = MockTelemetryEmitter::new();
            telemetry.expect_track_event().times(1).return_const(());
            let engine = engine(included_courts(true), telemetry, publisher_never());

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let outcome = runtime.block_on(engine.handle(EventKind::Update, &event)).unwrap();
            let is_filtered = matches!(outcome, RelayOutcome::Filtered { .. });
            prop_assert!(is_filtered);
        }
    }
}
