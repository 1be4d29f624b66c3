//! Court Hearing Core
//!
//! Decision-and-dispatch pipeline for court hearing lifecycle events.
//!
//! Every inbound hearing event is recorded through a [`TelemetryEmitter`]
//! and, when its court qualifies under the configured [`AllowList`],
//! republished through a [`MessagePublisher`] with a typed `messageType`
//! routing attribute.
//!
//! # Modules
//!
//! - `model` - hearing event payload types
//! - `validation` - explicit field validation run before relaying
//! - `filter` - court code derivation and allow-list filtering
//! - `kind` - event kinds and their telemetry/routing labels
//! - `telemetry` - telemetry emitter contract
//! - `publisher` - message construction and the publish transport contract
//! - `engine` - the relay decision engine
//!
//! # Example
//!
//! ```rust,ignore
//! use court_hearing_core::{AllowList, EventKind, RelayEngine};
//!
//! let engine = RelayEngine::new(
//!     AllowList::new(["B10JQ", "B33HU"], true),
//!     telemetry,
//!     publisher,
//! );
//! event.validate()?;
//! engine.handle(EventKind::Update, &event).await?;
//! ```

pub mod engine;
pub mod error;
pub mod filter;
pub mod kind;
pub mod model;
pub mod publisher;
pub mod telemetry;
pub mod validation;

pub use engine::{RelayEngine, RelayOutcome, RoutingFacts};
pub use error::{RelayError, RelayResult};
pub use filter::{court_code, parse_court_codes, should_relay, AllowList, COURT_CODE_LENGTH};
pub use kind::EventKind;
pub use model::*;
pub use publisher::{
    MessageAttribute, MessageAttributes, MessagePublisher, OutboundMessage, PublishError,
    PublishReceipt, PublishTransport, TopicPublisher, TransportError, MESSAGE_TYPE_ATTRIBUTE,
};
pub use telemetry::{TelemetryEmitter, TelemetryEventType, TelemetryProperties};
pub use validation::{FieldError, ValidationErrors};
