//! Message construction and publishing
//!
//! [`TopicPublisher`] turns a hearing event into a topic message: the full
//! event as JSON plus a `messageType` attribute chosen by [`EventKind`].
//! Delivery goes through a [`PublishTransport`]; failures are returned to
//! the caller, never retried here.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::kind::EventKind;
use crate::model::HearingEvent;

/// Name of the routing attribute carried by every published message
pub const MESSAGE_TYPE_ATTRIBUTE: &str = "messageType";

/// Declared data type for string attributes
pub const STRING_DATA_TYPE: &str = "String";

/// A typed message attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttribute {
    /// Declared type, always `String` for routing attributes
    pub data_type: String,
    pub string_value: String,
}

impl MessageAttribute {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: STRING_DATA_TYPE.to_string(),
            string_value: value.into(),
        }
    }
}

pub type MessageAttributes = BTreeMap<String, MessageAttribute>;

/// Acknowledgement of one published message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Identifier assigned by the topic
    pub message_id: String,
}

impl PublishReceipt {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
        }
    }
}

/// A message ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub topic: String,
    /// The hearing event as JSON
    pub body: String,
    /// Carries [`MESSAGE_TYPE_ATTRIBUTE`]
    pub attributes: MessageAttributes,
}

impl OutboundMessage {
    pub fn message_type(&self) -> Option<&str> {
        self.attributes
            .get(MESSAGE_TYPE_ATTRIBUTE)
            .map(|a| a.string_value.as_str())
    }
}

/// Failures reported by a publish transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Throttled: {0}")]
    Throttled(String),

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Publish rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to serialize hearing event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No publish contract for {0} events")]
    UnsupportedKind(EventKind),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Low-level topic transport, e.g. SNS
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishTransport: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        body: String,
        attributes: MessageAttributes,
    ) -> Result<PublishReceipt, TransportError>;
}

/// Publishes hearing events for downstream subscribers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(
        &self,
        kind: EventKind,
        event: &HearingEvent,
    ) -> Result<PublishReceipt, PublishError>;
}

/// [`MessagePublisher`] bound to one configured topic
pub struct TopicPublisher<T> {
    topic: String,
    transport: T,
}

impl<T: PublishTransport> TopicPublisher<T> {
    pub fn new(topic: impl Into<String>, transport: T) -> Self {
        Self {
            topic: topic.into(),
            transport,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Build the outbound message for `event` without sending it
    pub fn build_message(
        &self,
        kind: EventKind,
        event: &HearingEvent,
    ) -> Result<OutboundMessage, PublishError> {
        let message_type = kind
            .message_type()
            .ok_or(PublishError::UnsupportedKind(kind))?;
        let body = serde_json::to_string(event)?;

        let mut attributes = MessageAttributes::new();
        attributes.insert(
            MESSAGE_TYPE_ATTRIBUTE.to_string(),
            MessageAttribute::string(message_type),
        );

        Ok(OutboundMessage {
            topic: self.topic.clone(),
            body,
            attributes,
        })
    }
}

#[async_trait]
impl<T: PublishTransport> MessagePublisher for TopicPublisher<T> {
    async fn publish(
        &self,
        kind: EventKind,
        event: &HearingEvent,
    ) -> Result<PublishReceipt, PublishError> {
        let message = self.build_message(kind, event)?;

        let receipt = self
            .transport
            .publish(&message.topic, message.body, message.attributes)
            .await?;

        tracing::debug!(
            topic = %self.topic,
            kind = %kind,
            message_id = %receipt.message_id,
            "Published hearing event"
        );

        Ok(receipt)
    }
}
