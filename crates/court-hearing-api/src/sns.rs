//! SNS publish transport

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sns::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sns::operation::publish::PublishError as SnsPublishError;
use aws_sdk_sns::types::MessageAttributeValue;
use aws_sdk_sns::Client;
use court_hearing_core::{MessageAttributes, PublishReceipt, PublishTransport, TransportError};
use std::collections::HashMap;

use crate::config::PublisherConfig;

/// [`PublishTransport`] that publishes to an SNS topic
#[derive(Clone)]
pub struct SnsTransport {
    client: Client,
}

impl SnsTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the shared AWS environment, applying the
    /// configured region and endpoint override
    pub async fn from_config(config: &PublisherConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared_config = loader.load().await;

        Self::new(Client::new(&shared_config))
    }
}

#[async_trait]
impl PublishTransport for SnsTransport {
    async fn publish(
        &self,
        topic: &str,
        body: String,
        attributes: MessageAttributes,
    ) -> Result<PublishReceipt, TransportError> {
        let attributes = to_sns_attributes(attributes)?;

        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .message(body)
            .set_message_attributes(Some(attributes))
            .send()
            .await
            .map_err(|e| classify(&e))?;

        Ok(PublishReceipt::new(output.message_id().unwrap_or_default()))
    }
}

fn to_sns_attributes(
    attributes: MessageAttributes,
) -> Result<HashMap<String, MessageAttributeValue>, TransportError> {
    attributes
        .into_iter()
        .map(|(name, attribute)| {
            MessageAttributeValue::builder()
                .data_type(attribute.data_type)
                .string_value(attribute.string_value)
                .build()
                .map(|value| (name, value))
                .map_err(|e| TransportError::Rejected(e.to_string()))
        })
        .collect()
}

/// Error code SNS returns for account-level request throttling
const THROTTLING_CODE: &str = "Throttling";

fn classify<R>(err: &SdkError<SnsPublishError, R>) -> TransportError
where
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(err).to_string();
    match err.as_service_error() {
        Some(e) if e.is_not_found_exception() => TransportError::TopicNotFound(message),
        Some(e) if e.is_kms_throttling_exception() || e.code() == Some(THROTTLING_CODE) => {
            TransportError::Throttled(message)
        }
        Some(_) => TransportError::Rejected(message),
        None => TransportError::Network(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sns::error::ErrorMetadata;
    use aws_sdk_sns::types::error::{KmsThrottlingException, NotFoundException};
    use court_hearing_core::{MessageAttribute, MESSAGE_TYPE_ATTRIBUTE};

    fn service_error(err: SnsPublishError) -> SdkError<SnsPublishError, ()> {
        SdkError::service_error(err, ())
    }

    fn unmodeled(code: &str) -> SnsPublishError {
        SnsPublishError::generic(ErrorMetadata::builder().code(code).message("failed").build())
    }

    #[test]
    fn test_attributes_keep_type_and_value() {
        let mut attributes = MessageAttributes::new();
        attributes.insert(
            MESSAGE_TYPE_ATTRIBUTE.to_string(),
            MessageAttribute::string("COMMON_PLATFORM_HEARING"),
        );

        let converted = to_sns_attributes(attributes).unwrap();
        let value = &converted[MESSAGE_TYPE_ATTRIBUTE];
        assert_eq!(value.data_type(), "String");
        assert_eq!(value.string_value(), Some("COMMON_PLATFORM_HEARING"));
    }

    #[test]
    fn test_missing_topic_is_topic_not_found() {
        let err = service_error(SnsPublishError::NotFoundException(
            NotFoundException::builder().message("Topic does not exist").build(),
        ));
        assert!(matches!(classify(&err), TransportError::TopicNotFound(_)));
    }

    #[test]
    fn test_throttling_is_throttled() {
        let err = service_error(unmodeled("Throttling"));
        assert!(matches!(classify(&err), TransportError::Throttled(_)));

        let err = service_error(SnsPublishError::KmsThrottlingException(
            KmsThrottlingException::builder().build(),
        ));
        assert!(matches!(classify(&err), TransportError::Throttled(_)));
    }

    #[test]
    fn test_other_service_errors_are_rejected() {
        let err = service_error(unmodeled("InvalidParameter"));
        assert!(matches!(classify(&err), TransportError::Rejected(_)));
    }

    #[test]
    fn test_timeout_is_network() {
        let err = SdkError::<SnsPublishError, ()>::timeout_error("connect timed out");
        assert!(matches!(classify(&err), TransportError::Network(_)));
    }
}
