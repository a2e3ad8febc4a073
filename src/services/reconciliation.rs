use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::product_matcher::MatchRequest;

/// Best candidate offered to a reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSuggestion {
    pub product_id: Uuid,
    pub product_name: String,
    pub confidence: f64,
}

/// Destination for matches that need a human or a new catalog entry.
///
/// The matcher calls these synchronously; how the work is picked up is up to
/// the implementation.
#[async_trait]
pub trait ReconciliationSink: Send + Sync {
    async fn enqueue_review(
        &self,
        request: MatchRequest,
        suggestion: ReviewSuggestion,
    ) -> Result<(), ServiceError>;

    async fn enqueue_new_product(&self, request: MatchRequest) -> Result<(), ServiceError>;
}

/// Publishes reconciliation work onto the event channel.
///
/// Never waits for channel capacity: with no consumer draining the channel,
/// a full channel surfaces as `ServiceError::EventError`.
#[derive(Debug, Clone)]
pub struct EventReconciliationSink {
    sender: EventSender,
}

impl EventReconciliationSink {
    pub fn new(sender: EventSender) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ReconciliationSink for EventReconciliationSink {
    #[instrument(skip(self, request), fields(name = %request.name, product_id = %suggestion.product_id))]
    async fn enqueue_review(
        &self,
        request: MatchRequest,
        suggestion: ReviewSuggestion,
    ) -> Result<(), ServiceError> {
        self.sender
            .try_send(Event::MatchReviewRequested {
                name: request.name,
                sku: request.sku,
                platform: request.platform,
                external_id: request.external_id,
                suggested_product_id: suggestion.product_id,
                suggested_name: suggestion.product_name,
                confidence: suggestion.confidence,
            })
            .map_err(ServiceError::EventError)?;
        info!("match queued for review");
        Ok(())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn enqueue_new_product(&self, request: MatchRequest) -> Result<(), ServiceError> {
        self.sender
            .try_send(Event::NewProductRequested {
                name: request.name,
                sku: request.sku,
                platform: request.platform,
                external_id: request.external_id,
            })
            .map_err(ServiceError::EventError)?;
        info!("new product creation queued");
        Ok(())
    }
}

/// Sink that only logs; for tooling that runs without an event consumer.
#[derive(Debug, Clone, Default)]
pub struct LoggingReconciliationSink;

#[async_trait]
impl ReconciliationSink for LoggingReconciliationSink {
    async fn enqueue_review(
        &self,
        request: MatchRequest,
        suggestion: ReviewSuggestion,
    ) -> Result<(), ServiceError> {
        info!(
            name = %request.name,
            suggested = %suggestion.product_name,
            confidence = suggestion.confidence,
            "match requires review"
        );
        Ok(())
    }

    async fn enqueue_new_product(&self, request: MatchRequest) -> Result<(), ServiceError> {
        info!(name = %request.name, platform = %request.platform, "match requires new product");
        Ok(())
    }
}
