use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Builds a bounded channel and returns both ends
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends without waiting; fails if the channel is full or closed
    pub fn try_send(&self, event: Event) -> Result<(), String> {
        self.sender.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => "Event channel is full".to_string(),
            mpsc::error::TrySendError::Closed(_) => "Event channel is closed".to_string(),
        })
    }
}

/// Domain events emitted by the catalog, matching and order services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ProductCreated(Uuid),

    /// A platform identity was bound to a canonical product
    ProductMapped {
        product_id: Uuid,
        platform: String,
        external_id: Option<String>,
        match_type: String,
    },

    /// Fuzzy match landed in the review band; a human must confirm it
    MatchReviewRequested {
        name: String,
        sku: Option<String>,
        platform: String,
        external_id: Option<String>,
        suggested_product_id: Uuid,
        suggested_name: String,
        confidence: f64,
    },

    /// No usable candidate; a new catalog product should be created
    NewProductRequested {
        name: String,
        sku: Option<String>,
        platform: String,
        external_id: Option<String>,
    },

    PurchaseOrderReceived {
        po_id: Uuid,
        po_number: String,
        total_units: i32,
    },

    PurchaseOrderStatusChanged {
        po_id: Uuid,
        old_status: String,
        new_status: String,
    },

    /// Reconciliation found lines the warehouse cannot cover
    StockShortfallDetected {
        po_id: Uuid,
        po_number: String,
        items_short: usize,
    },
}

/// Drains the event channel until every sender is dropped.
///
/// Returns the number of events handled.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) -> usize {
    info!("Starting event processing loop");
    let mut handled = 0;

    while let Some(event) = rx.recv().await {
        handled += 1;
        match &event {
            Event::MatchReviewRequested {
                name,
                platform,
                suggested_product_id,
                confidence,
                ..
            } => {
                info!(
                    name = %name,
                    platform = %platform,
                    suggested_product_id = %suggested_product_id,
                    confidence = confidence,
                    "product match queued for manual review"
                );
            }
            Event::NewProductRequested { name, platform, .. } => {
                info!(name = %name, platform = %platform, "new catalog product requested");
            }
            Event::StockShortfallDetected {
                po_number,
                items_short,
                ..
            } => {
                warn!(po_number = %po_number, items_short = items_short, "purchase order cannot be fully covered from stock");
            }
            other => info!("Received event: {:?}", other),
        }
    }

    info!(handled, "Event processing loop finished");
    handled
}
