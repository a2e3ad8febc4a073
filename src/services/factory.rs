use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        catalog::CatalogService,
        inventory::InventoryService,
        order_processor::OrderProcessor,
        product_matcher::{MatcherConfig, ProductMatcher},
        reconciliation::EventReconciliationSink,
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    matcher_config: MatcherConfig,
    order_platform: String,
}

impl ServiceFactory {
    /// Creates a new service factory with the given dependencies
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, config: &AppConfig) -> Self {
        Self {
            db_pool,
            event_sender,
            matcher_config: config.matcher.clone(),
            order_platform: config.order_source_platform.clone(),
        }
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.db_pool.clone()).with_event_sender(self.event_sender.clone())
    }

    pub fn inventory_service(&self) -> InventoryService {
        InventoryService::new(self.db_pool.clone())
    }

    /// Matcher whose review and new-product work goes onto the event channel.
    ///
    /// Run `events::process_events` on the receiver; once the channel fills,
    /// review and new-product outcomes fail with `ServiceError::EventError`.
    pub fn product_matcher(&self) -> ProductMatcher {
        let sink = Arc::new(EventReconciliationSink::new(self.event_sender.clone()));
        ProductMatcher::with_db(self.db_pool.clone(), sink, self.matcher_config.clone())
            .with_event_sender(self.event_sender.clone())
    }

    pub fn order_processor(&self) -> OrderProcessor {
        OrderProcessor::new(self.db_pool.clone(), self.order_platform.clone())
            .with_event_sender(self.event_sender.clone())
    }

    /// Gets a reference to the database pool
    pub fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }

    /// Gets a reference to the event sender
    pub fn event_sender(&self) -> &EventSender {
        &self.event_sender
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub catalog: Arc<CatalogService>,
    pub inventory: Arc<InventoryService>,
    pub matcher: Arc<ProductMatcher>,
    pub orders: Arc<OrderProcessor>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Self {
        Self {
            catalog: Arc::new(factory.catalog_service()),
            inventory: Arc::new(factory.inventory_service()),
            matcher: Arc::new(factory.product_matcher()),
            orders: Arc::new(factory.order_processor()),
        }
    }
}
