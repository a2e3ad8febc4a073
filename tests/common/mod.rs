#![allow(dead_code)]

use std::sync::Arc;

use arch4_api::{
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    entities::{InventoryModel, ProductModel, ProductVariantModel},
    events::{Event, EventSender},
    services::{
        catalog::{CatalogService, CreateProductInput, CreateVariantInput},
        factory::ServiceFactory,
        inventory::{InventoryService, StockLevel},
    },
};
use tokio::sync::mpsc;

/// Fresh in-memory database with the schema applied, plus the event receiver
/// so tests can assert on what the services published.
pub struct TestContext {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub factory: ServiceFactory,
    pub events: mpsc::Receiver<Event>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::new("sqlite::memory:".into(), "test".into())).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");
        let db = Arc::new(pool);

        let (sender, events) = EventSender::channel(config.event_channel_capacity);
        let factory = ServiceFactory::new(db.clone(), sender, &config);

        Self {
            db,
            config,
            factory,
            events,
        }
    }

    pub fn catalog(&self) -> CatalogService {
        self.factory.catalog_service()
    }

    pub fn inventory(&self) -> InventoryService {
        self.factory.inventory_service()
    }

    pub async fn seed_product(&self, sku: &str, name: &str) -> ProductModel {
        self.catalog()
            .create_product(CreateProductInput {
                sku: sku.to_string(),
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .expect("seed product")
    }

    /// Creates a style, one variant of it for `product`,
    /// and one stock record per `(location, available)` pair.
    pub async fn seed_variant_with_stock(
        &self,
        product: &ProductModel,
        style_name: &str,
        color: Option<&str>,
        size: Option<&str>,
        stock: &[(&str, i32)],
    ) -> (ProductVariantModel, Vec<InventoryModel>) {
        let catalog = self.catalog();
        let style = catalog
            .create_style(style_name.to_string(), None, None)
            .await
            .expect("seed style");
        let variant = catalog
            .create_variant(CreateVariantInput {
                product_id: Some(product.id),
                style_id: Some(style.id),
                sku: format!(
                    "{}-{}-{}-{}",
                    product.sku,
                    style_name.to_uppercase().replace(' ', "_"),
                    color.unwrap_or("NA"),
                    size.unwrap_or("NA")
                ),
                color: color.map(str::to_string),
                size: size.map(str::to_string),
                ..Default::default()
            })
            .await
            .expect("seed variant");

        let inventory = self.inventory();
        let mut records = Vec::new();
        for (location, available) in stock {
            records.push(
                inventory
                    .record_stock(StockLevel {
                        product_id: product.id,
                        location: location.to_string(),
                        quantity_available: *available,
                        quantity_reserved: 0,
                        quantity_incoming: 0,
                        reorder_point: 5,
                    })
                    .await
                    .expect("seed stock"),
            );
        }
        (variant, records)
    }

    /// Everything published so far, without waiting.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

pub const CSV_HEADER: &str = "po_number,customer_name,style,price,color,size,collection_name,quantity";

/// Builds a CSV document from data lines.
pub fn csv_feed(lines: &[&str]) -> String {
    let mut out = String::from(CSV_HEADER);
    for line in lines {
        out.push('\n');
        out.push_str(line);
    }
    out.push('\n');
    out
}
