use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{InventoryModel, ProductMappingModel, ProductModel, ProductVariantModel};
use crate::errors::ServiceError;

pub mod mapping_repository;
pub mod product_repository;
pub mod variant_repository;

pub use mapping_repository::MappingRepository;
pub use product_repository::ProductRepository;
pub use variant_repository::VariantRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Read access to the canonical catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<ProductModel>, ServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>, ServiceError>;

    /// Active products in a stable order; the fuzzy scan relies on it for tie-breaking.
    async fn list_active(&self) -> Result<Vec<ProductModel>, ServiceError>;
}

/// A mapping about to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMapping {
    pub product_id: Uuid,
    pub platform: String,
    pub external_id: Option<String>,
    pub external_name: Option<String>,
    /// SKU supplied by the platform, kept alongside the mapping
    pub sku: Option<String>,
}

/// Platform identity ↔ canonical product associations.
#[async_trait]
pub trait MappingStore: Send + Sync {
    async fn find_by_platform_and_external_id(
        &self,
        platform: &str,
        external_id: &str,
    ) -> Result<Option<ProductMappingModel>, ServiceError>;

    /// Records a mapping. Saving the same `(platform, external_id)` again
    /// repoints the existing row instead of adding a second one.
    async fn save(&self, mapping: NewMapping) -> Result<ProductMappingModel, ServiceError>;
}

/// A variant together with every inventory record of its owning product.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantStock {
    pub variant: ProductVariantModel,
    pub inventory: Vec<InventoryModel>,
}

#[async_trait]
pub trait VariantInventoryReader: Send + Sync {
    /// Variants whose style name contains `style_substring` (case-insensitive)
    /// and whose color and size match exactly. `None` matches an unset column.
    async fn find_variants(
        &self,
        style_substring: &str,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<Vec<VariantStock>, ServiceError>;
}
