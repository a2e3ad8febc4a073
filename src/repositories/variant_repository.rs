use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::entities::inventory::{self, Entity as Inventory};
use crate::entities::product_variant::{Column, Entity as ProductVariant};
use crate::entities::style;
use crate::entities::InventoryModel;
use crate::errors::ServiceError;
use crate::repositories::{BaseRepository, Repository, VariantInventoryReader, VariantStock};

const LIKE_ESCAPE: char = '\\';

/// sea-orm backed variant + stock lookup
#[derive(Debug, Clone)]
pub struct VariantRepository {
    base: BaseRepository,
}

impl VariantRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

/// Escapes LIKE wildcards so the needle is matched literally.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring test with full Unicode folding.
fn style_matches(style_name: &str, lowercase_needle: &str) -> bool {
    style_name.to_lowercase().contains(lowercase_needle)
}

#[async_trait]
impl VariantInventoryReader for VariantRepository {
    async fn find_variants(
        &self,
        style_substring: &str,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<Vec<VariantStock>, ServiceError> {
        let db = self.base.get_db();
        let needle = style_substring.to_lowercase();

        let mut query = ProductVariant::find().find_also_related(style::Entity);

        // SQLite's LOWER folds ASCII only, so non-ASCII needles are matched below
        if db.get_database_backend() != DbBackend::Sqlite || needle.is_ascii() {
            let pattern = format!("%{}%", escape_like(&needle));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    style::Entity,
                    style::Column::StyleName,
                ))))
                .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            );
        }

        query = match color {
            Some(color) => query.filter(Column::Color.eq(color)),
            None => query.filter(Column::Color.is_null()),
        };
        query = match size {
            Some(size) => query.filter(Column::Size.eq(size)),
            None => query.filter(Column::Size.is_null()),
        };

        let rows = query.order_by_asc(Column::Sku).all(db).await.map_err(|e| {
            error!("Failed to query variants for style '{}': {}", style_substring, e);
            ServiceError::DatabaseError(e)
        })?;

        let variants: Vec<_> = rows
            .into_iter()
            .filter_map(|(variant, style)| {
                style
                    .filter(|style| style_matches(&style.style_name, &needle))
                    .map(|_| variant)
            })
            .collect();

        let mut product_ids: Vec<Uuid> = variants.iter().filter_map(|v| v.product_id).collect();
        product_ids.sort();
        product_ids.dedup();

        let mut stock_by_product: HashMap<Uuid, Vec<InventoryModel>> = HashMap::new();
        if !product_ids.is_empty() {
            let records = Inventory::find()
                .filter(inventory::Column::ProductId.is_in(product_ids))
                .order_by_asc(inventory::Column::Location)
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            for record in records {
                stock_by_product
                    .entry(record.product_id)
                    .or_default()
                    .push(record);
            }
        }

        debug!(
            style = %style_substring,
            variants = variants.len(),
            "resolved variants for purchase order line"
        );

        Ok(variants
            .into_iter()
            .map(|variant| {
                let inventory = variant
                    .product_id
                    .and_then(|id| stock_by_product.get(&id).cloned())
                    .unwrap_or_default();
                VariantStock { variant, inventory }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("knightsbridge"), "knightsbridge");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn style_match_folds_non_ascii_case() {
        assert!(style_matches("ÉTOILE Coat", "étoile"));
        assert!(style_matches("Knightsbridge Jacket", "bridge"));
        assert!(!style_matches("Oxford Loafer", "étoile"));
    }
}
