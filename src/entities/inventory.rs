use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock held for one product at one warehouse location.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,

    /// e.g. `warehouse_uk`, `warehouse_ny`, `warehouse_hk`
    pub location: String,

    pub quantity_available: i32,

    pub quantity_reserved: i32,

    pub quantity_incoming: i32,

    pub reorder_point: i32,

    pub last_updated: DateTime<Utc>,
}

impl Model {
    /// At or below the reorder threshold.
    pub fn needs_reorder(&self) -> bool {
        self.quantity_available <= self.reorder_point
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
