pub mod collection;
pub mod inventory;
pub mod product;
pub mod product_mapping;
pub mod product_variant;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod style;

pub use inventory::Model as InventoryModel;
pub use product::Model as ProductModel;
pub use product_mapping::Model as ProductMappingModel;
pub use product_variant::Model as ProductVariantModel;
pub use purchase_order::{Model as PurchaseOrderModel, PurchaseOrderStatus};
pub use purchase_order_item::Model as PurchaseOrderItemModel;
