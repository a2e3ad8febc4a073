use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250126_000001_create_products_table::Migration),
            Box::new(m20250126_000002_create_product_mappings_table::Migration),
            Box::new(m20250126_000003_create_inventory_table::Migration),
            Box::new(m20250126_000004_create_fashion_catalog_tables::Migration),
            Box::new(m20250126_000005_create_purchase_order_tables::Migration),
        ]
    }
}

mod m20250126_000001_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250126_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Sku).string_len(100).not_null())
                        .col(ColumnDef::new(Products::Name).string_len(500).not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::Category).string_len(100).null())
                        .col(ColumnDef::new(Products::Material).string_len(100).null())
                        .col(ColumnDef::new(Products::CostPrice).decimal_len(10, 2).null())
                        .col(
                            ColumnDef::new(Products::WholesalePrice)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(ColumnDef::new(Products::RetailPrice).decimal_len(10, 2).null())
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_sku")
                        .table(Products::Table)
                        .col(Products::Sku)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_is_active")
                        .table(Products::Table)
                        .col(Products::IsActive)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Products {
        Table,
        Id,
        Sku,
        Name,
        Description,
        Category,
        Material,
        CostPrice,
        WholesalePrice,
        RetailPrice,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250126_000002_create_product_mappings_table {
    use super::m20250126_000001_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250126_000002_create_product_mappings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductMappings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductMappings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductMappings::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductMappings::Platform)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductMappings::ExternalId)
                                .string_len(100)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductMappings::ExternalName)
                                .string_len(500)
                                .null(),
                        )
                        .col(ColumnDef::new(ProductMappings::VariantInfo).text().null())
                        .col(
                            ColumnDef::new(ProductMappings::LastSynced)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_mappings_product_id")
                                .from(ProductMappings::Table, ProductMappings::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Backs the upsert in the mapping repository
            manager
                .create_index(
                    Index::create()
                        .name("idx_product_mappings_platform_external_id")
                        .table(ProductMappings::Table)
                        .col(ProductMappings::Platform)
                        .col(ProductMappings::ExternalId)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_product_mappings_product_id")
                        .table(ProductMappings::Table)
                        .col(ProductMappings::ProductId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductMappings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductMappings {
        Table,
        Id,
        ProductId,
        Platform,
        ExternalId,
        ExternalName,
        VariantInfo,
        LastSynced,
    }
}

mod m20250126_000003_create_inventory_table {
    use super::m20250126_000001_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250126_000003_create_inventory_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Inventory::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Inventory::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Inventory::Location).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Inventory::QuantityAvailable)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::QuantityReserved)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::QuantityIncoming)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::ReorderPoint)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_product_id")
                                .from(Inventory::Table, Inventory::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_product_location")
                        .table(Inventory::Table)
                        .col(Inventory::ProductId)
                        .col(Inventory::Location)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Inventory {
        Table,
        Id,
        ProductId,
        Location,
        QuantityAvailable,
        QuantityReserved,
        QuantityIncoming,
        ReorderPoint,
        LastUpdated,
    }
}

mod m20250126_000004_create_fashion_catalog_tables {
    use super::m20250126_000001_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250126_000004_create_fashion_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Collections::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Collections::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Collections::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Collections::Season).string_len(50).null())
                        .col(ColumnDef::new(Collections::Year).integer().null())
                        .col(
                            ColumnDef::new(Collections::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Collections::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Styles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Styles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Styles::StyleName).string_len(200).not_null())
                        .col(ColumnDef::new(Styles::StyleCode).string_len(50).null())
                        .col(ColumnDef::new(Styles::CollectionId).uuid().null())
                        .col(
                            ColumnDef::new(Styles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_styles_collection_id")
                                .from(Styles::Table, Styles::CollectionId)
                                .to(Collections::Table, Collections::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_styles_style_code")
                        .table(Styles::Table)
                        .col(Styles::StyleCode)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductVariants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductVariants::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductVariants::ProductId).uuid().null())
                        .col(ColumnDef::new(ProductVariants::StyleId).uuid().null())
                        .col(ColumnDef::new(ProductVariants::Color).string_len(50).null())
                        .col(ColumnDef::new(ProductVariants::Size).string_len(20).null())
                        .col(
                            ColumnDef::new(ProductVariants::Material)
                                .string_len(100)
                                .null(),
                        )
                        .col(ColumnDef::new(ProductVariants::Season).string_len(50).null())
                        .col(
                            ColumnDef::new(ProductVariants::CostPrice)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::WholesalePrice)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::RetailPrice)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(ColumnDef::new(ProductVariants::Sku).string_len(100).not_null())
                        .col(
                            ColumnDef::new(ProductVariants::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_variants_product_id")
                                .from(ProductVariants::Table, ProductVariants::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_variants_style_id")
                                .from(ProductVariants::Table, ProductVariants::StyleId)
                                .to(Styles::Table, Styles::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_product_variants_sku")
                        .table(ProductVariants::Table)
                        .col(ProductVariants::Sku)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_product_variants_color_size")
                        .table(ProductVariants::Table)
                        .col(ProductVariants::Color)
                        .col(ProductVariants::Size)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductVariants::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Styles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Collections::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Collections {
        Table,
        Id,
        Name,
        Season,
        Year,
        IsActive,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Styles {
        Table,
        Id,
        StyleName,
        StyleCode,
        CollectionId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductVariants {
        Table,
        Id,
        ProductId,
        StyleId,
        Color,
        Size,
        Material,
        Season,
        CostPrice,
        WholesalePrice,
        RetailPrice,
        Sku,
        CreatedAt,
    }
}

mod m20250126_000005_create_purchase_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250126_000005_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PoNumber)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CustomerName)
                                .string_len(200)
                                .null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Platform).string_len(50).null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CollectionName)
                                .string_len(200)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalSkus)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalUnits)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(32)
                                .not_null()
                                .default("received"),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::RequiredDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_purchase_orders_po_number")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::PoNumber)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderItems::PoId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrderItems::LineNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::StyleName)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderItems::Color).string_len(50).null())
                        .col(ColumnDef::new(PurchaseOrderItems::Size).string_len(20).null())
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::UnitPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::TotalPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_items_po_id")
                                .from(PurchaseOrderItems::Table, PurchaseOrderItems::PoId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_purchase_order_items_po_id")
                        .table(PurchaseOrderItems::Table)
                        .col(PurchaseOrderItems::PoId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        CustomerName,
        Platform,
        CollectionName,
        TotalSkus,
        TotalUnits,
        Status,
        OrderDate,
        RequiredDate,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderItems {
        Table,
        Id,
        PoId,
        LineNumber,
        StyleName,
        Color,
        Size,
        Quantity,
        UnitPrice,
        TotalPrice,
        CreatedAt,
    }
}
