use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use arch4_api::{
    config::{self, AppConfig},
    db::{self, DbPool},
    entities::{InventoryModel, ProductModel, PurchaseOrderModel, PurchaseOrderStatus},
    errors::ServiceError,
    events::{self, EventSender},
    services::{
        catalog::{CreateProductInput, ProductListQuery},
        factory::{ServiceContainer, ServiceFactory},
        inventory::StockLevel,
        order_processor::AvailabilityReport,
        product_matcher::{MatchRequest, MatchResult},
    },
    ApiResponse,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Error: {:#}", err);
        // 2 for bad input, 1 for system failures
        let client_error = err
            .downcast_ref::<ServiceError>()
            .is_some_and(ServiceError::is_client_error);
        std::process::exit(if client_error { 2 } else { 1 });
    }
}

async fn run(cli: Cli) -> Result<()> {
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Migrations applied");
        }
        Commands::Products(command) => handle_products_command(&context, command, cli.json).await?,
        Commands::Match(args) => handle_match(&context, args, cli.json).await?,
        Commands::Orders(command) => handle_orders_command(&context, command, cli.json).await?,
        Commands::Inventory(command) => {
            handle_inventory_command(&context, command, cli.json).await?
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "arch4",
    about = "Catalog, purchase orders and cross-platform product matching",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    #[command(subcommand)]
    Products(ProductsCommands),
    /// Resolve an external product onto the catalog
    Match(MatchArgs),
    #[command(subcommand)]
    Orders(OrdersCommands),
    #[command(subcommand)]
    Inventory(InventoryCommands),
}

#[derive(Subcommand)]
enum ProductsCommands {
    Create(CreateProductArgs),
    List(ListProductsArgs),
}

#[derive(Args)]
struct CreateProductArgs {
    #[arg(long, help = "Unique SKU")]
    sku: String,
    #[arg(long, help = "Master display name")]
    name: String,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    material: Option<String>,
    #[arg(long, help = "Wholesale price")]
    wholesale_price: Option<Decimal>,
    #[arg(long, help = "Retail price")]
    retail_price: Option<Decimal>,
}

#[derive(Args)]
struct ListProductsArgs {
    #[arg(long, default_value_t = 1)]
    page: u64,
    #[arg(long, default_value_t = 20)]
    limit: u64,
    #[arg(long, help = "Substring of name or SKU")]
    search: Option<String>,
    #[arg(long, help = "Only active (true) or inactive (false) products")]
    active: Option<bool>,
}

#[derive(Args)]
struct MatchArgs {
    #[arg(long, help = "Product name as the platform shows it")]
    name: String,
    #[arg(long)]
    sku: Option<String>,
    #[arg(long, help = "Source platform, e.g. shopify")]
    platform: String,
    #[arg(long, help = "Product id on the source platform")]
    external_id: Option<String>,
}

#[derive(Subcommand)]
enum OrdersCommands {
    /// Ingest a CSV purchase-order feed
    Import(ImportOrdersArgs),
    List(ListOrdersArgs),
    /// Check a purchase order against stock
    Sync(PurchaseOrderIdArgs),
    Status(UpdateStatusArgs),
}

#[derive(Args)]
struct ImportOrdersArgs {
    #[arg(help = "Path to the CSV file")]
    path: PathBuf,
}

#[derive(Args)]
struct ListOrdersArgs {
    #[arg(long, help = "received, processed, invoiced or shipped")]
    status: Option<String>,
}

#[derive(Args)]
struct PurchaseOrderIdArgs {
    #[arg(help = "Purchase order id")]
    id: Uuid,
}

#[derive(Args)]
struct UpdateStatusArgs {
    #[arg(help = "Purchase order id")]
    id: Uuid,
    #[arg(help = "New status")]
    status: String,
}

#[derive(Subcommand)]
enum InventoryCommands {
    Record(RecordStockArgs),
    LowStock,
}

#[derive(Args)]
struct RecordStockArgs {
    #[arg(long)]
    product_id: Uuid,
    #[arg(long, help = "Warehouse location, e.g. warehouse_uk")]
    location: String,
    #[arg(long)]
    available: i32,
    #[arg(long, default_value_t = 0)]
    reserved: i32,
    #[arg(long, default_value_t = 0)]
    incoming: i32,
    #[arg(long, default_value_t = 0)]
    reorder_point: i32,
}

struct CliContext {
    db: Arc<DbPool>,
    services: ServiceContainer,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config: AppConfig = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);

        let (event_sender, event_rx) = EventSender::channel(config.event_channel_capacity);
        tokio::spawn(events::process_events(event_rx));

        let factory = ServiceFactory::new(db.clone(), event_sender, &config);
        let services = ServiceContainer::new(&factory);

        Ok(Self { db, services })
    }
}

async fn handle_products_command(
    context: &CliContext,
    command: ProductsCommands,
    json: bool,
) -> Result<()> {
    match command {
        ProductsCommands::Create(args) => {
            let product = context
                .services
                .catalog
                .create_product(CreateProductInput {
                    sku: args.sku,
                    name: args.name,
                    category: args.category,
                    material: args.material,
                    wholesale_price: args.wholesale_price,
                    retail_price: args.retail_price,
                    ..Default::default()
                })
                .await
                .context("failed to create product")?;
            if json {
                print_json(&product)?;
            } else {
                render_product(&product);
            }
        }
        ProductsCommands::List(args) => {
            let page = context
                .services
                .catalog
                .list_products(ProductListQuery {
                    page: args.page,
                    limit: args.limit,
                    search: args.search,
                    active: args.active,
                })
                .await
                .context("failed to list products")?;
            if json {
                print_json(&page)?;
            } else {
                println!(
                    "Page {}/{} ({} products)",
                    page.page,
                    page.total_pages.max(1),
                    page.total
                );
                page.items.iter().for_each(render_product);
            }
        }
    }
    Ok(())
}

async fn handle_match(context: &CliContext, args: MatchArgs, json: bool) -> Result<()> {
    let request = MatchRequest {
        name: args.name,
        sku: args.sku,
        platform: args.platform,
        external_id: args.external_id,
    };
    let result = context
        .services
        .matcher
        .find_best_match(&request)
        .await
        .context("product matching failed")?;

    if json {
        print_json(&result)?;
    } else {
        render_match(&result);
    }
    Ok(())
}

async fn handle_orders_command(
    context: &CliContext,
    command: OrdersCommands,
    json: bool,
) -> Result<()> {
    let orders = &context.services.orders;
    match command {
        OrdersCommands::Import(args) => {
            let response = ApiResponse::from(orders.process_csv_file(&args.path).await);
            if json {
                print_json(&response)?;
            } else if let Some(summary) = &response.data {
                println!("{}", summary.message);
                for order in &summary.orders {
                    println!(
                        "- {} • customer {} • {} SKUs • {} units",
                        order.po_number,
                        order.customer.as_deref().unwrap_or("-"),
                        order.total_skus,
                        order.total_units
                    );
                }
            }
            if !response.success {
                bail!(
                    "import of {} failed: {}",
                    args.path.display(),
                    response.message.unwrap_or_default()
                );
            }
        }
        OrdersCommands::List(args) => {
            let status = args
                .status
                .as_deref()
                .map(parse_status)
                .transpose()?;
            let list = orders
                .list_purchase_orders(status)
                .await
                .context("failed to list purchase orders")?;
            if json {
                print_json(&list)?;
            } else if list.is_empty() {
                println!("No purchase orders");
            } else {
                list.iter().for_each(render_purchase_order);
            }
        }
        OrdersCommands::Sync(args) => {
            let report = orders
                .sync_with_inventory(args.id)
                .await
                .context("inventory sync failed")?;
            if json {
                print_json(&report)?;
            } else {
                render_report(&report);
            }
        }
        OrdersCommands::Status(args) => {
            let status = parse_status(&args.status)?;
            let updated = orders
                .update_status(args.id, status)
                .await
                .context("failed to update purchase order status")?;
            if json {
                print_json(&updated)?;
            } else {
                render_purchase_order(&updated);
            }
        }
    }
    Ok(())
}

async fn handle_inventory_command(
    context: &CliContext,
    command: InventoryCommands,
    json: bool,
) -> Result<()> {
    let inventory = &context.services.inventory;
    match command {
        InventoryCommands::Record(args) => {
            let record = inventory
                .record_stock(StockLevel {
                    product_id: args.product_id,
                    location: args.location,
                    quantity_available: args.available,
                    quantity_reserved: args.reserved,
                    quantity_incoming: args.incoming,
                    reorder_point: args.reorder_point,
                })
                .await
                .context("failed to record stock")?;
            if json {
                print_json(&record)?;
            } else {
                render_stock(&record);
            }
        }
        InventoryCommands::LowStock => {
            let records = inventory.low_stock().await.context("failed to query low stock")?;
            if json {
                print_json(&records)?;
            } else if records.is_empty() {
                println!("Nothing at or below its reorder point");
            } else {
                records.iter().for_each(render_stock);
            }
        }
    }
    Ok(())
}

fn parse_status(raw: &str) -> Result<PurchaseOrderStatus> {
    PurchaseOrderStatus::from_str(raw).map_err(|_| {
        anyhow!(
            "unknown status '{}'; expected received, processed, invoiced or shipped",
            raw
        )
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_product(product: &ProductModel) {
    println!(
        "- Product {} • {} • SKU {} • {}",
        product.id,
        product.name,
        product.sku,
        if product.is_active { "active" } else { "inactive" }
    );
}

fn render_match(result: &MatchResult) {
    println!(
        "{} (confidence {:.2})",
        result.match_type, result.confidence
    );
    if let (Some(id), Some(name)) = (result.product_id, result.matched_name.as_deref()) {
        println!("  matched {} • {}", id, name);
    }
    if let (Some(id), Some(name)) = (result.suggested_id, result.suggested_match.as_deref()) {
        println!("  suggested {} • {}", id, name);
    }
    if let Some(message) = &result.message {
        println!("  {}", message);
    }
}

fn render_purchase_order(order: &PurchaseOrderModel) {
    println!(
        "- PO {} ({}) • customer {} • status {} • {} SKUs • {} units",
        order.po_number,
        order.id,
        order.customer_name.as_deref().unwrap_or("-"),
        order.status,
        order.total_skus,
        order.total_units
    );
}

fn render_report(report: &AvailabilityReport) {
    println!(
        "PO {}: {} items, {} in stock, {} short",
        report.po_number, report.total_items, report.items_in_stock, report.items_short
    );
    for line in &report.lines {
        println!(
            "  • {} {} {} • requested {} • available {} • shortfall {} • {}",
            line.style_name,
            line.color.as_deref().unwrap_or("-"),
            line.size.as_deref().unwrap_or("-"),
            line.requested,
            line.available,
            line.shortfall,
            line.status
        );
    }
}

fn render_stock(record: &InventoryModel) {
    println!(
        "- {} @ {} • available {} • reserved {} • incoming {} • reorder at {}",
        record.product_id,
        record.location,
        record.quantity_available,
        record.quantity_reserved,
        record.quantity_incoming,
        record.reorder_point
    );
}
