mod common;

use std::io::Write;

use arch4_api::{
    entities::{purchase_order, purchase_order_item, PurchaseOrderStatus},
    errors::ServiceError,
    events::Event,
    services::order_processor::OrderRow,
    ApiResponse,
};
use assert_matches::assert_matches;
use common::{csv_feed, TestContext};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};

fn row(po: &str, style: &str, qty: i32, price: Decimal) -> OrderRow {
    OrderRow {
        po_number: po.to_string(),
        customer_name: Some("Harrods".to_string()),
        style: style.to_string(),
        price,
        color: Some("Navy".to_string()),
        size: Some("M".to_string()),
        collection_name: Some("Spring 2025".to_string()),
        quantity: qty,
    }
}

async fn po_count(ctx: &TestContext) -> u64 {
    purchase_order::Entity::find()
        .count(&*ctx.db)
        .await
        .expect("count purchase orders")
}

#[tokio::test]
async fn rows_sharing_a_po_number_become_one_order() {
    let mut ctx = TestContext::new().await;
    let feed = csv_feed(&[
        "PO-001,Harrods,Knightsbridge Jacket,120.00,Navy,M,Spring 2025,10",
        "PO-001,Harrods,Oxford Loafer,85.50,Black,42,Spring 2025,15",
    ]);

    let summary = ctx
        .factory
        .order_processor()
        .process_csv(feed.as_bytes())
        .await
        .expect("ingest");

    assert_eq!(summary.orders.len(), 1);
    let order = &summary.orders[0];
    assert_eq!(order.po_number, "PO-001");
    assert_eq!(order.total_skus, 2);
    assert_eq!(order.total_units, 25);
    assert_eq!(order.customer.as_deref(), Some("Harrods"));

    let detail = ctx
        .factory
        .order_processor()
        .get_purchase_order(order.id)
        .await
        .expect("detail");
    assert_eq!(detail.order.status, PurchaseOrderStatus::Received);
    assert_eq!(detail.order.platform.as_deref(), Some("nuorder"));
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].style_name, "Knightsbridge Jacket");
    assert_eq!(detail.items[0].total_price, dec!(1200.00));
    assert_eq!(detail.items[1].total_price, dec!(1282.50));

    assert!(ctx.drain_events().iter().any(|e| matches!(
        e,
        Event::PurchaseOrderReceived { po_number, total_units: 25, .. } if po_number == "PO-001"
    )));
}

#[tokio::test]
async fn groups_are_processed_in_first_seen_order() {
    let ctx = TestContext::new().await;
    let summary = ctx
        .factory
        .order_processor()
        .process_orders(vec![
            row("PO-B", "Coat", 1, dec!(10)),
            row("PO-A", "Coat", 2, dec!(10)),
            row("PO-B", "Scarf", 3, dec!(10)),
        ])
        .await
        .expect("ingest");

    let numbers: Vec<&str> = summary.orders.iter().map(|o| o.po_number.as_str()).collect();
    assert_eq!(numbers, vec!["PO-B", "PO-A"]);
    assert_eq!(summary.orders[0].total_units, 4);
    assert_eq!(summary.message, "Processed 2 purchase orders");
}

#[tokio::test]
async fn a_bad_line_rolls_back_the_whole_batch() {
    let ctx = TestContext::new().await;
    let rows = vec![
        row("PO-100", "Coat", 1, dec!(10)),
        row("PO-100", "Scarf", 2, dec!(10)),
        row("PO-101", "Loafer", 0, dec!(10)),
        row("PO-102", "Belt", 4, dec!(10)),
        row("PO-102", "Bag", 5, dec!(10)),
    ];

    let result = ctx.factory.order_processor().process_orders(rows).await;
    assert_matches!(result, Err(ServiceError::DatabaseError(_)));
    assert_eq!(po_count(&ctx).await, 0);
    assert_eq!(
        purchase_order_item::Entity::find()
            .count(&*ctx.db)
            .await
            .expect("count items"),
        0
    );
}

#[tokio::test]
async fn line_total_overflow_is_rejected_without_panicking() {
    let ctx = TestContext::new().await;
    let result = ctx
        .factory
        .order_processor()
        .process_orders(vec![
            row("PO-200", "Coat", 1, dec!(10)),
            row("PO-201", "Coat", 2, Decimal::MAX),
        ])
        .await;

    assert_matches!(result, Err(ServiceError::InvalidInput(msg)) if msg.contains("PO-201 line 1"));
    assert_eq!(po_count(&ctx).await, 0);
}

#[tokio::test]
async fn negative_prices_roll_back_the_batch() {
    let ctx = TestContext::new().await;
    let result = ctx
        .factory
        .order_processor()
        .process_orders(vec![row("PO-210", "Coat", 1, dec!(-5.00))])
        .await;

    assert_matches!(result, Err(ServiceError::DatabaseError(_)));
    assert_eq!(po_count(&ctx).await, 0);
}

#[tokio::test]
async fn failure_is_reported_as_a_structured_result() {
    let ctx = TestContext::new().await;
    let processor = ctx.factory.order_processor();
    processor
        .process_orders(vec![row("PO-7", "Coat", 1, dec!(10))])
        .await
        .expect("first import");

    // Re-importing an existing PO number violates the unique index
    let response = ApiResponse::from(
        processor
            .process_orders(vec![row("PO-8", "Coat", 1, dec!(10)), row("PO-7", "Coat", 1, dec!(10))])
            .await,
    );
    assert!(!response.success);
    assert!(response.data.is_none());
    assert!(response.message.is_some());
    assert_eq!(po_count(&ctx).await, 1);
}

#[tokio::test]
async fn malformed_feed_is_a_parse_error() {
    let ctx = TestContext::new().await;
    let processor = ctx.factory.order_processor();

    let missing_column = "po_number,customer_name,style,price,color,size,collection_name\n\
                          PO-1,Harrods,Coat,10.00,Navy,M,Spring\n";
    assert_matches!(
        processor.process_csv(missing_column.as_bytes()).await,
        Err(ServiceError::ParseError(_))
    );

    let bad_quantity = csv_feed(&["PO-1,Harrods,Coat,10.00,Navy,M,Spring,two"]);
    assert_matches!(
        processor.process_csv(bad_quantity.as_bytes()).await,
        Err(ServiceError::ParseError(_))
    );
    assert_eq!(po_count(&ctx).await, 0);
}

#[tokio::test]
async fn csv_file_on_disk_is_ingested() {
    let ctx = TestContext::new().await;
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "{}",
        csv_feed(&[
            "PO-300,Selfridges,Paisley Silk Scarf,$45.00,Red,,AW25,3",
            "PO-301,Liberty,Oxford Loafer,85.50,Black,42,AW25,2",
        ])
    )
    .expect("write feed");

    let summary = ctx
        .factory
        .order_processor()
        .process_csv_file(file.path())
        .await
        .expect("ingest file");
    assert_eq!(summary.orders.len(), 2);

    let detail = ctx
        .factory
        .order_processor()
        .get_purchase_order(summary.orders[0].id)
        .await
        .expect("detail");
    assert_eq!(detail.items[0].size, None);
    assert_eq!(detail.items[0].unit_price, dec!(45.00));
}

#[tokio::test]
async fn missing_file_is_invalid_input() {
    let ctx = TestContext::new().await;
    assert_matches!(
        ctx.factory
            .order_processor()
            .process_csv_file("/definitely/not/here.csv")
            .await,
        Err(ServiceError::InvalidInput(_))
    );
}

#[tokio::test]
async fn status_only_moves_forward() {
    let ctx = TestContext::new().await;
    let processor = ctx.factory.order_processor();
    let summary = processor
        .process_orders(vec![row("PO-900", "Coat", 1, dec!(10))])
        .await
        .expect("ingest");
    let id = summary.orders[0].id;

    let updated = processor
        .update_status(id, PurchaseOrderStatus::Invoiced)
        .await
        .expect("forward move");
    assert_eq!(updated.status, PurchaseOrderStatus::Invoiced);

    let unchanged = processor
        .update_status(id, PurchaseOrderStatus::Invoiced)
        .await
        .expect("same status is a no-op");
    assert_eq!(unchanged.status, PurchaseOrderStatus::Invoiced);

    assert_matches!(
        processor.update_status(id, PurchaseOrderStatus::Received).await,
        Err(ServiceError::InvalidStatus(_))
    );

    let invoiced = processor
        .list_purchase_orders(Some(PurchaseOrderStatus::Invoiced))
        .await
        .expect("list");
    assert_eq!(invoiced.len(), 1);
    assert!(processor
        .list_purchase_orders(Some(PurchaseOrderStatus::Shipped))
        .await
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn unknown_purchase_order_is_not_found() {
    let ctx = TestContext::new().await;
    assert_matches!(
        ctx.factory
            .order_processor()
            .update_status(uuid::Uuid::new_v4(), PurchaseOrderStatus::Shipped)
            .await,
        Err(ServiceError::NotFound(_))
    );
}
