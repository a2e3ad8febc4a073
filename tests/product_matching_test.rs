mod common;

use arch4_api::{
    entities::product_mapping,
    events::Event,
    services::product_matcher::{MatchRequest, MatchType, MatcherConfig},
};
use common::TestContext;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

async fn mapping_count(ctx: &TestContext, platform: &str) -> u64 {
    product_mapping::Entity::find()
        .filter(product_mapping::Column::Platform.eq(platform))
        .count(&*ctx.db)
        .await
        .expect("count mappings")
}

#[tokio::test]
async fn sku_match_records_a_mapping_then_mapping_is_reused() {
    let mut ctx = TestContext::new().await;
    let watch = ctx.seed_product("KB-WATCH-01", "Knights Bridge Watch").await;
    let matcher = ctx.factory.product_matcher();

    let first = matcher
        .find_best_match(
            &MatchRequest::new("KB Watch (Gold)", "shopify")
                .with_sku("KB-WATCH-01")
                .with_external_id("gid://shopify/Product/1"),
        )
        .await
        .expect("sku match");
    assert_eq!(first.match_type, MatchType::SkuExact);
    assert_eq!(first.confidence, 1.0);
    assert_eq!(first.product_id, Some(watch.id));
    assert_eq!(mapping_count(&ctx, "shopify").await, 1);

    // Same platform identity, no SKU this time: resolved through the stored mapping
    let second = matcher
        .find_best_match(
            &MatchRequest::new("something else entirely", "shopify")
                .with_external_id("gid://shopify/Product/1"),
        )
        .await
        .expect("mapping match");
    assert_eq!(second.match_type, MatchType::MappingExists);
    assert_eq!(second.confidence, 0.95);
    assert_eq!(second.product_id, Some(watch.id));
    assert_eq!(second.matched_name.as_deref(), Some("Knights Bridge Watch"));
    assert_eq!(mapping_count(&ctx, "shopify").await, 1);

    let events = ctx.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        Event::ProductMapped { product_id, match_type, .. }
            if *product_id == watch.id && match_type == "sku_exact"
    )));
}

#[tokio::test]
async fn saving_the_same_identity_twice_repoints_instead_of_duplicating() {
    let ctx = TestContext::new().await;
    let old = ctx.seed_product("OLD-1", "Oxford Loafer").await;
    let new = ctx.seed_product("NEW-1", "Oxford Loafer Suede").await;
    let matcher = ctx.factory.product_matcher();

    for sku in ["OLD-1", "NEW-1"] {
        matcher
            .find_best_match(
                &MatchRequest::new("Oxford Loafer", "nuorder")
                    .with_sku(sku)
                    .with_external_id("NU-500"),
            )
            .await
            .expect("sku match");
    }

    assert_eq!(mapping_count(&ctx, "nuorder").await, 1);
    let stored = product_mapping::Entity::find()
        .filter(product_mapping::Column::ExternalId.eq("NU-500"))
        .one(&*ctx.db)
        .await
        .expect("query")
        .expect("mapping");
    assert_eq!(stored.product_id, new.id);
    assert_ne!(stored.product_id, old.id);
}

#[tokio::test]
async fn normalized_name_is_auto_accepted() {
    let ctx = TestContext::new().await;
    ctx.seed_product("OX-LOAF", "Oxford Loafer").await;
    let jacket = ctx.seed_product("KB-JKT", "Knightsbridge Jacket").await;

    let result = ctx
        .factory
        .product_matcher()
        .find_best_match(&MatchRequest::new("knights-bridge JACKET", "quickbooks").with_external_id("QB-7"))
        .await
        .expect("fuzzy match");

    assert_eq!(result.match_type, MatchType::FuzzyAuto);
    assert_eq!(result.product_id, Some(jacket.id));
    assert!(result.confidence >= 0.8);
    assert_eq!(mapping_count(&ctx, "quickbooks").await, 1);
}

#[tokio::test]
async fn nice_bridge_watch_without_a_similar_product_needs_a_new_product() {
    let mut ctx = TestContext::new().await;
    ctx.seed_product("OX-LOAF", "Oxford Loafer").await;
    ctx.seed_product("SILK-SC", "Paisley Silk Scarf").await;

    let result = ctx
        .factory
        .product_matcher()
        .find_best_match(&MatchRequest::new("nice bridge watch", "shopify"))
        .await
        .expect("match");

    assert_eq!(result.match_type, MatchType::NewProductRequired);
    assert_eq!(result.product_id, None);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(mapping_count(&ctx, "shopify").await, 0);

    let events = ctx.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        Event::NewProductRequested { name, .. } if name == "nice bridge watch"
    )));
}

#[tokio::test]
async fn empty_catalog_is_not_an_error() {
    let ctx = TestContext::new().await;
    let result = ctx
        .factory
        .product_matcher()
        .find_best_match(&MatchRequest::new("anything at all", "shopify"))
        .await
        .expect("match");
    assert_eq!(result.match_type, MatchType::NewProductRequired);
}

#[tokio::test]
async fn inactive_products_are_ignored_by_fuzzy_matching() {
    let ctx = TestContext::new().await;
    let scarf = ctx.seed_product("SILK-SC", "Paisley Silk Scarf").await;
    ctx.catalog()
        .set_active(scarf.id, false)
        .await
        .expect("deactivate");

    let result = ctx
        .factory
        .product_matcher()
        .find_best_match(&MatchRequest::new("Paisley Silk Scarf", "shopify"))
        .await
        .expect("match");
    assert_eq!(result.match_type, MatchType::NewProductRequired);
}

#[tokio::test]
async fn review_band_is_configurable() {
    let mut config = arch4_api::config::AppConfig::new("sqlite::memory:".into(), "test".into());
    config.matcher = MatcherConfig {
        auto_accept_threshold: 0.99,
        review_threshold: 0.3,
        ..MatcherConfig::default()
    };
    let mut ctx = TestContext::with_config(config).await;
    let watch = ctx.seed_product("KB-WATCH", "Knights Bridge Watch").await;

    let result = ctx
        .factory
        .product_matcher()
        .find_best_match(&MatchRequest::new("bridge watch strap", "shopify"))
        .await
        .expect("match");

    assert_eq!(result.match_type, MatchType::ManualReviewRequired);
    assert_eq!(result.suggested_id, Some(watch.id));
    assert_eq!(mapping_count(&ctx, "shopify").await, 0);
    assert!(ctx
        .drain_events()
        .iter()
        .any(|e| matches!(e, Event::MatchReviewRequested { suggested_product_id, .. } if *suggested_product_id == watch.id)));
}
