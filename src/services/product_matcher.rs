use std::sync::Arc;

use metrics::counter;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::entities::ProductModel;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::repositories::{
    CatalogReader, MappingRepository, MappingStore, NewMapping, ProductRepository,
};
use crate::services::normalizer::normalize;
use crate::services::reconciliation::{ReconciliationSink, ReviewSuggestion};
use crate::services::similarity::{partial_ratio, ratio, token_set_ratio, token_sort_ratio};

const SKU_EXACT_CONFIDENCE: f64 = 1.0;
const MAPPING_EXISTS_CONFIDENCE: f64 = 0.95;
const NEW_PRODUCT_MESSAGE: &str = "No suitable match found. Queued for new product creation.";

/// Weights of the four fuzzy scores in the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub ratio: f64,
    pub partial_ratio: f64,
    pub token_sort_ratio: f64,
    pub token_set_ratio: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            partial_ratio: 1.0,
            token_sort_ratio: 1.0,
            token_set_ratio: 2.0,
        }
    }
}

impl ScoreWeights {
    fn total(&self) -> f64 {
        self.ratio + self.partial_ratio + self.token_sort_ratio + self.token_set_ratio
    }

    /// Weighted mean of the component scores, 0–100.
    pub fn combine(&self, scores: &ComponentScores) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        (self.ratio * scores.ratio
            + self.partial_ratio * scores.partial_ratio
            + self.token_sort_ratio * scores.token_sort_ratio
            + self.token_set_ratio * scores.token_set_ratio)
            / total
    }
}

/// The four similarity scores of one candidate, each 0–100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    pub ratio: f64,
    pub partial_ratio: f64,
    pub token_sort_ratio: f64,
    pub token_set_ratio: f64,
}

impl ComponentScores {
    /// Scores two already-normalized names.
    pub fn between(a: &str, b: &str) -> Self {
        Self {
            ratio: ratio(a, b),
            partial_ratio: partial_ratio(a, b),
            token_sort_ratio: token_sort_ratio(a, b),
            token_set_ratio: token_set_ratio(a, b),
        }
    }
}

/// Matcher tuning, loaded from the `matcher` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherConfig {
    /// At or above: mapping is accepted automatically
    pub auto_accept_threshold: f64,
    /// At or above (and below auto-accept): queued for manual review
    pub review_threshold: f64,
    pub weights: ScoreWeights,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            auto_accept_threshold: 0.8,
            review_threshold: 0.5,
            weights: ScoreWeights::default(),
        }
    }
}

impl MatcherConfig {
    pub fn check(&self) -> Result<(), String> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.auto_accept_threshold) || !in_unit(self.review_threshold) {
            return Err("Thresholds must lie within [0, 1]".to_string());
        }
        if self.review_threshold > self.auto_accept_threshold {
            return Err(format!(
                "review_threshold ({}) must not exceed auto_accept_threshold ({})",
                self.review_threshold, self.auto_accept_threshold
            ));
        }
        let w = &self.weights;
        if [w.ratio, w.partial_ratio, w.token_sort_ratio, w.token_set_ratio]
            .iter()
            .any(|v| *v < 0.0 || !v.is_finite())
        {
            return Err("Score weights must be finite and non-negative".to_string());
        }
        if w.total() <= 0.0 {
            return Err("At least one score weight must be positive".to_string());
        }
        Ok(())
    }

    /// Maps a fuzzy confidence onto its outcome.
    pub fn classify(&self, confidence: f64) -> MatchType {
        if confidence >= self.auto_accept_threshold {
            MatchType::FuzzyAuto
        } else if confidence >= self.review_threshold {
            MatchType::ManualReviewRequired
        } else {
            MatchType::NewProductRequired
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchType {
    SkuExact,
    MappingExists,
    FuzzyAuto,
    ManualReviewRequired,
    NewProductRequired,
}

/// An external product identity to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub name: String,
    pub sku: Option<String>,
    pub platform: String,
    pub external_id: Option<String>,
}

impl MatchRequest {
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sku: None,
            platform: platform.into(),
            external_id: None,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub product_id: Option<Uuid>,
    pub confidence: f64,
    pub match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_match: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MatchResult {
    fn matched(product: &ProductModel, confidence: f64, match_type: MatchType) -> Self {
        Self {
            product_id: Some(product.id),
            confidence,
            match_type,
            matched_name: Some(product.name.clone()),
            suggested_match: None,
            suggested_id: None,
            message: None,
        }
    }

    fn review(product: &ProductModel, confidence: f64) -> Self {
        Self {
            product_id: None,
            confidence,
            match_type: MatchType::ManualReviewRequired,
            matched_name: None,
            suggested_match: Some(product.name.clone()),
            suggested_id: Some(product.id),
            message: None,
        }
    }

    fn new_product() -> Self {
        Self {
            product_id: None,
            confidence: 0.0,
            match_type: MatchType::NewProductRequired,
            matched_name: None,
            suggested_match: None,
            suggested_id: None,
            message: Some(NEW_PRODUCT_MESSAGE.to_string()),
        }
    }
}

/// Highest-scoring product for an already-normalized name, with its combined
/// score (0–100). Ties keep the earliest candidate; a zero score never wins.
pub fn best_fuzzy_candidate<'a>(
    normalized_name: &str,
    products: &'a [ProductModel],
    weights: &ScoreWeights,
) -> Option<(&'a ProductModel, f64)> {
    let mut best: Option<(&ProductModel, f64)> = None;
    for product in products {
        let candidate = normalize(&product.name);
        let score = weights.combine(&ComponentScores::between(normalized_name, &candidate));
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((product, score));
        }
    }
    best
}

/// Resolves external product identities onto the canonical catalog.
#[derive(Clone)]
pub struct ProductMatcher {
    catalog: Arc<dyn CatalogReader>,
    mappings: Arc<dyn MappingStore>,
    sink: Arc<dyn ReconciliationSink>,
    config: MatcherConfig,
    event_sender: Option<EventSender>,
}

impl ProductMatcher {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        mappings: Arc<dyn MappingStore>,
        sink: Arc<dyn ReconciliationSink>,
        config: MatcherConfig,
    ) -> Self {
        Self {
            catalog,
            mappings,
            sink,
            config,
            event_sender: None,
        }
    }

    /// Matcher over the sea-orm repositories.
    pub fn with_db(
        db: Arc<DatabaseConnection>,
        sink: Arc<dyn ReconciliationSink>,
        config: MatcherConfig,
    ) -> Self {
        Self::new(
            Arc::new(ProductRepository::new(db.clone())),
            Arc::new(MappingRepository::new(db)),
            sink,
            config,
        )
    }

    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Runs the strategy chain: exact SKU, existing mapping, then fuzzy name.
    #[instrument(skip(self), fields(platform = %request.platform))]
    pub async fn find_best_match(&self, request: &MatchRequest) -> Result<MatchResult, ServiceError> {
        let result = self.run_strategies(request).await?;
        counter!("arch4.match.outcome", 1, "match_type" => result.match_type.to_string());
        info!(
            match_type = %result.match_type,
            confidence = result.confidence,
            "product match resolved"
        );
        Ok(result)
    }

    async fn run_strategies(&self, request: &MatchRequest) -> Result<MatchResult, ServiceError> {
        if let Some(sku) = request.sku.as_deref().filter(|s| !s.trim().is_empty()) {
            if let Some(product) = self.catalog.find_by_sku(sku).await? {
                self.record_mapping(&product, request, MatchType::SkuExact)
                    .await?;
                return Ok(MatchResult::matched(
                    &product,
                    SKU_EXACT_CONFIDENCE,
                    MatchType::SkuExact,
                ));
            }
        }

        if let Some(external_id) = request.external_id.as_deref() {
            if let Some(mapping) = self
                .mappings
                .find_by_platform_and_external_id(&request.platform, external_id)
                .await?
            {
                let product = self.catalog.find_by_id(mapping.product_id).await?;
                return Ok(MatchResult {
                    product_id: Some(mapping.product_id),
                    confidence: MAPPING_EXISTS_CONFIDENCE,
                    match_type: MatchType::MappingExists,
                    matched_name: product.map(|p| p.name),
                    suggested_match: None,
                    suggested_id: None,
                    message: None,
                });
            }
        }

        let normalized = normalize(&request.name);
        let products = self.catalog.list_active().await?;
        debug!(candidates = products.len(), normalized = %normalized, "fuzzy scan");

        let best = best_fuzzy_candidate(&normalized, &products, &self.config.weights);
        let confidence = best.map_or(0.0, |(_, score)| score / 100.0);

        match (best, self.config.classify(confidence)) {
            (Some((product, _)), MatchType::FuzzyAuto) => {
                self.record_mapping(product, request, MatchType::FuzzyAuto)
                    .await?;
                Ok(MatchResult::matched(product, confidence, MatchType::FuzzyAuto))
            }
            (Some((product, _)), MatchType::ManualReviewRequired) => {
                self.sink
                    .enqueue_review(
                        request.clone(),
                        ReviewSuggestion {
                            product_id: product.id,
                            product_name: product.name.clone(),
                            confidence,
                        },
                    )
                    .await?;
                Ok(MatchResult::review(product, confidence))
            }
            _ => {
                self.sink.enqueue_new_product(request.clone()).await?;
                Ok(MatchResult::new_product())
            }
        }
    }

    async fn record_mapping(
        &self,
        product: &ProductModel,
        request: &MatchRequest,
        match_type: MatchType,
    ) -> Result<(), ServiceError> {
        self.mappings
            .save(NewMapping {
                product_id: product.id,
                platform: request.platform.clone(),
                external_id: request.external_id.clone(),
                external_name: Some(request.name.clone()),
                sku: request.sku.clone(),
            })
            .await?;

        if let Some(sender) = &self.event_sender {
            let event = Event::ProductMapped {
                product_id: product.id,
                platform: request.platform.clone(),
                external_id: request.external_id.clone(),
                match_type: match_type.to_string(),
            };
            if let Err(e) = sender.send(event).await {
                warn!("Failed to publish ProductMapped event: {}", e);
            }
        }
        Ok(())
    }
}
