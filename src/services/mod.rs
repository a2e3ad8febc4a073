// Matching core
pub mod normalizer;
pub mod product_matcher;
pub mod reconciliation;
pub mod similarity;

// Purchase orders and stock
pub mod inventory;
pub mod order_processor;

// Catalog administration
pub mod catalog;

// Service factory for dependency injection
pub mod factory;
