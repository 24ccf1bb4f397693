//! Catalog resolver port and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::SkuId;
use domain::{Money, Weight};

use super::ResolverError;

/// Immutable snapshot of a catalog SKU.
///
/// Copied into the transaction context at resolution time; the catalog
/// subsystem remains the single owner of the live record.
#[derive(Debug, Clone, PartialEq)]
pub struct SkuSnapshot {
    /// Catalog identifier.
    pub sku_id: SkuId,
    /// Product code the devices detect (e.g. "APPLE-001").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Authoritative unit price.
    pub unit_price: Money,
    /// Authoritative unit weight.
    pub weight: Weight,
}

/// Read-only lookup into the product catalog.
#[async_trait]
pub trait CatalogResolver: Send + Sync {
    /// Resolves a detected product code to its catalog snapshot.
    async fn resolve_by_code(&self, code: &str) -> Result<Option<SkuSnapshot>, ResolverError>;
}

#[derive(Debug, Default)]
struct CatalogState {
    skus: HashMap<String, SkuSnapshot>,
    fail_on_resolve: bool,
}

/// In-memory catalog resolver for testing and default wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogResolver {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogResolver {
    /// Creates a new empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a SKU snapshot under its code.
    pub fn insert(&self, sku: SkuSnapshot) {
        self.state
            .write()
            .unwrap()
            .skus
            .insert(sku.code.clone(), sku);
    }

    /// Configures the resolver to fail all lookups.
    pub fn set_fail_on_resolve(&self, fail: bool) {
        self.state.write().unwrap().fail_on_resolve = fail;
    }
}

#[async_trait]
impl CatalogResolver for InMemoryCatalogResolver {
    async fn resolve_by_code(&self, code: &str) -> Result<Option<SkuSnapshot>, ResolverError> {
        let state = self.state.read().unwrap();
        if state.fail_on_resolve {
            return Err(ResolverError::Unavailable("catalog offline".to_string()));
        }
        Ok(state.skus.get(code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Currency;

    fn snapshot(code: &str) -> SkuSnapshot {
        SkuSnapshot {
            sku_id: SkuId::new(),
            code: code.to_string(),
            name: "Apple".to_string(),
            unit_price: Money::new(250, Currency::USD).unwrap(),
            weight: Weight::new(150.0).unwrap(),
        }
    }

    #[tokio::test]
    async fn resolves_registered_codes() {
        let resolver = InMemoryCatalogResolver::new();
        resolver.insert(snapshot("APPLE-001"));

        let found = resolver.resolve_by_code("APPLE-001").await.unwrap();
        assert_eq!(found.unwrap().code, "APPLE-001");

        let missing = resolver.resolve_by_code("UNKNOWN").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn fail_on_resolve() {
        let resolver = InMemoryCatalogResolver::new();
        resolver.insert(snapshot("APPLE-001"));
        resolver.set_fail_on_resolve(true);

        let result = resolver.resolve_by_code("APPLE-001").await;
        assert!(matches!(result, Err(ResolverError::Unavailable(_))));
    }
}
