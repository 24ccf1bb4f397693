//! SubmitDetection use case: the detection reconciliation algorithm.

use common::{DeviceId, SessionId};
use domain::{
    DetectedItem, DetectionPolicy, DomainError, SessionRepository, SessionStatus, Weight,
};

use crate::error::{AppError, Result};
use crate::ports::{CatalogResolver, EventSink};
use crate::publish_events;

/// A raw machine-vision observation reported by the device.
#[derive(Debug, Clone)]
pub struct RawDetection {
    /// Detected product code.
    pub product_code: String,
    /// Device-reported confidence in [0, 1].
    pub confidence: f64,
}

/// Command carrying a full detection snapshot from the device.
#[derive(Debug, Clone)]
pub struct SubmitDetection {
    pub session_id: SessionId,
    /// Reporting device; informational, the session already knows its device.
    pub device_id: DeviceId,
    pub detections: Vec<RawDetection>,
    /// Scale reading for the entire contents, in grams.
    pub total_weight_grams: f64,
}

/// A detection enriched with authoritative catalog data, for display.
#[derive(Debug, Clone)]
pub struct ReconciledItem {
    pub code: String,
    pub name: String,
    pub unit_price_minor: i64,
    pub currency: String,
    pub confidence: f64,
}

/// Result of a reconciled detection submission.
#[derive(Debug, Clone)]
pub struct SubmitDetectionResult {
    pub session_id: SessionId,
    pub items: Vec<ReconciledItem>,
    pub total_minor: i64,
    pub currency: String,
    /// Whether the measured weight matched the catalog's expectation.
    pub weight_match: bool,
    /// True when automated reconciliation was inconclusive and a
    /// secondary verification path should be triggered.
    pub needs_fallback: bool,
}

/// Orchestrates detection reconciliation.
///
/// Always returns the best obtainable answer plus a fallback signal,
/// and never blocks the customer flow on an inconclusive read.
pub struct SubmitDetectionHandler<R, C, E> {
    sessions: R,
    catalog: C,
    events: E,
    policy: DetectionPolicy,
}

impl<R, C, E> SubmitDetectionHandler<R, C, E>
where
    R: SessionRepository,
    C: CatalogResolver,
    E: EventSink,
{
    /// Creates a handler with the default detection policy.
    pub fn new(sessions: R, catalog: C, events: E) -> Self {
        Self::with_policy(sessions, catalog, events, DetectionPolicy::default())
    }

    /// Creates a handler with a custom detection policy.
    pub fn with_policy(sessions: R, catalog: C, events: E, policy: DetectionPolicy) -> Self {
        Self {
            sessions,
            catalog,
            events,
            policy,
        }
    }

    /// Reconciles a detection snapshot against the catalog and scale.
    ///
    /// 1. Load the session; reject missing or non-active ones. The
    ///    status check here is time-blind; the aggregate distinguishes
    ///    expiry on the write path below.
    /// 2. Resolve each detection against the catalog. Unresolvable or
    ///    failing lookups drop the item and flag fallback; low
    ///    confidence flags fallback without dropping.
    /// 3. Compare accumulated expected weight with the scale reading.
    /// 4. Record the snapshot on the aggregate, persist, publish.
    #[tracing::instrument(skip(self, cmd), fields(session_id = %cmd.session_id))]
    pub async fn handle(&self, cmd: SubmitDetection) -> Result<SubmitDetectionResult> {
        let mut session = self
            .sessions
            .find_by_id(cmd.session_id)
            .await?
            .ok_or(AppError::SessionNotFound(cmd.session_id))?;

        if session.status() != SessionStatus::Active {
            return Err(DomainError::SessionNotActive {
                status: session.status(),
            }
            .into());
        }

        let measured = Weight::new(cmd.total_weight_grams)?;

        let mut items = Vec::with_capacity(cmd.detections.len());
        let mut expected = Weight::zero();
        let mut needs_fallback = false;

        for raw in &cmd.detections {
            let sku = match self.catalog.resolve_by_code(&raw.product_code).await {
                Ok(Some(sku)) => sku,
                Ok(None) => {
                    // Never invent data for an unresolvable code.
                    tracing::debug!(code = %raw.product_code, "unresolvable product code");
                    needs_fallback = true;
                    continue;
                }
                Err(err) => {
                    tracing::warn!(code = %raw.product_code, error = %err, "catalog lookup failed");
                    needs_fallback = true;
                    continue;
                }
            };

            if !self.policy.is_confidence_acceptable(raw.confidence) {
                needs_fallback = true;
            }

            expected = expected.add(sku.weight);
            items.push(DetectedItem::new(
                sku.sku_id,
                sku.code,
                sku.name,
                raw.confidence,
                sku.unit_price,
            ));
        }

        let weight_match = self.policy.is_weight_match(expected, measured);
        if !weight_match {
            needs_fallback = true;
        }

        if let Err(err) = session.record_detection(items, measured) {
            // The lazy expiry transition must survive the failure so a
            // later read observes the expired status.
            if err == DomainError::SessionExpired {
                self.sessions.save(&session).await?;
            }
            return Err(err.into());
        }

        self.sessions.save(&session).await?;
        publish_events(&self.events, &mut session).await;

        metrics::counter!("detections_submitted_total").increment(1);
        if needs_fallback {
            metrics::counter!("detections_needing_fallback_total").increment(1);
        }

        let items = session
            .items()
            .iter()
            .map(|item| ReconciledItem {
                code: item.code.clone(),
                name: item.name.clone(),
                unit_price_minor: item.unit_price.minor_units(),
                currency: item.unit_price.currency().to_string(),
                confidence: item.confidence,
            })
            .collect();

        Ok(SubmitDetectionResult {
            session_id: session.id(),
            items,
            total_minor: session.total_amount().minor_units(),
            currency: session.total_amount().currency().to_string(),
            weight_match,
            needs_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{InMemoryCatalogResolver, InMemoryEventSink, SkuSnapshot};
    use common::SkuId;
    use domain::{Currency, Money, Session};
    use session_store::InMemorySessionStore;

    fn sku(code: &str, name: &str, price_minor: i64, weight_grams: f64) -> SkuSnapshot {
        SkuSnapshot {
            sku_id: SkuId::new(),
            code: code.to_string(),
            name: name.to_string(),
            unit_price: Money::new(price_minor, Currency::USD).unwrap(),
            weight: Weight::new(weight_grams).unwrap(),
        }
    }

    fn detection(code: &str, confidence: f64) -> RawDetection {
        RawDetection {
            product_code: code.to_string(),
            confidence,
        }
    }

    struct Fixture {
        handler: SubmitDetectionHandler<
            InMemorySessionStore,
            InMemoryCatalogResolver,
            InMemoryEventSink,
        >,
        store: InMemorySessionStore,
        catalog: InMemoryCatalogResolver,
        sink: InMemoryEventSink,
    }

    fn setup() -> Fixture {
        let store = InMemorySessionStore::new();
        let catalog = InMemoryCatalogResolver::new();
        let sink = InMemoryEventSink::new();
        catalog.insert(sku("APPLE-001", "Fuji Apple", 250, 150.0));
        catalog.insert(sku("APPLE-002", "Gala Apple", 230, 140.0));

        Fixture {
            handler: SubmitDetectionHandler::new(store.clone(), catalog.clone(), sink.clone()),
            store,
            catalog,
            sink,
        }
    }

    async fn seed_session(store: &InMemorySessionStore, expiration_minutes: i64) -> SessionId {
        let mut session = Session::new(DeviceId::new(), None, expiration_minutes).unwrap();
        session.take_events();
        store.save(&session).await.unwrap();
        session.id()
    }

    fn cmd(session_id: SessionId, detections: Vec<RawDetection>, grams: f64) -> SubmitDetection {
        SubmitDetection {
            session_id,
            device_id: DeviceId::new(),
            detections,
            total_weight_grams: grams,
        }
    }

    #[tokio::test]
    async fn clean_detection_reconciles_without_fallback() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;

        let result = f
            .handler
            .handle(cmd(
                session_id,
                vec![detection("APPLE-001", 0.95), detection("APPLE-002", 0.92)],
                290.0,
            ))
            .await
            .unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.total_minor, 480);
        assert_eq!(result.currency, "USD");
        assert!(result.weight_match);
        assert!(!result.needs_fallback);

        let session = f.store.find_by_id(session_id).await.unwrap().unwrap();
        assert_eq!(session.items().len(), 2);
        assert_eq!(session.total_amount().minor_units(), 480);
        assert_eq!(session.total_weight().grams(), 290.0);

        assert_eq!(f.sink.published_count(), 1);
        assert_eq!(f.sink.published()[0].event_name(), "ItemsDetected");
    }

    #[tokio::test]
    async fn low_confidence_is_included_but_flagged() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;

        let result = f
            .handler
            .handle(cmd(session_id, vec![detection("APPLE-001", 0.60)], 150.0))
            .await
            .unwrap();

        // The item still contributes to the total; only the flag is set.
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.total_minor, 250);
        assert!(result.weight_match);
        assert!(result.needs_fallback);
    }

    #[tokio::test]
    async fn unresolvable_code_is_dropped_and_flagged() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;

        let result = f
            .handler
            .handle(cmd(
                session_id,
                vec![detection("APPLE-001", 0.95), detection("MYSTERY-999", 0.99)],
                150.0,
            ))
            .await
            .unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].code, "APPLE-001");
        assert_eq!(result.total_minor, 250);
        assert!(result.needs_fallback);
    }

    #[tokio::test]
    async fn catalog_outage_degrades_per_item_without_aborting() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;
        f.catalog.set_fail_on_resolve(true);

        let result = f
            .handler
            .handle(cmd(session_id, vec![detection("APPLE-001", 0.95)], 0.0))
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.total_minor, 0);
        assert!(result.needs_fallback);
    }

    #[tokio::test]
    async fn weight_mismatch_sets_fallback() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;

        // Expected 150g, measured 200g: outside the 10g tolerance.
        let result = f
            .handler
            .handle(cmd(session_id, vec![detection("APPLE-001", 0.95)], 200.0))
            .await
            .unwrap();

        assert!(!result.weight_match);
        assert!(result.needs_fallback);
        assert_eq!(result.items.len(), 1);
    }

    #[tokio::test]
    async fn custom_policy_changes_the_thresholds() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;
        let lenient = DetectionPolicy::new(0.50, 100.0).unwrap();
        let handler = SubmitDetectionHandler::with_policy(
            f.store.clone(),
            f.catalog.clone(),
            f.sink.clone(),
            lenient,
        );

        let result = handler
            .handle(cmd(session_id, vec![detection("APPLE-001", 0.60)], 200.0))
            .await
            .unwrap();

        assert!(result.weight_match);
        assert!(!result.needs_fallback);
    }

    #[tokio::test]
    async fn unknown_session_fails_not_found() {
        let f = setup();

        let result = f
            .handler
            .handle(cmd(SessionId::new(), vec![detection("APPLE-001", 0.95)], 150.0))
            .await;

        assert!(matches!(result, Err(AppError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn cancelled_session_fails_not_active() {
        let f = setup();
        let mut session = Session::new(DeviceId::new(), None, 30).unwrap();
        session.cancel("abandoned").unwrap();
        session.take_events();
        f.store.save(&session).await.unwrap();

        let result = f
            .handler
            .handle(cmd(session.id(), vec![detection("APPLE-001", 0.95)], 150.0))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::SessionNotActive { .. }))
        ));
    }

    #[tokio::test]
    async fn lapsed_session_fails_expired_and_persists_the_transition() {
        let f = setup();
        let session_id = seed_session(&f.store, 0).await;

        let result = f
            .handler
            .handle(cmd(session_id, vec![detection("APPLE-001", 0.95)], 150.0))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::SessionExpired))
        ));

        // The status flip is durable: a later read observes `expired`.
        let session = f.store.find_by_id(session_id).await.unwrap().unwrap();
        assert_eq!(session.status(), SessionStatus::Expired);
        assert_eq!(f.sink.published_count(), 0);
    }

    #[tokio::test]
    async fn negative_weight_is_rejected() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;

        let result = f
            .handler
            .handle(cmd(session_id, vec![detection("APPLE-001", 0.95)], -1.0))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::InvalidWeight { .. }))
        ));
    }

    #[tokio::test]
    async fn save_failure_aborts_before_publishing() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;
        f.store.set_fail_on_save(true).await;

        let result = f
            .handler
            .handle(cmd(session_id, vec![detection("APPLE-001", 0.95)], 150.0))
            .await;

        assert!(matches!(result, Err(AppError::Repository(_))));
        assert_eq!(f.sink.published_count(), 0);
    }

    #[tokio::test]
    async fn resubmission_replaces_the_previous_snapshot() {
        let f = setup();
        let session_id = seed_session(&f.store, 30).await;

        f.handler
            .handle(cmd(
                session_id,
                vec![detection("APPLE-001", 0.95), detection("APPLE-002", 0.92)],
                290.0,
            ))
            .await
            .unwrap();

        let result = f
            .handler
            .handle(cmd(session_id, vec![detection("APPLE-002", 0.97)], 140.0))
            .await
            .unwrap();

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.total_minor, 230);

        let session = f.store.find_by_id(session_id).await.unwrap().unwrap();
        assert_eq!(session.items().len(), 1);
        assert_eq!(session.total_amount().minor_units(), 230);
    }
}
