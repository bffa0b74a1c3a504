use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::quotes::domain::{
    DealSelection, IncentiveParameters, ItemId, LineItem, LineItemKind, LinkedProduct, QuoteId,
    QuoteState,
};
use crate::quotes::engine::{EngineConfig, TotalsEngine};
use crate::quotes::pricing::{build_line_item, LineItemDraft};
use crate::quotes::repository::{MemoryQuoteRepository, QuoteRepository, RepositoryError};
use crate::quotes::service::QuoteService;

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn engine() -> TotalsEngine {
    TotalsEngine::new(EngineConfig::default())
}

pub(super) fn effy_deal() -> DealSelection {
    DealSelection {
        deal_id: "EFFY".to_string(),
        deal_ratio: 0.0065,
    }
}

pub(super) fn operation_draft(
    reference: &str,
    unit_price_ttc: f64,
    tva: f64,
    quantity: f64,
    kwh_cumac: Option<f64>,
) -> LineItemDraft {
    LineItemDraft {
        reference: reference.to_string(),
        name: format!("Operation {reference}"),
        quantity,
        unit_price_ttc,
        tva,
        kind: LineItemKind::Operation {
            linked_product: kwh_cumac.map(|kwh_cumac| LinkedProduct { kwh_cumac }),
        },
    }
}

pub(super) fn service_draft(
    reference: &str,
    unit_price_ttc: f64,
    tva: f64,
    quantity: f64,
) -> LineItemDraft {
    LineItemDraft {
        reference: reference.to_string(),
        name: format!("Service {reference}"),
        quantity,
        unit_price_ttc,
        tva,
        kind: LineItemKind::Service {
            subcontractor: None,
        },
    }
}

pub(super) fn product_draft(
    reference: &str,
    unit_price_ttc: f64,
    tva: f64,
    quantity: f64,
) -> LineItemDraft {
    LineItemDraft {
        reference: reference.to_string(),
        name: format!("Product {reference}"),
        quantity,
        unit_price_ttc,
        tva,
        kind: LineItemKind::Product {
            supplier_reference: None,
        },
    }
}

pub(super) fn waste_mention_draft() -> LineItemDraft {
    LineItemDraft {
        reference: crate::quotes::domain::WASTE_MENTION_REFERENCE.to_string(),
        name: "Mention gestion des dechets de chantier".to_string(),
        quantity: 0.0,
        unit_price_ttc: 0.0,
        tva: 0.0,
        kind: LineItemKind::Service {
            subcontractor: None,
        },
    }
}

static FIXTURE_SEQUENCE: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Build a stored line item directly, bypassing the service, for engine
/// tests that want full control over the collection.
pub(super) fn item(draft: LineItemDraft, position: u32) -> LineItem {
    let id = FIXTURE_SEQUENCE.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    build_line_item(draft, ItemId(format!("fixture-{id:06}")), position)
}

/// The reference scenario: one heat-pump operation with its installation
/// service and the waste mention.
pub(super) fn scenario_items() -> Vec<LineItem> {
    vec![
        item(operation_draft("BAR-TH-171", 9500.0, 5.5, 1.0, Some(615_400.0)), 1),
        item(service_draft("POSE-BAR-TH-171", 2750.0, 10.0, 1.0), 2),
        item(waste_mention_draft(), 3),
    ]
}

pub(super) fn build_service() -> (
    QuoteService<MemoryQuoteRepository>,
    Arc<MemoryQuoteRepository>,
) {
    let repository = Arc::new(MemoryQuoteRepository::default());
    let service = QuoteService::new(repository.clone(), EngineConfig::default());
    (service, repository)
}

pub(super) fn quote_router_with_service(
    service: QuoteService<MemoryQuoteRepository>,
) -> axum::Router {
    crate::quotes::router::quote_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_not_found(response: &Response) {
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Repository stub that always fails, for router error paths.
pub(super) struct UnavailableRepository;

impl QuoteRepository for UnavailableRepository {
    fn insert(&self, _state: QuoteState) -> Result<QuoteState, RepositoryError> {
        Err(RepositoryError::Unavailable("quote store offline".to_string()))
    }

    fn fetch(&self, _id: &QuoteId) -> Result<Option<QuoteState>, RepositoryError> {
        Err(RepositoryError::Unavailable("quote store offline".to_string()))
    }

    fn list(&self) -> Result<Vec<QuoteState>, RepositoryError> {
        Err(RepositoryError::Unavailable("quote store offline".to_string()))
    }

    fn modify<T>(
        &self,
        _id: &QuoteId,
        _apply: impl FnOnce(&mut QuoteState) -> T,
    ) -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("quote store offline".to_string()))
    }
}

pub(super) fn incentives_with_cee_override(reference: &str, value: &str) -> IncentiveParameters {
    let mut incentives = IncentiveParameters::default();
    incentives.set_cee_override(reference, value);
    incentives
}
