use super::common::*;

use crate::quotes::domain::{IncentiveParameters, ItemId, QuoteId};
use crate::quotes::repository::RepositoryError;
use crate::quotes::service::QuoteServiceError;

#[test]
fn create_opens_an_empty_quote() {
    let (service, _) = build_service();

    let state = service.create().expect("quote created");
    assert!(state.quote_id.0.starts_with("devis-"));
    assert!(state.line_items.is_empty());
    assert!(state.deal.is_none());

    let totals = service.totals(&state.quote_id).expect("totals computed");
    assert_close(totals.total_ttc, 0.0);
    assert_close(totals.remaining, 0.0);
}

#[test]
fn add_item_assigns_identity_and_increasing_positions() {
    let (service, _) = build_service();
    let state = service.create().expect("quote created");

    let first = service
        .add_item(&state.quote_id, service_draft("POSE", 2750.0, 10.0, 1.0))
        .expect("first item added");
    let second = service
        .add_item(&state.quote_id, product_draft("PAC-11", 9500.0, 5.5, 1.0))
        .expect("second item added");

    assert!(first.id.0.starts_with("item-"));
    assert_ne!(first.id, second.id);
    assert_eq!(first.position, 1);
    assert_eq!(second.position, 2);
    assert_close(first.unit_price_ht, 2500.0);
}

#[test]
fn remove_item_drops_the_line_and_totals_follow() {
    let (service, _) = build_service();
    let state = service.create().expect("quote created");

    let kept = service
        .add_item(&state.quote_id, service_draft("POSE", 1000.0, 0.0, 1.0))
        .expect("kept item");
    let removed = service
        .add_item(&state.quote_id, service_draft("EXTRA", 500.0, 0.0, 1.0))
        .expect("removed item");

    service
        .remove_item(&state.quote_id, &removed.id)
        .expect("item removed");

    let stored = service.get(&state.quote_id).expect("quote fetched");
    assert_eq!(stored.line_items.len(), 1);
    assert_eq!(stored.line_items[0].id, kept.id);

    let totals = service.totals(&state.quote_id).expect("totals recomputed");
    assert_close(totals.total_ttc, 1000.0);
}

#[test]
fn removing_unknown_item_is_an_error() {
    let (service, _) = build_service();
    let state = service.create().expect("quote created");

    let error = service
        .remove_item(&state.quote_id, &ItemId("item-zzz".to_string()))
        .expect_err("unknown item rejected");
    assert!(matches!(error, QuoteServiceError::ItemNotFound(_)));
}

#[test]
fn update_item_reprices_but_keeps_identity_and_position() {
    let (service, _) = build_service();
    let state = service.create().expect("quote created");

    service
        .add_item(&state.quote_id, service_draft("POSE", 1000.0, 0.0, 1.0))
        .expect("first item");
    let target = service
        .add_item(&state.quote_id, service_draft("EXTRA", 500.0, 0.0, 1.0))
        .expect("second item");

    let updated = service
        .update_item(
            &state.quote_id,
            &target.id,
            service_draft("EXTRA", 2750.0, 10.0, 2.0),
        )
        .expect("item updated");

    assert_eq!(updated.id, target.id);
    assert_eq!(updated.position, target.position);
    assert_close(updated.unit_price_ht, 2500.0);
    assert_close(updated.total_ttc, 5500.0);

    let totals = service.totals(&state.quote_id).expect("totals recomputed");
    assert_close(totals.total_ttc, 1000.0 + 5500.0);
}

#[test]
fn incentives_replacement_feeds_the_next_read() {
    let (service, _) = build_service();
    let state = service.create().expect("quote created");
    service
        .add_item(&state.quote_id, service_draft("POSE", 1000.0, 0.0, 1.0))
        .expect("item added");

    let incentives = IncentiveParameters {
        acompte: "200".to_string(),
        ..IncentiveParameters::default()
    };
    service
        .replace_incentives(&state.quote_id, incentives)
        .expect("incentives replaced");

    let totals = service.totals(&state.quote_id).expect("totals recomputed");
    assert_close(totals.remaining, 800.0);
}

#[test]
fn deal_selection_changes_the_cee_premium() {
    let (service, _) = build_service();
    let state = service.create().expect("quote created");
    service
        .add_item(
            &state.quote_id,
            operation_draft("BAR-TH-171", 9500.0, 5.5, 1.0, Some(615_400.0)),
        )
        .expect("operation added");

    service
        .set_deal(&state.quote_id, effy_deal())
        .expect("deal selected");
    let with_deal = service.totals(&state.quote_id).expect("totals with deal");
    assert_close(with_deal.prime_cee, 4000.10);

    service.clear_deal(&state.quote_id).expect("deal cleared");
    let without_deal = service.totals(&state.quote_id).expect("totals without deal");
    assert_close(without_deal.prime_cee, 0.0);
}

#[test]
fn unknown_quote_is_not_found() {
    let (service, _) = build_service();

    let error = service
        .totals(&QuoteId("devis-missing".to_string()))
        .expect_err("missing quote rejected");
    assert!(matches!(
        error,
        QuoteServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[test]
fn list_returns_every_stored_quote() {
    let (service, _) = build_service();
    let first = service.create().expect("first quote");
    let second = service.create().expect("second quote");

    let quotes = service.list().expect("quotes listed");
    let ids: Vec<&str> = quotes.iter().map(|state| state.quote_id.0.as_str()).collect();
    assert!(ids.contains(&first.quote_id.0.as_str()));
    assert!(ids.contains(&second.quote_id.0.as_str()));
}
