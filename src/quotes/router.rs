use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use super::domain::{DealSelection, IncentiveParameters, ItemId, QuoteId};
use super::pricing::LineItemDraft;
use super::repository::{QuoteRepository, RepositoryError};
use super::service::{QuoteService, QuoteServiceError};
use super::views::{document_view, summary_view};

/// Router builder exposing the quote-management HTTP endpoints.
pub fn quote_router<R>(service: Arc<QuoteService<R>>) -> Router
where
    R: QuoteRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/quotes",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/quotes/:quote_id", get(document_handler::<R>))
        .route("/api/v1/quotes/:quote_id/totals", get(totals_handler::<R>))
        .route("/api/v1/quotes/:quote_id/items", post(add_item_handler::<R>))
        .route(
            "/api/v1/quotes/:quote_id/items/:item_id",
            put(update_item_handler::<R>).delete(remove_item_handler::<R>),
        )
        .route(
            "/api/v1/quotes/:quote_id/incentives",
            put(incentives_handler::<R>),
        )
        .route(
            "/api/v1/quotes/:quote_id/deal",
            put(set_deal_handler::<R>).delete(clear_deal_handler::<R>),
        )
        .with_state(service)
}

fn error_response(error: QuoteServiceError) -> Response {
    let status = match &error {
        QuoteServiceError::Repository(RepositoryError::NotFound)
        | QuoteServiceError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        QuoteServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        QuoteServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn create_handler<R>(State(service): State<Arc<QuoteService<R>>>) -> Response
where
    R: QuoteRepository + 'static,
{
    let state = match service.create() {
        Ok(state) => state,
        Err(error) => return error_response(error),
    };
    match service.totals(&state.quote_id) {
        Ok(totals) => {
            (StatusCode::CREATED, Json(summary_view(&state, &totals))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<QuoteService<R>>>) -> Response
where
    R: QuoteRepository + 'static,
{
    let states = match service.list() {
        Ok(states) => states,
        Err(error) => return error_response(error),
    };

    let mut summaries = Vec::with_capacity(states.len());
    for state in &states {
        match service.totals(&state.quote_id) {
            Ok(totals) => summaries.push(summary_view(state, &totals)),
            Err(error) => return error_response(error),
        }
    }
    (StatusCode::OK, Json(summaries)).into_response()
}

pub(crate) async fn document_handler<R>(
    State(service): State<Arc<QuoteService<R>>>,
    Path(quote_id): Path<String>,
) -> Response
where
    R: QuoteRepository + 'static,
{
    let id = QuoteId(quote_id);
    let state = match service.get(&id) {
        Ok(state) => state,
        Err(error) => return error_response(error),
    };
    match service.totals(&id) {
        Ok(totals) => (StatusCode::OK, Json(document_view(&state, &totals))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn totals_handler<R>(
    State(service): State<Arc<QuoteService<R>>>,
    Path(quote_id): Path<String>,
) -> Response
where
    R: QuoteRepository + 'static,
{
    match service.totals(&QuoteId(quote_id)) {
        Ok(totals) => (StatusCode::OK, Json(totals)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_item_handler<R>(
    State(service): State<Arc<QuoteService<R>>>,
    Path(quote_id): Path<String>,
    Json(draft): Json<LineItemDraft>,
) -> Response
where
    R: QuoteRepository + 'static,
{
    match service.add_item(&QuoteId(quote_id), draft) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_item_handler<R>(
    State(service): State<Arc<QuoteService<R>>>,
    Path((quote_id, item_id)): Path<(String, String)>,
    Json(draft): Json<LineItemDraft>,
) -> Response
where
    R: QuoteRepository + 'static,
{
    match service.update_item(&QuoteId(quote_id), &ItemId(item_id), draft) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_item_handler<R>(
    State(service): State<Arc<QuoteService<R>>>,
    Path((quote_id, item_id)): Path<(String, String)>,
) -> Response
where
    R: QuoteRepository + 'static,
{
    match service.remove_item(&QuoteId(quote_id), &ItemId(item_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn incentives_handler<R>(
    State(service): State<Arc<QuoteService<R>>>,
    Path(quote_id): Path<String>,
    Json(incentives): Json<IncentiveParameters>,
) -> Response
where
    R: QuoteRepository + 'static,
{
    match service.replace_incentives(&QuoteId(quote_id), incentives) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn set_deal_handler<R>(
    State(service): State<Arc<QuoteService<R>>>,
    Path(quote_id): Path<String>,
    Json(deal): Json<DealSelection>,
) -> Response
where
    R: QuoteRepository + 'static,
{
    match service.set_deal(&QuoteId(quote_id), deal) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn clear_deal_handler<R>(
    State(service): State<Arc<QuoteService<R>>>,
    Path(quote_id): Path<String>,
) -> Response
where
    R: QuoteRepository + 'static,
{
    match service.clear_deal(&QuoteId(quote_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}
