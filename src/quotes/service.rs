use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::domain::{DealSelection, IncentiveParameters, ItemId, LineItem, QuoteId, QuoteState};
use super::engine::{EngineConfig, QuoteTotals, TotalsEngine};
use super::pricing::{build_line_item, LineItemDraft};
use super::repository::{QuoteRepository, RepositoryError};

static QUOTE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_quote_id() -> QuoteId {
    let id = QUOTE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    QuoteId(format!("devis-{id:06}"))
}

fn next_item_id() -> ItemId {
    let id = ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ItemId(format!("item-{id:06}"))
}

/// Service composing the repository and the totals engine. Every mutation is
/// an atomic replace on the quote's collection; totals are pull-based and
/// derived fresh whenever asked for.
pub struct QuoteService<R> {
    repository: Arc<R>,
    engine: TotalsEngine,
}

impl<R> QuoteService<R>
where
    R: QuoteRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: EngineConfig) -> Self {
        Self {
            repository,
            engine: TotalsEngine::new(config),
        }
    }

    /// Open an empty quote.
    pub fn create(&self) -> Result<QuoteState, QuoteServiceError> {
        let state = QuoteState::new(next_quote_id());
        let stored = self.repository.insert(state)?;
        Ok(stored)
    }

    pub fn get(&self, quote_id: &QuoteId) -> Result<QuoteState, QuoteServiceError> {
        let state = self
            .repository
            .fetch(quote_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(state)
    }

    pub fn list(&self) -> Result<Vec<QuoteState>, QuoteServiceError> {
        Ok(self.repository.list()?)
    }

    /// Price a draft and append it to the quote.
    pub fn add_item(
        &self,
        quote_id: &QuoteId,
        draft: LineItemDraft,
    ) -> Result<LineItem, QuoteServiceError> {
        let item = self.repository.modify(quote_id, |state| {
            let item = build_line_item(draft, next_item_id(), state.next_position());
            state.push_item(item.clone());
            item
        })?;
        Ok(item)
    }

    /// Re-price an existing item from an edited draft, keeping its identity
    /// and display position.
    pub fn update_item(
        &self,
        quote_id: &QuoteId,
        item_id: &ItemId,
        draft: LineItemDraft,
    ) -> Result<LineItem, QuoteServiceError> {
        self.repository.modify(quote_id, |state| {
            let position = match state.item(item_id) {
                Some(existing) => existing.position,
                None => return Err(QuoteServiceError::ItemNotFound(item_id.clone())),
            };
            let item = build_line_item(draft, item_id.clone(), position);
            state.replace_item(item.clone());
            Ok(item)
        })?
    }

    pub fn remove_item(
        &self,
        quote_id: &QuoteId,
        item_id: &ItemId,
    ) -> Result<(), QuoteServiceError> {
        let removed = self
            .repository
            .modify(quote_id, |state| state.remove_item(item_id))?;
        if removed {
            Ok(())
        } else {
            Err(QuoteServiceError::ItemNotFound(item_id.clone()))
        }
    }

    /// Replace the whole incentive record, as the incentive modal submits it.
    pub fn replace_incentives(
        &self,
        quote_id: &QuoteId,
        incentives: IncentiveParameters,
    ) -> Result<(), QuoteServiceError> {
        self.repository
            .modify(quote_id, |state| state.replace_incentives(incentives))?;
        Ok(())
    }

    pub fn set_deal(
        &self,
        quote_id: &QuoteId,
        deal: DealSelection,
    ) -> Result<(), QuoteServiceError> {
        self.repository
            .modify(quote_id, |state| state.set_deal(deal))?;
        Ok(())
    }

    pub fn clear_deal(&self, quote_id: &QuoteId) -> Result<(), QuoteServiceError> {
        self.repository.modify(quote_id, QuoteState::clear_deal)?;
        Ok(())
    }

    /// Recompute the derived totals from the current state.
    pub fn totals(&self, quote_id: &QuoteId) -> Result<QuoteTotals, QuoteServiceError> {
        let state = self.get(quote_id)?;
        let totals = self
            .engine
            .compute(&state.line_items, &state.incentives, state.deal.as_ref());
        debug!(
            quote_id = %state.quote_id,
            total_ttc = totals.total_ttc,
            remaining = totals.remaining,
            "recomputed quote totals"
        );
        Ok(totals)
    }
}

/// Error raised by the quote service.
#[derive(Debug, thiserror::Error)]
pub enum QuoteServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("line item {0} not found")]
    ItemNotFound(ItemId),
}
