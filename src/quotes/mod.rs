//! Quote management for renovation projects: the line-item store, the
//! incentive/deal parameters, and the totals engine that aggregates them.
//!
//! All quote state lives in memory. Mutations go through
//! [`service::QuoteService`] as whole-collection replacements (append,
//! filter-by-id, replace-by-id) and totals are recomputed from scratch on
//! every read, so there is no derived state to keep in sync.

pub mod domain;
pub mod engine;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    legacy_kwh_cumac, DealSelection, IncentiveParameters, ItemId, LineItem, LineItemKind,
    LinkedProduct, QuoteId, QuoteState, ELIGIBLE_OPERATION_CODES, MPR_NOT_DEDUCTED_SENTINEL,
    WASTE_MENTION_REFERENCE,
};
pub use engine::{EngineConfig, QuoteTotals, TotalsEngine};
pub use pricing::{build_line_item, price_line, round2, LineItemDraft, PricedAmounts};
pub use repository::{MemoryQuoteRepository, QuoteRepository, RepositoryError};
pub use router::quote_router;
pub use service::{QuoteService, QuoteServiceError};
pub use views::{
    document_view, format_euros, summary_view, LineView, QuoteDocumentView, QuoteSummaryView,
    TotalsView,
};
