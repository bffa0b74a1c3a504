//! Presentation boundary: the summary panel and printable-document shapes a
//! renderer consumes. Formatting happens here and only here; nothing in this
//! module feeds back into the engine.

use serde::Serialize;

use super::domain::{LineItem, QuoteState};
use super::engine::QuoteTotals;

/// Format an amount the way the printed documents do: space-grouped
/// thousands, comma decimal, trailing euro sign.
pub fn format_euros(amount: f64) -> String {
    let negative = amount < -0.004;
    let cents = (amount.abs() * 100.0).round() as i64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac:02} €")
}

/// One row of the list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteSummaryView {
    pub quote_id: String,
    pub created_utc: chrono::DateTime<chrono::Utc>,
    pub item_count: usize,
    pub total_ttc: String,
    pub remaining: String,
}

pub fn summary_view(state: &QuoteState, totals: &QuoteTotals) -> QuoteSummaryView {
    QuoteSummaryView {
        quote_id: state.quote_id.0.clone(),
        created_utc: state.created_utc,
        item_count: state.line_items.len(),
        total_ttc: format_euros(totals.total_ttc),
        remaining: format_euros(totals.remaining),
    }
}

/// One printable document row. The waste mention keeps its label but shows
/// no quantity or price cells.
#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    pub reference: String,
    pub name: String,
    pub quantity: String,
    pub unit_price_ttc: String,
    pub total_ttc: String,
}

fn line_view(item: &LineItem) -> LineView {
    if item.is_waste_mention() {
        return LineView {
            reference: item.reference.clone(),
            name: item.name.clone(),
            quantity: String::new(),
            unit_price_ttc: String::new(),
            total_ttc: String::new(),
        };
    }
    LineView {
        reference: item.reference.clone(),
        name: item.name.clone(),
        quantity: format!("{}", item.quantity),
        unit_price_ttc: format_euros(item.unit_price_ttc),
        total_ttc: format_euros(item.total_ttc),
    }
}

/// Totals block of the document, pre-formatted.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub total_ht: String,
    pub total_ttc: String,
    pub prime_cee: String,
    pub prime_renov: String,
    pub remaining: String,
}

/// Everything a document renderer needs; it must not recompute totals.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteDocumentView {
    pub quote_id: String,
    pub lines: Vec<LineView>,
    pub totals: TotalsView,
}

pub fn document_view(state: &QuoteState, totals: &QuoteTotals) -> QuoteDocumentView {
    let mut items: Vec<&LineItem> = state.line_items.iter().collect();
    items.sort_by_key(|item| item.position);

    QuoteDocumentView {
        quote_id: state.quote_id.0.clone(),
        lines: items.into_iter().map(line_view).collect(),
        totals: TotalsView {
            total_ht: format_euros(totals.total_ht),
            total_ttc: format_euros(totals.total_ttc),
            prime_cee: format_euros(totals.prime_cee),
            prime_renov: format_euros(totals.prime_renov),
            remaining: format_euros(totals.remaining),
        },
    }
}
