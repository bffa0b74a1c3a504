//! Line-item pricing as the add/edit forms apply it: round the pre-tax unit
//! price first, then multiply by quantity, then round the totals. The engine
//! trusts these stored amounts, so any consumer creating items must follow
//! the same order or unit prices and totals drift by a cent.

use serde::{Deserialize, Serialize};

use super::domain::{ItemId, LineItem, LineItemKind};

/// Round to two decimals, the storage precision of every euro amount.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The four stored amounts of a priced line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedAmounts {
    pub unit_price_ht: f64,
    pub unit_price_ttc: f64,
    pub total_ht: f64,
    pub total_ttc: f64,
}

/// Derive HT/TTC unit prices and totals from a tax-inclusive unit price.
/// `tva` is a percentage and assumed non-negative.
pub fn price_line(unit_price_ttc: f64, tva: f64, quantity: f64) -> PricedAmounts {
    let unit_price_ht = round2(unit_price_ttc / (1.0 + tva / 100.0));
    PricedAmounts {
        unit_price_ht,
        unit_price_ttc,
        total_ht: round2(unit_price_ht * quantity),
        total_ttc: round2(unit_price_ttc * quantity),
    }
}

/// Line item as submitted by the add/edit forms, before the service assigns
/// identity, position, and stored prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    pub reference: String,
    pub name: String,
    pub quantity: f64,
    #[serde(rename = "unitPriceTTC")]
    pub unit_price_ttc: f64,
    pub tva: f64,
    #[serde(flatten)]
    pub kind: LineItemKind,
}

/// Price a draft and freeze it into a stored line item.
pub fn build_line_item(draft: LineItemDraft, id: ItemId, position: u32) -> LineItem {
    let amounts = price_line(draft.unit_price_ttc, draft.tva, draft.quantity);
    LineItem {
        id,
        reference: draft.reference,
        position,
        name: draft.name,
        quantity: draft.quantity,
        unit_price_ht: amounts.unit_price_ht,
        unit_price_ttc: amounts.unit_price_ttc,
        tva: draft.tva,
        total_ht: amounts.total_ht,
        total_ttc: amounts.total_ttc,
        kind: draft.kind,
    }
}
