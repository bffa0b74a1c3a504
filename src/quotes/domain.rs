use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheme codes whose line items count as incentive-eligible operations.
pub const ELIGIBLE_OPERATION_CODES: [&str; 4] =
    ["BAR-TH-171", "BAR-TH-113", "BAR-TH-129", "BAR-TH-143"];

/// Reference of the zero-value waste-handling mention carried on every quote.
/// It contributes nothing to any sum; only the document rendering treats it
/// specially (no quantity or price cells).
pub const WASTE_MENTION_REFERENCE: &str = "MENTION-DECHETS";

/// Sentinel stored in the `primeMPR` field when the renovation premium must
/// be displayed but not deducted from the amount due.
pub const MPR_NOT_DEDUCTED_SENTINEL: &str = "Prime MPR non deduite";

/// Prefix for per-operation CEE premium overrides in [`IncentiveParameters`].
pub const CEE_OVERRIDE_PREFIX: &str = "primeCEE_";

/// Prefix for per-operation MaPrimeRenov overrides in [`IncentiveParameters`].
pub const MPR_OVERRIDE_PREFIX: &str = "primeMPR_";

/// kWh-cumac volumes for operations created before product linkage existed.
/// Used only when an operation line has no linked product.
pub fn legacy_kwh_cumac(reference: &str) -> Option<f64> {
    match reference {
        "BAR-TH-171" => Some(615_400.0),
        "BAR-TH-113" => Some(532_000.0),
        "BAR-TH-129" => Some(182_700.0),
        "BAR-TH-143" => Some(77_800.0),
        _ => None,
    }
}

pub fn is_eligible_operation_code(reference: &str) -> bool {
    ELIGIBLE_OPERATION_CODES.contains(&reference)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant payloads of a quote line. The totals engine only ever looks at the
/// `Operation` tag and its linked product; everything else is opaque to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItemKind {
    #[serde(rename_all = "camelCase")]
    Product {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        supplier_reference: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Service {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subcontractor: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Operation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        linked_product: Option<LinkedProduct>,
    },
}

/// Product attached to an operation line, sizing its CEE premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedProduct {
    pub kwh_cumac: f64,
}

/// One entry of a quote: product, installation service, or incentive
/// operation. Unit prices and totals are computed once at creation/edit time
/// (see [`crate::quotes::pricing`]) and trusted as stored afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ItemId,
    pub reference: String,
    pub position: u32,
    /// Rich-text display label. Rendered, never parsed.
    pub name: String,
    pub quantity: f64,
    #[serde(rename = "unitPriceHT")]
    pub unit_price_ht: f64,
    #[serde(rename = "unitPriceTTC")]
    pub unit_price_ttc: f64,
    pub tva: f64,
    #[serde(rename = "totalHT")]
    pub total_ht: f64,
    #[serde(rename = "totalTTC")]
    pub total_ttc: f64,
    #[serde(flatten)]
    pub kind: LineItemKind,
}

impl LineItem {
    pub fn is_operation(&self) -> bool {
        matches!(self.kind, LineItemKind::Operation { .. })
    }

    pub fn is_waste_mention(&self) -> bool {
        self.reference == WASTE_MENTION_REFERENCE
    }

    /// kWh-cumac volume backing the deal-based premium: the linked product
    /// when present, otherwise the legacy table, otherwise zero.
    pub fn kwh_cumac(&self) -> f64 {
        match &self.kind {
            LineItemKind::Operation {
                linked_product: Some(product),
            } => product.kwh_cumac,
            LineItemKind::Operation {
                linked_product: None,
            } => legacy_kwh_cumac(&self.reference).unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

/// User-entered incentive overrides, kept as raw text to preserve input
/// fidelity. Numeric coercion happens only inside the totals engine.
///
/// Per-operation overrides arrive as dynamically named keys
/// (`primeCEE_<reference>` / `primeMPR_<reference>`) and are captured in the
/// flattened `overrides` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncentiveParameters {
    #[serde(default, rename = "primeCEE")]
    pub prime_cee: String,
    #[serde(default, rename = "remiseExceptionnelle")]
    pub remise_exceptionnelle: String,
    #[serde(default, rename = "primeMPR")]
    pub prime_mpr: String,
    #[serde(default, rename = "montantPriseEnChargeRAC")]
    pub montant_prise_en_charge_rac: String,
    #[serde(default)]
    pub acompte: String,
    /// Informational toggle from the administrative forms; does not gate the
    /// calculation.
    #[serde(default, rename = "activiteMaPrimeRenov")]
    pub activite_ma_prime_renov: bool,
    #[serde(default, flatten)]
    pub overrides: BTreeMap<String, String>,
}

impl IncentiveParameters {
    pub fn cee_override(&self, reference: &str) -> Option<&str> {
        self.overrides
            .get(&format!("{CEE_OVERRIDE_PREFIX}{reference}"))
            .map(String::as_str)
    }

    pub fn mpr_override(&self, reference: &str) -> Option<&str> {
        self.overrides
            .get(&format!("{MPR_OVERRIDE_PREFIX}{reference}"))
            .map(String::as_str)
    }

    pub fn set_cee_override(&mut self, reference: &str, value: impl Into<String>) {
        self.overrides
            .insert(format!("{CEE_OVERRIDE_PREFIX}{reference}"), value.into());
    }

    pub fn set_mpr_override(&mut self, reference: &str, value: impl Into<String>) {
        self.overrides
            .insert(format!("{MPR_OVERRIDE_PREFIX}{reference}"), value.into());
    }

    /// True when the user asked for the renovation premium to stay on the
    /// document without being deducted.
    pub fn mpr_deduction_waived(&self) -> bool {
        self.prime_mpr == MPR_NOT_DEDUCTED_SENTINEL
    }
}

/// Partner agreement supplying a premium rate per kWh cumac.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealSelection {
    pub deal_id: String,
    pub deal_ratio: f64,
}

/// The full mutable state of one quote. Totals are intentionally absent:
/// they are derived by the engine whenever they are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteState {
    pub quote_id: QuoteId,
    pub created_utc: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
    pub incentives: IncentiveParameters,
    pub deal: Option<DealSelection>,
}

impl QuoteState {
    pub fn new(quote_id: QuoteId) -> Self {
        Self {
            quote_id,
            created_utc: Utc::now(),
            line_items: Vec::new(),
            incentives: IncentiveParameters::default(),
            deal: None,
        }
    }

    /// Display order for the next appended item. Positions are positive and
    /// increasing but not required to stay contiguous after removals.
    pub fn next_position(&self) -> u32 {
        self.line_items
            .iter()
            .map(|item| item.position)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn item(&self, id: &ItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|item| &item.id == id)
    }

    pub fn push_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    /// Remove by id. Returns whether an item was actually dropped.
    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        let before = self.line_items.len();
        self.line_items.retain(|item| &item.id != id);
        self.line_items.len() != before
    }

    /// Replace the item carrying the same id. Returns false when absent.
    pub fn replace_item(&mut self, item: LineItem) -> bool {
        match self
            .line_items
            .iter_mut()
            .find(|existing| existing.id == item.id)
        {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn replace_incentives(&mut self, incentives: IncentiveParameters) {
        self.incentives = incentives;
    }

    pub fn set_deal(&mut self, deal: DealSelection) {
        self.deal = Some(deal);
    }

    pub fn clear_deal(&mut self) {
        self.deal = None;
    }
}
