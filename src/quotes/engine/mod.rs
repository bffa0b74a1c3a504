//! The quote aggregation engine: a pure, synchronous pass over the line-item
//! store and the incentive/deal parameters, producing every displayed total.
//!
//! The engine never fails. Malformed numeric overrides coerce to zero at the
//! read site, stored line totals are trusted rather than re-derived, and the
//! result is recomputed in full on every call.

mod config;
mod premiums;

pub use config::EngineConfig;

use serde::{Deserialize, Serialize};

use super::domain::{DealSelection, IncentiveParameters, LineItem};
use super::pricing::round2;
use premiums::{eligible_operations, resolve_prime_cee, resolve_prime_renov};

/// Derived totals of a quote. Never stored; recomputed on every read.
///
/// `remaining` is signed: deductions exceeding the price are a display fact,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteTotals {
    #[serde(rename = "totalHT")]
    pub total_ht: f64,
    #[serde(rename = "totalTTC")]
    pub total_ttc: f64,
    #[serde(rename = "primeCEE")]
    pub prime_cee: f64,
    #[serde(rename = "primeRenov")]
    pub prime_renov: f64,
    pub remaining: f64,
}

/// Stateless aggregator applying the incentive rules to a quote snapshot.
pub struct TotalsEngine {
    config: EngineConfig,
}

impl TotalsEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compute(
        &self,
        items: &[LineItem],
        incentives: &IncentiveParameters,
        deal: Option<&DealSelection>,
    ) -> QuoteTotals {
        // Base sums trust the totals frozen at creation/edit time. The waste
        // mention simply contributes zero.
        let total_ht: f64 = items.iter().map(|item| item.total_ht).sum();
        let total_ttc: f64 = items.iter().map(|item| item.total_ttc).sum();

        let operations = eligible_operations(items);

        // The legacy documents round the CEE premium to the cent; the other
        // totals stay as computed and are formatted at the display boundary.
        let prime_cee = round2(resolve_prime_cee(items, &operations, incentives, deal));
        let renov = resolve_prime_renov(&operations, incentives, &self.config);

        let additional_prime_cee = parse_amount(&incentives.prime_cee);
        let remise_exceptionnelle = parse_amount(&incentives.remise_exceptionnelle);
        let acompte = parse_amount(&incentives.acompte);
        let rac_charge = parse_amount(&incentives.montant_prise_en_charge_rac);

        let total_deductions = prime_cee
            + renov.deducted
            + renov.flat_mpr
            + additional_prime_cee
            + remise_exceptionnelle
            + acompte
            + rac_charge;

        QuoteTotals {
            total_ht,
            total_ttc,
            prime_cee,
            prime_renov: renov.displayed,
            remaining: total_ttc - total_deductions,
        }
    }
}

/// Coerce a user-entered amount to a float. Blank, non-numeric, or
/// non-finite input becomes zero so a stray character can never surface as
/// NaN in a displayed total. Decimal commas are accepted for input fidelity.
pub(crate) fn parse_amount(raw: &str) -> f64 {
    let cleaned = raw.trim().replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
