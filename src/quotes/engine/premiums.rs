use super::super::domain::{
    is_eligible_operation_code, DealSelection, IncentiveParameters, LineItem,
};
use super::config::EngineConfig;
use super::parse_amount;

/// Line items whose reference belongs to the incentive allow-list. These
/// drive the per-operation override lookups.
pub(crate) fn eligible_operations(items: &[LineItem]) -> Vec<&LineItem> {
    items
        .iter()
        .filter(|item| is_eligible_operation_code(&item.reference))
        .collect()
}

/// Deal-based CEE premium: ratio times kWh cumac, summed over every
/// operation-tagged line regardless of the allow-list filter. Zero without a
/// deal.
pub(crate) fn deal_based_prime_cee(items: &[LineItem], deal: Option<&DealSelection>) -> f64 {
    let ratio = deal.map(|deal| deal.deal_ratio).unwrap_or(0.0);
    items
        .iter()
        .filter(|item| item.is_operation())
        .map(|item| item.kwh_cumac() * ratio)
        .sum()
}

/// CEE precedence: a strictly positive per-operation override sum is final;
/// otherwise fall back to the deal computation. An override set summing to
/// exactly zero counts as "no override provided", so an intentional zero is
/// indistinguishable from an absent one (kept as-is for compatibility with
/// the historical documents).
pub(crate) fn resolve_prime_cee(
    items: &[LineItem],
    operations: &[&LineItem],
    incentives: &IncentiveParameters,
    deal: Option<&DealSelection>,
) -> f64 {
    if !operations.is_empty() {
        let overridden: f64 = operations
            .iter()
            .map(|operation| parse_amount(incentives.cee_override(&operation.reference).unwrap_or("")))
            .sum();
        if overridden > 0.0 {
            return overridden;
        }
    }
    deal_based_prime_cee(items, deal)
}

/// How the renovation premium lands on the document.
pub(crate) struct RenovResolution {
    /// Value reported on the quote, shown even when its deduction is waived.
    pub displayed: f64,
    /// Share of the renovation premium actually subtracted from the total.
    pub deducted: f64,
    /// Flat `primeMPR` amount deducted instead when the computed premium is
    /// not. Mutually exclusive with `deducted` in the final sum.
    pub flat_mpr: f64,
}

pub(crate) fn resolve_prime_renov(
    operations: &[&LineItem],
    incentives: &IncentiveParameters,
    config: &EngineConfig,
) -> RenovResolution {
    let displayed = if operations.is_empty() {
        0.0
    } else {
        let overridden: f64 = operations
            .iter()
            .map(|operation| parse_amount(incentives.mpr_override(&operation.reference).unwrap_or("")))
            .sum();
        if overridden == 0.0 {
            config.mpr_default_premium
        } else {
            overridden
        }
    };

    if incentives.mpr_deduction_waived() {
        return RenovResolution {
            displayed,
            deducted: 0.0,
            flat_mpr: 0.0,
        };
    }

    if !operations.is_empty() {
        // Operations present: the computed premium is the one deducted.
        return RenovResolution {
            displayed,
            deducted: displayed,
            flat_mpr: 0.0,
        };
    }

    RenovResolution {
        displayed,
        deducted: 0.0,
        flat_mpr: parse_amount(&incentives.prime_mpr),
    }
}
