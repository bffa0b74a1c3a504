use serde::{Deserialize, Serialize};

/// Tunables of the totals engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Renovation premium assumed for a quote that has eligible operations
    /// but no per-operation MaPrimeRenov override. Historical business
    /// default with no documented derivation; treated as opaque and kept
    /// configurable (`APP_MPR_DEFAULT`).
    pub mpr_default_premium: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mpr_default_premium: 3000.0,
        }
    }
}
