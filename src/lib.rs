//! Back-office service for energy-renovation contractors: quote state,
//! line-item pricing, and the CEE/MaPrimeRenov incentive aggregation that
//! derives every displayed total.

pub mod config;
pub mod error;
pub mod quotes;
pub mod telemetry;
