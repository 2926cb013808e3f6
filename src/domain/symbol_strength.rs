//! Per-symbol ranking record, persisted as the daily ranked JSON array.

use serde::{Deserialize, Serialize};

/// Raw RS metrics plus their cross-sectional ranks for one symbol on one run.
///
/// Field names are serialized in PascalCase; snapshots written by earlier
/// deployments use the same names and must stay readable N days later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SymbolStrength {
    pub symbol: String,
    pub current_term_rs: f64,
    pub short_rs: f64,
    pub middle_rs: f64,
    pub long_rs: f64,
    #[serde(default)]
    pub current_term_rs_rank: f64,
    #[serde(default)]
    pub short_rs_rank: f64,
    #[serde(default)]
    pub middle_rs_rank: f64,
    #[serde(default)]
    pub long_rs_rank: f64,
    #[serde(default)]
    pub strength: f64,
}

impl SymbolStrength {
    /// A record with raw metrics only; ranks and strength are assigned once
    /// the whole population is known.
    pub fn unranked(symbol: &str, current_term_rs: f64, short_rs: f64, middle_rs: f64, long_rs: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            current_term_rs,
            short_rs,
            middle_rs,
            long_rs,
            current_term_rs_rank: 0.0,
            short_rs_rank: 0.0,
            middle_rs_rank: 0.0,
            long_rs_rank: 0.0,
            strength: 0.0,
        }
    }
}
