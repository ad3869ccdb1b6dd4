mod accumulating;
mod hourly;

pub use accumulating::AccumulatedConsumption;
pub use hourly::HourlyConsumption;

use serde::{Deserialize, Serialize};

use crate::core::time::DateTime;

pub const ENERGY_UNIT: &str = "kWh";

/// Restorable accumulator state, serialized to primitive fields so it
/// survives restarts independent of in-memory representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionSnapshot {
    pub value: f64,
    pub unit: String,
    pub period_being_processed: Option<String>,
    pub period_base_value: Option<f64>,
}

fn parse_period(snapshot: &ConsumptionSnapshot) -> Option<DateTime> {
    let iso = snapshot.period_being_processed.as_deref()?;

    match DateTime::from_iso(iso) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::warn!("Ignoring unparseable restored period {:?}: {:?}", iso, e);
            None
        }
    }
}
