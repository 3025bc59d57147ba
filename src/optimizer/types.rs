use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ChargingConfig;

/// One priced tariff slot as published by the rate feed.
///
/// Timestamps are kept as the RFC 3339 strings received upstream and parsed
/// lazily; a slot with an unparsable timestamp is skipped during filtering
/// rather than failing the whole calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInterval {
    /// Slot start, RFC 3339
    pub start: String,

    /// Slot end, RFC 3339
    pub end: String,

    /// Price in pence per kWh including VAT
    pub rate: f64,
}

impl PriceInterval {
    /// Parsed start instant, if the timestamp is well-formed
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339_utc(&self.start)
    }

    /// Parsed end instant, if the timestamp is well-formed
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339_utc(&self.end)
    }
}

/// Parse an RFC 3339 timestamp into UTC, `None` on malformed input
pub(crate) fn parse_rfc3339_utc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Immutable vehicle/charger parameters the optimizer plans against
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeProfile {
    /// Usable battery capacity in kWh
    pub battery_capacity_kwh: f64,

    /// Home charger power in kW
    pub charger_power_kw: f64,

    /// Duration of one tariff slot in hours
    pub slot_duration_hours: f64,
}

impl ChargeProfile {
    /// Energy deliverable by the charger in one slot
    pub fn kwh_per_slot(&self) -> f64 {
        self.charger_power_kw * self.slot_duration_hours
    }
}

impl From<&ChargingConfig> for ChargeProfile {
    fn from(cfg: &ChargingConfig) -> Self {
        Self {
            battery_capacity_kwh: cfg.battery_capacity_kwh,
            charger_power_kw: cfg.charger_power_kw,
            slot_duration_hours: cfg.slot_duration_hours,
        }
    }
}

/// A maximal run of time-contiguous selected slots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeBlock {
    /// Block start, RFC 3339
    pub start: String,

    /// Block end, RFC 3339
    pub end: String,

    /// Number of slots in the block
    pub slot_count: usize,

    /// Energy delivered over the block in kWh
    pub kwh: f64,

    /// Unweighted mean of the per-slot rates in pence per kWh
    pub avg_rate: f64,

    /// Block cost in pence
    pub total_cost_pence: f64,
}

/// Result of one slot-selection pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSelection {
    /// Energy required to reach the target in kWh
    pub kwh_needed: f64,

    /// Number of slots required to deliver that energy
    pub slots_needed: usize,

    /// Selected slots, ordered by start time
    pub slots: Vec<PriceInterval>,

    /// Selected slots grouped into contiguous blocks
    pub blocks: Vec<ChargeBlock>,

    /// Total cost of the selection in pence
    pub total_cost_pence: f64,

    /// True iff the selection forms exactly one contiguous block
    pub is_contiguous: bool,

    /// Set when fewer eligible slots exist than needed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    /// Set for trivial outcomes such as already-at-target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
