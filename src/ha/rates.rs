//! Rate source: Octopus Agile tariff slots via Home Assistant
//!
//! The Octopus Energy integration exposes one `current_day_rates` event entity
//! and, from late afternoon, a `next_day_rates` entity. Both are merged here so
//! the optimizer can plan overnight charging across the midnight boundary.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::ha::client::HaClient;
use crate::logging::get_logger;
use crate::optimizer::PriceInterval;

/// Merged, deduplicated and unit-normalized tariff schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSchedule {
    /// Priced slots ordered by start time
    pub intervals: Vec<PriceInterval>,

    /// Whether the current day feed contributed slots
    pub includes_today: bool,

    /// Whether the next day feed contributed slots
    pub includes_tomorrow: bool,
}

/// Source of tariff schedules
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_schedule(&self) -> Result<RateSchedule>;
}

/// Rate source backed by the Home Assistant Octopus Energy integration
pub struct HaRateSource {
    client: Arc<HaClient>,
    logger: crate::logging::StructuredLogger,
}

impl HaRateSource {
    pub fn new(client: Arc<HaClient>) -> Self {
        let logger = get_logger("rates");
        Self { client, logger }
    }
}

#[async_trait::async_trait]
impl RateSource for HaRateSource {
    async fn fetch_schedule(&self) -> Result<RateSchedule> {
        let states = self.client.get_states().await?;
        let schedule = schedule_from_states(&states);
        self.logger.debug(&format!(
            "Fetched {} rate slots (today={}, tomorrow={})",
            schedule.intervals.len(),
            schedule.includes_today,
            schedule.includes_tomorrow
        ));
        Ok(schedule)
    }
}

/// Build a [`RateSchedule`] from the full Home Assistant states array.
///
/// Today and tomorrow feeds are merged with first-occurrence-wins dedup by
/// start timestamp (the feeds overlap at midnight). Prices below 1 are assumed
/// to be pounds and scaled to pence. Rows missing a start or value are dropped.
pub fn schedule_from_states(states: &serde_json::Value) -> RateSchedule {
    let mut intervals: Vec<PriceInterval> = Vec::new();
    let mut seen_starts: HashSet<String> = HashSet::new();
    let mut includes_today = false;
    let mut includes_tomorrow = false;

    for state in states.as_array().into_iter().flatten() {
        let entity_id = state.get("entity_id").and_then(|v| v.as_str()).unwrap_or("");
        let is_today = entity_id.contains("octopus_energy_electricity")
            && entity_id.contains("current_day_rates");
        let is_tomorrow = entity_id.contains("octopus_energy_electricity")
            && entity_id.contains("next_day_rates");
        if !is_today && !is_tomorrow {
            continue;
        }

        let Some(rates) = state
            .get("attributes")
            .and_then(|a| a.get("rates"))
            .and_then(|r| r.as_array())
        else {
            continue;
        };
        if !rates.is_empty() {
            if is_today {
                includes_today = true;
            }
            if is_tomorrow {
                includes_tomorrow = true;
            }
        }

        for rate in rates {
            let start = rate
                .get("start")
                .or_else(|| rate.get("valid_from"))
                .and_then(|v| v.as_str());
            let end = rate
                .get("end")
                .or_else(|| rate.get("valid_to"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let value = rate.get("value_inc_vat").and_then(|v| v.as_f64());

            let (Some(start), Some(value)) = (start, value) else {
                continue;
            };
            // First occurrence wins across the overlapping feeds
            if !seen_starts.insert(start.to_string()) {
                continue;
            }

            let rate_pence = if value < 1.0 { value * 100.0 } else { value };
            intervals.push(PriceInterval {
                start: start.to_string(),
                end: end.to_string(),
                rate: rate_pence,
            });
        }
    }

    // Sort by actual epoch time to handle differing timezone offsets correctly
    intervals.sort_by(|a, b| match (a.start_time(), b.start_time()) {
        (Some(x), Some(y)) => x.cmp(&y),
        // Fallback to lexicographic order if parsing fails for either side
        _ => a.start.cmp(&b.start),
    });

    RateSchedule {
        intervals,
        includes_today,
        includes_tomorrow,
    }
}
