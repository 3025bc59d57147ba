//! Cheapest-slot selection over a published tariff schedule

use chrono::{DateTime, Utc};

use crate::optimizer::blocks::group_blocks;
use crate::optimizer::types::{ChargeProfile, PriceInterval, SlotSelection};

/// Select the cheapest eligible slots to charge from `current_percent` to
/// `target_percent`.
///
/// `now` is the reference instant for future filtering and must be supplied by
/// the caller; the function reads no clock and performs no I/O. Only slots
/// starting strictly after `now` are eligible - a slot already in progress is
/// excluded even if most of it remains. When `deadline` is given, a slot must
/// also end at or before it; partially-fitting slots are not eligible.
///
/// Slots with unparsable timestamps are dropped during filtering; a single bad
/// record never aborts the calculation. If fewer eligible slots exist than
/// needed, the result carries all of them plus a warning naming the charge
/// level actually reachable.
pub fn select_slots(
    profile: &ChargeProfile,
    current_percent: f64,
    target_percent: f64,
    intervals: &[PriceInterval],
    now: DateTime<Utc>,
    deadline: Option<DateTime<Utc>>,
) -> SlotSelection {
    let percent_needed = target_percent - current_percent;
    if percent_needed <= 0.0 {
        return SlotSelection {
            kwh_needed: 0.0,
            slots_needed: 0,
            slots: Vec::new(),
            blocks: Vec::new(),
            total_cost_pence: 0.0,
            is_contiguous: false,
            warning: None,
            message: Some("Battery already at or above target".to_string()),
        };
    }

    let kwh_per_slot = profile.kwh_per_slot();
    let kwh_needed = (percent_needed / 100.0) * profile.battery_capacity_kwh;
    let slots_needed = (kwh_needed / kwh_per_slot).ceil() as usize;

    // Eligibility: strictly future start, and fully complete before any
    // deadline. Malformed timestamps drop the slot, not the batch.
    let mut eligible: Vec<PriceInterval> = intervals
        .iter()
        .filter(|slot| slot.start_time().is_some_and(|start| start > now))
        .filter(|slot| match deadline {
            Some(by) => slot.end_time().is_some_and(|end| end <= by),
            None => true,
        })
        .cloned()
        .collect();

    // Cheapest first; stable sort keeps schedule order on price ties
    eligible.sort_by(|a, b| a.rate.partial_cmp(&b.rate).unwrap_or(std::cmp::Ordering::Equal));

    let mut selected: Vec<PriceInterval> = eligible.into_iter().take(slots_needed).collect();

    let warning = if selected.len() < slots_needed {
        Some(shortfall_warning(
            profile,
            current_percent,
            selected.len(),
            slots_needed,
            deadline.is_some(),
        ))
    } else {
        None
    };

    // Back to chronological order for presentation and block grouping
    selected.sort_by(|a, b| match (a.start_time(), b.start_time()) {
        (Some(x), Some(y)) => x.cmp(&y),
        // Fallback to lexicographic order if parsing fails for either side
        _ => a.start.cmp(&b.start),
    });

    let total_cost_pence: f64 = selected.iter().map(|slot| slot.rate * kwh_per_slot).sum();
    let (blocks, is_contiguous) = group_blocks(&selected, kwh_per_slot);

    SlotSelection {
        kwh_needed,
        slots_needed,
        slots: selected,
        blocks,
        total_cost_pence,
        is_contiguous,
        warning,
        message: None,
    }
}

/// Warning text when the schedule cannot meet the target
fn shortfall_warning(
    profile: &ChargeProfile,
    current_percent: f64,
    available: usize,
    needed: usize,
    deadline_active: bool,
) -> String {
    let achievable_percent = current_percent
        + (available as f64 * profile.kwh_per_slot() / profile.battery_capacity_kwh) * 100.0;
    if deadline_active {
        format!(
            "Only {available} of {needed} slots complete before departure; \
             expected charge by the deadline is {achievable_percent:.0}%"
        )
    } else {
        format!(
            "Only {available} of {needed} future slots are available; \
             achievable charge is {achievable_percent:.0}%"
        )
    }
}
