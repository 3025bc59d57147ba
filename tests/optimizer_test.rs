use chrono::{DateTime, TimeZone, Utc};
use wattson::optimizer::{ChargeProfile, PriceInterval, select_slots};

fn profile() -> ChargeProfile {
    ChargeProfile {
        battery_capacity_kwh: 75.0,
        charger_power_kw: 7.0,
        slot_duration_hours: 0.5,
    }
}

fn slot(start: &str, end: &str, rate: f64) -> PriceInterval {
    PriceInterval {
        start: start.to_string(),
        end: end.to_string(),
        rate,
    }
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 29, hour, min, 0).single().unwrap()
}

/// A half-hourly schedule from 10:00 with the given rates
fn schedule(rates: &[f64]) -> Vec<PriceInterval> {
    let base = at(10, 0);
    rates
        .iter()
        .enumerate()
        .map(|(i, &rate)| {
            let start = base + chrono::Duration::minutes(30 * i as i64);
            let end = start + chrono::Duration::minutes(30);
            slot(&start.to_rfc3339(), &end.to_rfc3339(), rate)
        })
        .collect()
}

#[test]
fn no_charging_needed_at_or_above_target() {
    for (current, target) in [(80.0, 80.0), (90.0, 80.0), (100.0, 0.0)] {
        let result = select_slots(&profile(), current, target, &schedule(&[5.0]), at(9, 0), None);
        assert_eq!(result.slots_needed, 0);
        assert_eq!(result.kwh_needed, 0.0);
        assert!(result.slots.is_empty());
        assert!(result.blocks.is_empty());
        assert_eq!(result.total_cost_pence, 0.0);
        assert!(result.message.is_some());
    }
}

#[test]
fn slots_needed_is_ceiling_of_deficit() {
    // 50% -> 80% of 75 kWh: 22.5 kWh, ceil(22.5 / 3.5) = 7
    let result = select_slots(&profile(), 50.0, 80.0, &schedule(&[5.0; 10]), at(9, 0), None);
    assert!((result.kwh_needed - 22.5).abs() < 1e-9);
    assert_eq!(result.slots_needed, 7);
    assert_eq!(result.slots.len(), 7);

    // A deficit that divides exactly: 70% -> 84%, 10.5 kWh, exactly 3 slots
    let result = select_slots(&profile(), 70.0, 84.0, &schedule(&[5.0; 10]), at(9, 0), None);
    assert_eq!(result.slots_needed, 3);
}

#[test]
fn selection_is_exactly_the_cheapest_eligible() {
    let intervals = schedule(&[20.0, 5.0, 5.0, 18.0, 4.0, 25.0]);
    let result = select_slots(&profile(), 70.0, 84.0, &intervals, at(9, 0), None);
    assert_eq!(result.slots.len(), 3);

    let mut picked: Vec<f64> = result.slots.iter().map(|s| s.rate).collect();
    picked.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(picked, vec![4.0, 5.0, 5.0]);

    // No cheaper eligible slot was passed over for a costlier one
    let max_picked = picked.last().copied().unwrap();
    let skipped_cheaper = intervals
        .iter()
        .filter(|s| !result.slots.contains(s))
        .any(|s| s.rate < max_picked);
    assert!(!skipped_cheaper);
}

#[test]
fn selection_is_returned_in_time_order() {
    let intervals = schedule(&[9.0, 30.0, 7.0, 30.0, 8.0]);
    let result = select_slots(&profile(), 70.0, 84.0, &intervals, at(9, 0), None);
    let starts: Vec<&str> = result.slots.iter().map(|s| s.start.as_str()).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[test]
fn every_selected_slot_starts_in_the_future() {
    let intervals = schedule(&[1.0, 1.0, 1.0, 1.0]);
    // 10:30 is mid-schedule: the 10:00 and the in-progress 10:30 slot are out
    let now = at(10, 30);
    let result = select_slots(&profile(), 50.0, 80.0, &intervals, now, None);
    assert!(result.slots.iter().all(|s| {
        chrono::DateTime::parse_from_rfc3339(&s.start).unwrap().with_timezone(&Utc) > now
    }));
    assert_eq!(result.slots.len(), 2);
}

#[test]
fn deadline_bounds_every_selected_slot() {
    let intervals = schedule(&[3.0; 8]);
    let deadline = at(11, 30);
    let result = select_slots(&profile(), 50.0, 80.0, &intervals, at(9, 0), Some(deadline));
    assert!(result.slots.iter().all(|s| {
        chrono::DateTime::parse_from_rfc3339(&s.end).unwrap().with_timezone(&Utc) <= deadline
    }));
    // Three half-hour slots complete by 11:30
    assert_eq!(result.slots.len(), 3);
    assert!(result.warning.is_some());
}

#[test]
fn blocks_partition_the_selection() {
    let intervals = schedule(&[5.0, 30.0, 5.0, 5.0, 30.0, 5.0]);
    let result = select_slots(&profile(), 50.0, 80.0, &intervals, at(9, 0), None);
    let counted: usize = result.blocks.iter().map(|b| b.slot_count).sum();
    assert_eq!(counted, result.slots.len());
    assert_eq!(result.is_contiguous, result.blocks.len() == 1);

    let block_cost: f64 = result.blocks.iter().map(|b| b.total_cost_pence).sum();
    assert!((result.total_cost_pence - block_cost).abs() < 1e-9);

    let direct_cost: f64 = result.slots.iter().map(|s| s.rate * 3.5).sum();
    assert!((result.total_cost_pence - direct_cost).abs() < 1e-9);
}

#[test]
fn contiguous_selection_forms_a_single_block() {
    let intervals = vec![
        slot("2026-08-29T10:00:00Z", "2026-08-29T10:30:00Z", 20.0),
        slot("2026-08-29T10:30:00Z", "2026-08-29T11:00:00Z", 5.0),
        slot("2026-08-29T11:00:00Z", "2026-08-29T11:30:00Z", 5.0),
    ];
    let result = select_slots(&profile(), 80.0, 89.0, &intervals, at(9, 0), None);
    assert_eq!(result.slots_needed, 2);
    assert!(result.is_contiguous);
    assert_eq!(result.blocks.len(), 1);
    assert_eq!(result.blocks[0].start, "2026-08-29T10:30:00Z");
    assert_eq!(result.blocks[0].end, "2026-08-29T11:30:00Z");
    assert!((result.blocks[0].kwh - 7.0).abs() < 1e-9);
    assert!((result.blocks[0].avg_rate - 5.0).abs() < 1e-9);
    assert!((result.total_cost_pence - 35.0).abs() < 1e-9);
}

#[test]
fn shortfall_selects_everything_available_and_warns() {
    let intervals = schedule(&[10.0, 11.0]);
    let result = select_slots(&profile(), 50.0, 80.0, &intervals, at(9, 0), None);
    assert_eq!(result.slots_needed, 7);
    assert_eq!(result.slots.len(), 2);
    assert!(result.warning.is_some());

    // Deadline phrasing differs from the plain shortfall phrasing
    let with_deadline =
        select_slots(&profile(), 50.0, 80.0, &intervals, at(9, 0), Some(at(11, 0)));
    assert_ne!(with_deadline.warning, result.warning);
}

#[test]
fn empty_schedule_is_a_warning_not_an_error() {
    let result = select_slots(&profile(), 50.0, 80.0, &[], at(9, 0), None);
    assert_eq!(result.slots_needed, 7);
    assert!(result.slots.is_empty());
    assert!(result.blocks.is_empty());
    assert_eq!(result.total_cost_pence, 0.0);
    assert!(result.warning.is_some());
}

#[test]
fn malformed_rows_never_abort_the_batch() {
    let mut intervals = schedule(&[6.0, 7.0, 8.0]);
    intervals.push(slot("not a timestamp", "also bad", 0.1));
    let result = select_slots(&profile(), 70.0, 84.0, &intervals, at(9, 0), None);
    // The bogus dirt-cheap row is dropped, the three real slots are picked
    assert_eq!(result.slots.len(), 3);
    assert!(result.slots.iter().all(|s| s.rate >= 6.0));
}

#[test]
fn custom_profile_changes_the_energy_math() {
    // 11 kW three-phase charger on a smaller 40 kWh pack
    let profile = ChargeProfile {
        battery_capacity_kwh: 40.0,
        charger_power_kw: 11.0,
        slot_duration_hours: 0.5,
    };
    // 20% of 40 kWh is 8 kWh; ceil(8 / 5.5) = 2 slots
    let result = select_slots(&profile, 60.0, 80.0, &schedule(&[5.0; 6]), at(9, 0), None);
    assert!((result.kwh_needed - 8.0).abs() < 1e-9);
    assert_eq!(result.slots_needed, 2);
}
