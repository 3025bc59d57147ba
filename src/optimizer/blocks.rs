//! Grouping of selected slots into contiguous charging blocks

use crate::optimizer::types::{ChargeBlock, PriceInterval, parse_rfc3339_utc};

/// Group a time-sorted selection into maximal contiguous blocks.
///
/// Two slots are contiguous iff the first block's end equals the next slot's
/// start exactly. Agile feeds publish exact half-hour boundaries, so no
/// tolerance is applied; any gap starts a new block.
///
/// Returns the blocks and whether the whole selection is one block.
pub fn group_blocks(slots: &[PriceInterval], kwh_per_slot: f64) -> (Vec<ChargeBlock>, bool) {
    let mut blocks: Vec<ChargeBlock> = Vec::new();

    let Some(first) = slots.first() else {
        return (blocks, false);
    };

    let mut current = BlockAccumulator::start(first);
    for slot in &slots[1..] {
        let current_end = parse_rfc3339_utc(&current.end);
        let next_start = parse_rfc3339_utc(&slot.start);
        match (current_end, next_start) {
            (Some(end), Some(start)) if end == start => current.extend(slot),
            // Gap, or an unparsable boundary: close the block and start fresh
            _ => {
                blocks.push(current.finish(kwh_per_slot));
                current = BlockAccumulator::start(slot);
            }
        }
    }
    blocks.push(current.finish(kwh_per_slot));

    let is_contiguous = blocks.len() == 1;
    (blocks, is_contiguous)
}

/// In-progress block while scanning the selection
struct BlockAccumulator {
    start: String,
    end: String,
    rates: Vec<f64>,
}

impl BlockAccumulator {
    fn start(slot: &PriceInterval) -> Self {
        Self {
            start: slot.start.clone(),
            end: slot.end.clone(),
            rates: vec![slot.rate],
        }
    }

    fn extend(&mut self, slot: &PriceInterval) {
        self.end = slot.end.clone();
        self.rates.push(slot.rate);
    }

    fn finish(self, kwh_per_slot: f64) -> ChargeBlock {
        let slot_count = self.rates.len();
        let rate_sum: f64 = self.rates.iter().sum();
        ChargeBlock {
            start: self.start,
            end: self.end,
            slot_count,
            kwh: slot_count as f64 * kwh_per_slot,
            // Unweighted mean; equivalent to energy-weighted while every slot
            // carries the same fixed energy
            avg_rate: rate_sum / slot_count as f64,
            total_cost_pence: rate_sum * kwh_per_slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: &str, end: &str, rate: f64) -> PriceInterval {
        PriceInterval {
            start: start.to_string(),
            end: end.to_string(),
            rate,
        }
    }

    #[test]
    fn single_run_is_one_block() {
        let slots = vec![
            slot("2026-08-29T22:00:00Z", "2026-08-29T22:30:00Z", 10.0),
            slot("2026-08-29T22:30:00Z", "2026-08-29T23:00:00Z", 12.0),
            slot("2026-08-29T23:00:00Z", "2026-08-29T23:30:00Z", 11.0),
        ];
        let (blocks, contiguous) = group_blocks(&slots, 3.5);
        assert!(contiguous);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].slot_count, 3);
        assert_eq!(blocks[0].start, "2026-08-29T22:00:00Z");
        assert_eq!(blocks[0].end, "2026-08-29T23:30:00Z");
        assert!((blocks[0].avg_rate - 11.0).abs() < 1e-9);
        assert!((blocks[0].kwh - 10.5).abs() < 1e-9);
        assert!((blocks[0].total_cost_pence - 33.0 * 3.5).abs() < 1e-9);
    }

    #[test]
    fn gap_splits_blocks() {
        let slots = vec![
            slot("2026-08-29T22:00:00Z", "2026-08-29T22:30:00Z", 10.0),
            slot("2026-08-30T01:00:00Z", "2026-08-30T01:30:00Z", 8.0),
            slot("2026-08-30T01:30:00Z", "2026-08-30T02:00:00Z", 9.0),
        ];
        let (blocks, contiguous) = group_blocks(&slots, 3.5);
        assert!(!contiguous);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].slot_count, 1);
        assert_eq!(blocks[1].slot_count, 2);
        assert!((blocks[1].avg_rate - 8.5).abs() < 1e-9);
    }

    #[test]
    fn equal_offsets_in_different_timezones_are_contiguous() {
        // 23:00Z == 00:00+01:00
        let slots = vec![
            slot("2026-08-29T22:30:00Z", "2026-08-29T23:00:00Z", 10.0),
            slot("2026-08-30T00:00:00+01:00", "2026-08-30T00:30:00+01:00", 9.0),
        ];
        let (blocks, contiguous) = group_blocks(&slots, 3.5);
        assert!(contiguous);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn empty_selection_has_no_blocks() {
        let (blocks, contiguous) = group_blocks(&[], 3.5);
        assert!(blocks.is_empty());
        assert!(!contiguous);
    }

    #[test]
    fn unparsable_boundary_starts_new_block() {
        let slots = vec![
            slot("2026-08-29T22:00:00Z", "not-a-timestamp", 10.0),
            slot("2026-08-29T22:30:00Z", "2026-08-29T23:00:00Z", 9.0),
        ];
        let (blocks, contiguous) = group_blocks(&slots, 3.5);
        assert!(!contiguous);
        assert_eq!(blocks.len(), 2);
    }
}
