//! Cheapest-slot charging optimizer
//!
//! The core of Wattson: given a battery deficit and a published list of priced
//! half-hour slots, pick the minimum number of cheapest eligible slots and
//! group them into contiguous charging blocks with cost summaries. Pure
//! functions over their inputs; fetching lives in [`crate::ha`].

pub mod blocks;
pub mod select;
pub mod types;

// Re-exports for the public API surface
pub use blocks::group_blocks;
pub use select::select_slots;
pub use types::{ChargeBlock, ChargeProfile, PriceInterval, SlotSelection};
