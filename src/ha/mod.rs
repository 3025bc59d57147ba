//! Home Assistant API integration
//!
//! Collaborators that feed the optimizer: the battery state source (vehicle
//! sensors) and the rate source (Octopus Agile tariff feeds). Fetch failures
//! here are fatal for a calculation and propagate unmodified; individual bad
//! data rows are absorbed where they occur.

pub mod battery;
pub mod client;
pub mod rates;

// Re-exports for the public API surface
pub use battery::{BatterySource, BatteryStatus, ChargingState, HaBatterySource};
pub use client::HaClient;
pub use rates::{HaRateSource, RateSchedule, RateSource, schedule_from_states};
