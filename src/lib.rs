//! # Wattson - cheapest-slot EV charging optimizer
//!
//! Wattson picks the cheapest half-hour electricity slots from a published
//! Octopus Agile price schedule to charge a vehicle battery from its current
//! state of charge to a target, optionally constrained by a departure
//! deadline. Battery state and tariff data come from a Home Assistant
//! instance; a small JSON API exposes the results.
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of
//! concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `optimizer`: The pure slot-selection core (energy math, cheapest-first
//!   ranking, contiguous block grouping)
//! - `ha`: Home Assistant collaborators (battery state source, rate source)
//! - `web`: HTTP server and REST API
//!
//! The optimizer performs no I/O and reads no clocks; every calculation runs
//! over a fresh snapshot fetched per request.

pub mod config;
pub mod error;
pub mod ha;
pub mod logging;
pub mod optimizer;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, WattsonError};
pub use optimizer::{ChargeBlock, ChargeProfile, PriceInterval, SlotSelection, select_slots};
