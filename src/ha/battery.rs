//! Battery state source: vehicle charge level via Home Assistant sensors

use serde::Serialize;
use std::sync::Arc;

use crate::config::HomeAssistantConfig;
use crate::error::{Result, WattsonError};
use crate::ha::client::HaClient;
use crate::logging::get_logger;

/// Reported charging state of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargingState {
    Charging,
    NotCharging,
    Unknown,
}

impl ChargingState {
    pub fn from_label(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "charging" | "on" | "true" => Self::Charging,
            "not_charging" | "stopped" | "disconnected" | "off" | "false" => Self::NotCharging,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charging => "charging",
            Self::NotCharging => "not_charging",
            Self::Unknown => "unknown",
        }
    }
}

/// Snapshot of the vehicle battery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryStatus {
    /// Current state of charge, 0-100
    pub battery_percent: f64,

    /// Remaining range in miles, when the sensor is available
    pub range_miles: Option<f64>,

    /// Charging state, `Unknown` when the sensor is unavailable
    pub charging_state: ChargingState,
}

/// Source of vehicle battery snapshots
#[async_trait::async_trait]
pub trait BatterySource: Send + Sync {
    async fn fetch_status(&self) -> Result<BatteryStatus>;
}

/// Battery source backed by Home Assistant vehicle sensors
pub struct HaBatterySource {
    client: Arc<HaClient>,
    battery_entity: String,
    range_entity: String,
    charging_entity: String,
    logger: crate::logging::StructuredLogger,
}

impl HaBatterySource {
    pub fn new(client: Arc<HaClient>, cfg: &HomeAssistantConfig) -> Self {
        let logger = get_logger("battery");
        Self {
            client,
            battery_entity: cfg.battery_entity.clone(),
            range_entity: cfg.range_entity.clone(),
            charging_entity: cfg.charging_entity.clone(),
            logger,
        }
    }
}

#[async_trait::async_trait]
impl BatterySource for HaBatterySource {
    /// Fetch the battery snapshot.
    ///
    /// The charge level is mandatory; a fetch or parse failure there fails the
    /// whole snapshot. Range and charging state are optional sensors and
    /// degrade to `None` / `Unknown`.
    async fn fetch_status(&self) -> Result<BatteryStatus> {
        let battery_state = self.client.get_state(&self.battery_entity).await?;
        let battery_percent = state_as_f64(&battery_state).ok_or_else(|| {
            WattsonError::api(format!(
                "Battery sensor {} has no numeric state",
                self.battery_entity
            ))
        })?;

        let range_miles = match self.client.get_state(&self.range_entity).await {
            Ok(state) => state_as_f64(&state),
            Err(_) => None,
        };

        let charging_state = match self.client.get_state(&self.charging_entity).await {
            Ok(state) => state
                .get("state")
                .and_then(|v| v.as_str())
                .map_or(ChargingState::Unknown, ChargingState::from_label),
            Err(_) => ChargingState::Unknown,
        };

        self.logger.debug(&format!(
            "Battery at {:.1}%, charging_state={}",
            battery_percent,
            charging_state.as_str()
        ));

        Ok(BatteryStatus {
            battery_percent,
            range_miles,
            charging_state,
        })
    }
}

/// Numeric value of a Home Assistant state object, if it has one
fn state_as_f64(state: &serde_json::Value) -> Option<f64> {
    state
        .get("state")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
}
