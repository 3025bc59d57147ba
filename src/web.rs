//! Axum-based HTTP server exposing the optimizer over a small JSON API

use axum::response::Redirect;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::ha::{BatterySource, RateSource};
use crate::optimizer::{ChargeProfile, select_slots};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub battery: Arc<dyn BatterySource>,
    pub rates: Arc<dyn RateSource>,
}

#[derive(Debug, Deserialize)]
pub struct CalculateParams {
    /// Target charge percentage; defaults to the configured value
    pub target: Option<u8>,

    /// Departure deadline, RFC 3339; all selected slots must end by then
    pub deadline: Option<String>,
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Current vehicle and tariff snapshot plus the active charger configuration
async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let charging = &state.config.charging;
    let config_echo = serde_json::json!({
        "battery_capacity_kwh": charging.battery_capacity_kwh,
        "charger_power_kw": charging.charger_power_kw,
        "kwh_per_slot": charging.kwh_per_slot(),
        "default_target_percent": charging.default_target_percent,
    });

    let vehicle = match state.battery.fetch_status().await {
        Ok(status) => serde_json::to_value(status)
            .unwrap_or_else(|_| serde_json::json!({"error": "serialization"})),
        Err(e) => serde_json::json!({"error": e.to_string()}),
    };

    let (rates, rates_info) = match state.rates.fetch_schedule().await {
        Ok(schedule) => {
            let info = serde_json::json!({
                "includes_today": schedule.includes_today,
                "includes_tomorrow": schedule.includes_tomorrow,
                "total_slots": schedule.intervals.len(),
            });
            let rates = serde_json::to_value(schedule.intervals)
                .unwrap_or_else(|_| serde_json::json!([]));
            (rates, info)
        }
        Err(e) => (
            serde_json::json!([]),
            serde_json::json!({"error": e.to_string()}),
        ),
    };

    Json(serde_json::json!({
        "version": env!("APP_VERSION"),
        "vehicle": vehicle,
        "rates": rates,
        "rates_info": rates_info,
        "config": config_echo,
    }))
}

/// Run the optimizer against fresh battery and rate snapshots
async fn calculate(
    State(state): State<AppState>,
    Query(params): Query<CalculateParams>,
) -> (StatusCode, Json<serde_json::Value>) {
    let deadline: Option<DateTime<Utc>> = match &params.deadline {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": "invalid deadline, expected RFC 3339"})),
                );
            }
        },
        None => None,
    };

    let battery = match state.battery.fetch_status().await {
        Ok(status) => status,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            );
        }
    };

    let schedule = match state.rates.fetch_schedule().await {
        Ok(schedule) => schedule,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            );
        }
    };

    let charging = &state.config.charging;
    let target = f64::from(params.target.unwrap_or(charging.default_target_percent));
    let profile = ChargeProfile::from(charging);

    let selection = select_slots(
        &profile,
        battery.battery_percent,
        target,
        &schedule.intervals,
        Utc::now(),
        deadline,
    );

    let mut body = serde_json::to_value(selection)
        .unwrap_or_else(|_| serde_json::json!({"error": "serialization"}));
    if let Some(obj) = body.as_object_mut() {
        obj.insert(
            "current_percent".to_string(),
            serde_json::json!(battery.battery_percent),
        );
        obj.insert("target_percent".to_string(), serde_json::json!(target));
        obj.insert(
            "kwh_per_slot".to_string(),
            serde_json::json!(charging.kwh_per_slot()),
        );
        obj.insert(
            "includes_tomorrow".to_string(),
            serde_json::json!(schedule.includes_tomorrow),
        );
    }
    (StatusCode::OK, Json(body))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/api/status") }))
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/calculate", get(calculate))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let router = build_router(state);

    // Structured logs for web server startup and binding
    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        host, port
    ));

    let (addr, parsed_ok): (SocketAddr, bool) = match host.parse::<IpAddr>() {
        Ok(ip) => (SocketAddr::new(ip, port), true),
        Err(_) => (([127, 0, 0, 1], port).into(), false),
    };
    if !parsed_ok {
        logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router).await?;
    Ok(())
}
