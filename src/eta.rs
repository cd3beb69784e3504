// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distance and arrival-time formatting.

use geo::{Distance, HaversineMeasure, Point};
use std::fmt;
use std::str::FromStr;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let earth = HaversineMeasure::new(EARTH_RADIUS_KM * 1000.0);
    earth.distance(Point::new(lon1, lat1), Point::new(lon2, lat2)) / 1000.0
}

/// Human-readable time to arrival.
pub fn format_eta(minutes: f64) -> String {
    if !minutes.is_finite() {
        return "N/A".to_string();
    }
    if minutes <= 0.0 {
        return "Arriving now".to_string();
    }
    if minutes < 1.0 {
        return "< 1 min".to_string();
    }
    format!("{} min", minutes.round() as i64)
}

/// ETA for a bus `distance_km` away travelling at `speed` km/h.
pub fn estimate_eta(distance_km: f64, speed: Option<f64>) -> String {
    estimate_eta_in(distance_km, speed, SpeedUnit::KilometersPerHour)
}

/// ETA with the speed's unit stated explicitly.
pub fn estimate_eta_in(distance_km: f64, speed: Option<f64>, unit: SpeedUnit) -> String {
    let speed_kmh = match speed {
        Some(s) if s > 0.0 => unit.to_kmh(s),
        _ => return "Not moving".to_string(),
    };

    let minutes = distance_km / speed_kmh * 60.0;
    tracing::trace!(distance_km, speed_kmh, minutes, "ETA computed");
    format_eta(minutes)
}

/// Unit the backend reports `speed` in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedUnit {
    #[default]
    KilometersPerHour,
    MetersPerSecond,
}

impl SpeedUnit {
    pub fn to_kmh(self, speed: f64) -> f64 {
        match self {
            SpeedUnit::KilometersPerHour => speed,
            SpeedUnit::MetersPerSecond => speed * 3.6,
        }
    }
}

impl FromStr for SpeedUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kmh" | "km/h" | "kph" => Ok(SpeedUnit::KilometersPerHour),
            "mps" | "m/s" => Ok(SpeedUnit::MetersPerSecond),
            other => Err(format!("unknown speed unit: {}", other)),
        }
    }
}

impl fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedUnit::KilometersPerHour => write!(f, "km/h"),
            SpeedUnit::MetersPerSecond => write!(f, "m/s"),
        }
    }
}
