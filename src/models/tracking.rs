// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalized per-bus tracking state.
//!
//! Every numeric field of a [`TrackingRecord`] is always populated: missing
//! upstream values are replaced by the reference coordinate and zero
//! speed/passengers, so display code never branches on absent fields.

use super::bus::{BusId, BusSummary};
use super::payload::{RawSample, RawTracking};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Reference latitude used whenever a position is unknown.
pub const FALLBACK_LAT: f64 = 14.683015;
/// Reference longitude used whenever a position is unknown.
pub const FALLBACK_LONG: f64 = 120.538018;

const MSG_LIVE: &str = "Data loaded successfully";
const MSG_MOCK: &str = "Using mock data";
const MSG_UNAVAILABLE: &str = "No tracking data available";

/// A single position report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct PositionSample {
    pub lat: f64,
    pub long: f64,
    /// Speed as reported upstream (unit per configuration)
    pub speed: f64,
    pub passenger_count: u32,
}

impl Default for PositionSample {
    fn default() -> Self {
        Self::fallback()
    }
}

impl PositionSample {
    pub const fn fallback() -> Self {
        Self {
            lat: FALLBACK_LAT,
            long: FALLBACK_LONG,
            speed: 0.0,
            passenger_count: 0,
        }
    }

    pub const fn new(lat: f64, long: f64, speed: f64, passenger_count: u32) -> Self {
        Self {
            lat,
            long,
            speed,
            passenger_count,
        }
    }

    /// Default every missing field of a wire sample.
    pub fn from_raw(raw: &RawSample) -> Self {
        Self {
            lat: raw.lat().unwrap_or(FALLBACK_LAT),
            long: raw.long().unwrap_or(FALLBACK_LONG),
            speed: raw.speed.unwrap_or(0.0),
            passenger_count: raw.passengers().unwrap_or(0),
        }
    }
}

/// Display-ready state of one bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct TrackingRecord {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: BusId,
    pub bus_name: String,
    pub driver_name: String,
    pub license_plate: String,
    pub path_travelled: Vec<PositionSample>,
    pub current_position: PositionSample,
    pub is_active: bool,
    pub last_updated: String,
    /// False when the record came from mock data or is an error record
    pub from_api: bool,
    pub error: bool,
    pub message: String,
}

impl TrackingRecord {
    /// Normalize a live tracking payload.
    ///
    /// `summary` is the bus list entry, if known, used for missing names.
    pub fn from_payload(
        bus_id: BusId,
        raw: &RawTracking,
        summary: Option<&BusSummary>,
        now: DateTime<Utc>,
    ) -> Self {
        let path_travelled: Vec<PositionSample> =
            raw.samples().iter().map(PositionSample::from_raw).collect();

        let current_position = match &raw.current_position {
            Some(current) if current.has_coordinates() => PositionSample::from_raw(current),
            _ => match path_travelled.last() {
                Some(last) => *last,
                None => PositionSample {
                    lat: raw.latitude.unwrap_or(FALLBACK_LAT),
                    long: raw.longitude.unwrap_or(FALLBACK_LONG),
                    speed: raw.speed.unwrap_or(0.0),
                    passenger_count: raw.passenger_count.unwrap_or(0),
                },
            },
        };

        let (bus_name, driver_name, license_plate) = names(
            bus_id,
            raw.bus_name.as_deref(),
            raw.driver_name.as_deref(),
            raw.license_plate.as_deref(),
            summary,
        );

        Self {
            id: raw.id.unwrap_or(bus_id),
            bus_name,
            driver_name,
            license_plate,
            path_travelled,
            current_position,
            is_active: raw.is_active != Some(false),
            last_updated: raw
                .updated()
                .map(str::to_string)
                .unwrap_or_else(|| format_utc_rfc3339(now)),
            from_api: true,
            error: false,
            message: MSG_LIVE.to_string(),
        }
    }

    /// Record built from the static fallback dataset.
    pub fn from_mock(
        bus_id: BusId,
        bus_name: &str,
        path: &[PositionSample],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: bus_id,
            bus_name: bus_name.to_string(),
            driver_name: format!("Driver {}", bus_id),
            license_plate: format!("ABC-{}", bus_id),
            path_travelled: path.to_vec(),
            current_position: path.last().copied().unwrap_or_default(),
            is_active: true,
            last_updated: format_utc_rfc3339(now),
            from_api: false,
            error: false,
            message: MSG_MOCK.to_string(),
        }
    }

    /// Explicit error record for a bus with neither live nor mock data.
    pub fn unavailable(bus_id: BusId, summary: Option<&BusSummary>, now: DateTime<Utc>) -> Self {
        let (bus_name, driver_name, license_plate) = names(bus_id, None, None, None, summary);
        Self {
            id: bus_id,
            bus_name,
            driver_name,
            license_plate,
            path_travelled: Vec::new(),
            current_position: PositionSample::fallback(),
            is_active: false,
            last_updated: format_utc_rfc3339(now),
            from_api: false,
            error: true,
            message: MSG_UNAVAILABLE.to_string(),
        }
    }

    /// Whether the periodic poll should keep refreshing this bus.
    pub fn is_pollable(&self) -> bool {
        self.is_active && !self.error
    }
}

fn names(
    bus_id: BusId,
    bus_name: Option<&str>,
    driver_name: Option<&str>,
    license_plate: Option<&str>,
    summary: Option<&BusSummary>,
) -> (String, String, String) {
    let pick = |wire: Option<&str>, known: Option<&str>, default: String| {
        wire.filter(|s| !s.is_empty())
            .or(known.filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or(default)
    };

    (
        pick(
            bus_name,
            summary.map(|s| s.bus_name.as_str()),
            format!("Bus {}", bus_id),
        ),
        pick(
            driver_name,
            summary.and_then(|s| s.driver_name.as_deref()),
            "Not assigned".to_string(),
        ),
        pick(
            license_plate,
            summary.and_then(|s| s.license_plate.as_deref()),
            "N/A".to_string(),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> RawTracking {
        serde_json::from_value(value).expect("valid tracking payload")
    }

    #[test]
    fn test_empty_payload_is_fully_defaulted() {
        let now = Utc::now();
        let record = TrackingRecord::from_payload(7, &parse(json!({})), None, now);

        assert_eq!(record.id, 7);
        assert_eq!(record.bus_name, "Bus 7");
        assert_eq!(record.driver_name, "Not assigned");
        assert_eq!(record.license_plate, "N/A");
        assert_eq!(record.current_position, PositionSample::fallback());
        assert!(record.path_travelled.is_empty());
        assert!(record.is_active);
        assert!(record.from_api);
        assert!(!record.error);
        assert_eq!(record.last_updated, format_utc_rfc3339(now));
    }

    #[test]
    fn test_current_position_preferred_when_valid() {
        let raw = parse(json!({
            "path_travelled": [{"lat": 1.0, "long": 1.0}],
            "current_position": {"lat": "14.69", "long": "120.54", "speed": 30}
        }));
        let record = TrackingRecord::from_payload(1, &raw, None, Utc::now());

        assert_eq!(record.current_position, PositionSample::new(14.69, 120.54, 30.0, 0));
    }

    #[test]
    fn test_last_path_sample_used_without_valid_current() {
        let raw = parse(json!({
            "path": [
                {"lat": 14.1, "long": 120.1},
                {"latitude": 14.2, "longitude": 120.2, "speed": 12.5, "total_passenger": 4}
            ],
            "current_position": {"lat": 14.9}
        }));
        let record = TrackingRecord::from_payload(1, &raw, None, Utc::now());

        assert_eq!(record.path_travelled.len(), 2);
        assert_eq!(record.current_position, PositionSample::new(14.2, 120.2, 12.5, 4));
    }

    #[test]
    fn test_partial_samples_defaulted_field_by_field() {
        let raw = parse(json!({
            "path_travelled": [{"lat": 14.3}, {"speed": null}, {"long": "120.4"}]
        }));
        let record = TrackingRecord::from_payload(2, &raw, None, Utc::now());

        let path = &record.path_travelled;
        assert_eq!(path[0], PositionSample::new(14.3, FALLBACK_LONG, 0.0, 0));
        assert_eq!(path[1], PositionSample::fallback());
        assert_eq!(path[2], PositionSample::new(FALLBACK_LAT, 120.4, 0.0, 0));
        assert!(path
            .iter()
            .all(|s| s.lat.is_finite() && s.long.is_finite() && s.speed.is_finite()));
    }

    #[test]
    fn test_flat_fields_used_without_samples() {
        let raw = parse(json!({"latitude": 14.5, "longitude": 120.6, "speed": 8}));
        let record = TrackingRecord::from_payload(3, &raw, None, Utc::now());

        assert_eq!(record.current_position, PositionSample::new(14.5, 120.6, 8.0, 0));
    }

    #[test]
    fn test_inactive_only_when_explicitly_false() {
        let inactive = parse(json!({"is_active": false}));
        let unknown = parse(json!({"is_active": null}));

        assert!(!TrackingRecord::from_payload(1, &inactive, None, Utc::now()).is_active);
        assert!(TrackingRecord::from_payload(1, &unknown, None, Utc::now()).is_active);
    }

    #[test]
    fn test_names_fall_back_to_summary() {
        let summary = BusSummary {
            id: 4,
            bus_name: "Route 4".to_string(),
            driver_name: Some("Ana".to_string()),
            license_plate: None,
            is_active: true,
        };
        let raw = parse(json!({"driver_name": ""}));
        let record = TrackingRecord::from_payload(4, &raw, Some(&summary), Utc::now());

        assert_eq!(record.bus_name, "Route 4");
        assert_eq!(record.driver_name, "Ana");
        assert_eq!(record.license_plate, "N/A");
    }

    #[test]
    fn test_unavailable_record() {
        let record = TrackingRecord::unavailable(99, None, Utc::now());

        assert!(record.error);
        assert!(!record.is_active);
        assert!(!record.from_api);
        assert!(!record.message.is_empty());
        assert!(!record.is_pollable());
    }

    #[test]
    fn test_mock_record_uses_last_sample() {
        let path = [
            PositionSample::new(14.0, 120.0, 10.0, 3),
            PositionSample::new(14.1, 120.1, 20.0, 5),
        ];
        let record = TrackingRecord::from_mock(1, "Mock", &path, Utc::now());

        assert_eq!(record.current_position, path[1]);
        assert_eq!(record.driver_name, "Driver 1");
        assert_eq!(record.license_plate, "ABC-1");
        assert!(!record.from_api);
        assert!(record.is_pollable());
    }
}
