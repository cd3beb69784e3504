// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wire shapes returned by the backend.
//!
//! The backend is loose about shapes: lists may come bare or wrapped in
//! `{data: [...]}`, several fields have legacy aliases, and numbers sometimes
//! arrive as strings. Everything is parsed into these raw structs first and
//! converted into the canonical models in one place, so nothing downstream
//! has to branch on payload shape.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A list endpoint response: either a bare array or a `{data: [...]}` resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { data } => data,
        }
    }
}

/// Entry of `GET /api/buses`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBus {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub bus_name: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default, deserialize_with = "loose_flag")]
    pub is_active: Option<bool>,
}

/// Entry of `GET /api/stops`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStop {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub longitude: Option<f64>,
}

/// Body of `GET /api/buses/{id}/tracking`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingEnvelope {
    #[serde(default, deserialize_with = "loose_flag")]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<RawTracking>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TrackingEnvelope {
    /// The tracking payload, if the backend reported success.
    pub fn into_data(self) -> Option<RawTracking> {
        if self.success == Some(true) {
            self.data
        } else {
            None
        }
    }
}

/// Tracking payload for one bus.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTracking {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub bus_name: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,

    #[serde(default)]
    pub path_travelled: Option<Vec<RawSample>>,
    /// Legacy name of `path_travelled`.
    #[serde(default)]
    pub path: Option<Vec<RawSample>>,
    #[serde(default)]
    pub current_position: Option<RawSample>,

    #[serde(default)]
    pub updated_at: Option<String>,
    /// Legacy name of `updated_at`.
    #[serde(default)]
    pub last_updated: Option<String>,

    #[serde(default, deserialize_with = "loose_flag")]
    pub is_active: Option<bool>,

    // Flat position fields, used only when there is no sample at all.
    #[serde(default, deserialize_with = "loose_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "loose_count")]
    pub passenger_count: Option<u32>,
}

impl RawTracking {
    /// Path samples under whichever name the backend used.
    pub fn samples(&self) -> &[RawSample] {
        self.path_travelled
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or(&[])
    }

    pub fn updated(&self) -> Option<&str> {
        self.updated_at
            .as_deref()
            .or(self.last_updated.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// One position sample. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSample {
    #[serde(default, deserialize_with = "loose_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub long: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "loose_count")]
    pub passenger_count: Option<u32>,
    #[serde(default, deserialize_with = "loose_count")]
    pub total_passenger: Option<u32>,
}

impl RawSample {
    pub fn lat(&self) -> Option<f64> {
        self.lat.or(self.latitude)
    }

    pub fn long(&self) -> Option<f64> {
        self.long.or(self.longitude)
    }

    pub fn passengers(&self) -> Option<u32> {
        self.passenger_count.or(self.total_passenger)
    }

    pub fn has_coordinates(&self) -> bool {
        self.lat().is_some() && self.long().is_some()
    }
}

/// Error body of a failed request: `{error}` and/or `{message}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Pick the server message, preferring `message` over `error` if asked.
    pub fn pick(self, prefer_message: bool) -> Option<String> {
        let (first, second) = if prefer_message {
            (self.message, self.error)
        } else {
            (self.error, self.message)
        };
        first.or(second).filter(|m| !m.trim().is_empty())
    }
}

/// Parse a JSON number or numeric string; anything else (or NaN) is absent.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

fn loose_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn loose_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round().min(u32::MAX as f64) as u32))
}

fn loose_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// `true` unless the value is explicitly `false`; `null`/missing is unknown.
fn loose_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(_) => Some(true),
    })
}
