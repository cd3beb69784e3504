// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registered vehicle summary.

use super::payload::RawBus;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Backend identifier of a bus.
pub type BusId = u64;

/// One registered vehicle, as listed by `GET /api/buses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct BusSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: BusId,
    pub bus_name: String,
    pub driver_name: Option<String>,
    pub license_plate: Option<String>,
    pub is_active: bool,
}

impl BusSummary {
    /// Convert a wire entry; entries without an id are rejected.
    pub fn from_raw(raw: RawBus) -> Option<Self> {
        let id = raw.id?;
        Some(Self {
            id,
            bus_name: raw
                .bus_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Bus {}", id)),
            driver_name: raw.driver_name,
            license_plate: raw.license_plate,
            is_active: raw.is_active != Some(false),
        })
    }
}
