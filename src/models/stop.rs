//! Bus stop model.

use super::payload::RawStop;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A bus stop. Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct Stop {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub lat: f64,
    pub long: f64,
}

impl Stop {
    /// Convert a wire entry; stops without an id or coordinates are rejected.
    pub fn from_raw(raw: RawStop) -> Option<Self> {
        Some(Self {
            id: raw.id?,
            name: raw.name.unwrap_or_default(),
            lat: raw.latitude?,
            long: raw.longitude?,
        })
    }
}
