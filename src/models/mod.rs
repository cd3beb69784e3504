// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod bus;
pub mod payload;
pub mod stop;
pub mod tracking;
pub mod user;

pub use bus::{BusId, BusSummary};
pub use stop::Stop;
pub use tracking::{PositionSample, TrackingRecord, FALLBACK_LAT, FALLBACK_LONG};
pub use user::{AuthResponse, Session, User};
