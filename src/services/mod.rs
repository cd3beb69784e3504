// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access, session and tracking logic.

pub mod api;
pub mod auth;
pub mod geocoding;
pub mod mock_data;
pub mod password_reset;
pub mod poller;
pub mod storage;
pub mod tracking;

pub use api::{ApiClient, ForgotPasswordResponse};
pub use auth::{AuthSession, AuthState};
pub use geocoding::{AddressResolver, NoGeocoder, Placemark, ReverseGeocoder};
pub use mock_data::{MockBus, MockDataset};
pub use password_reset::{PasswordReset, ResetStep};
pub use poller::TrackingPoller;
pub use storage::{FileStore, MemoryStore, SecureStore};
pub use tracking::{BusTracker, FetchOutcome, ViewMount};
