// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bus tracking reconciler.
//!
//! Merges live tracking payloads, the static mock dataset and synthetic
//! error records into one [`TrackingRecord`] per bus. Network and payload
//! failures never escape: a bus either gets live data, mock data, or an
//! explicit error record.
//!
//! In-flight fetches are tracked per bus id in a busy map holding the
//! sequence number of the latest dispatched fetch. A non-forced fetch for a
//! busy bus is skipped; a forced one is dispatched anyway and supersedes
//! the older fetch, whose completion is then discarded.
//!
//! Fetches issued on behalf of a view carry that view's [`ViewMount`]; once
//! the view releases it, results that arrive later are dropped. Other views
//! sharing the same tracker are unaffected.

use crate::models::{BusId, BusSummary, Stop, TrackingRecord};
use crate::services::api::ApiClient;
use crate::services::mock_data::MockDataset;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Latest record per bus, shared between the view and the poller.
pub type RecordMap = Arc<DashMap<BusId, TrackingRecord>>;

/// Busy map: bus id → sequence number of the latest dispatched fetch.
pub type InFlight = Arc<DashMap<BusId, u64>>;

/// Upper bound on concurrent fetches in one poll round.
const MAX_CONCURRENT_POLLS: usize = 8;

/// Liveness token of one tracking view. Clones share the flag.
#[derive(Debug, Clone)]
pub struct ViewMount(Arc<AtomicBool>);

impl ViewMount {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// The view went away; its pending results will be discarded.
    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for ViewMount {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one `fetch_bus_data` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A fetch was already in flight and this one was not forced.
    Skipped,
    /// Stored a record built from the live payload.
    Live,
    /// Live fetch failed; stored the mock record.
    Mock,
    /// Live fetch failed and no mock exists; stored an error record.
    Unavailable,
    /// Completed after being superseded or after its view unmounted;
    /// nothing stored.
    Discarded,
}

/// Reconciler state. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BusTracker {
    api: ApiClient,
    mock: Arc<MockDataset>,
    records: RecordMap,
    in_flight: InFlight,
    next_seq: Arc<AtomicU64>,
    buses: Arc<RwLock<Vec<BusSummary>>>,
    stops: Arc<RwLock<Vec<Stop>>>,
    api_error: Arc<RwLock<Option<String>>>,
    initial_loading: Arc<AtomicBool>,
}

impl BusTracker {
    pub fn new(api: ApiClient, mock: MockDataset) -> Self {
        Self {
            api,
            mock: Arc::new(mock),
            records: Arc::new(DashMap::new()),
            in_flight: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
            buses: Arc::new(RwLock::new(Vec::new())),
            stops: Arc::new(RwLock::new(Vec::new())),
            api_error: Arc::new(RwLock::new(None)),
            initial_loading: Arc::new(AtomicBool::new(true)),
        }
    }

    // ─── Bus list and stops ──────────────────────────────────────────────────

    /// Load the bus list, falling back to the mock buses on failure.
    pub async fn fetch_bus_list(&self) -> Vec<BusSummary> {
        *write(&self.api_error) = None;

        let buses = match self.api.list_buses().await {
            Ok(buses) => {
                tracing::info!(count = buses.len(), "Bus list loaded");
                buses
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load bus list, using mock data");
                *write(&self.api_error) = Some(format!("Failed to load buses: {}", e));
                self.mock.summaries()
            }
        };

        *write(&self.buses) = buses.clone();
        self.initial_loading.store(false, Ordering::Release);
        buses
    }

    /// Load the stop list, falling back to the mock stops on failure.
    pub async fn fetch_stops(&self) -> Vec<Stop> {
        let stops = match self.api.list_stops().await {
            Ok(stops) => {
                tracing::info!(count = stops.len(), "Stops loaded");
                stops
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stops, using mock data");
                self.mock.stops.clone()
            }
        };

        *write(&self.stops) = stops.clone();
        stops
    }

    // ─── Per-bus tracking ────────────────────────────────────────────────────

    /// Fetch and reconcile tracking data for one bus.
    ///
    /// Without `force`, does nothing while a fetch for the same bus is in
    /// flight.
    pub async fn fetch_bus_data(&self, bus_id: BusId, force: bool) -> FetchOutcome {
        self.fetch(bus_id, force, None).await
    }

    /// Like [`fetch_bus_data`](Self::fetch_bus_data), but the result is
    /// dropped if `mount` was released before the fetch completed.
    pub async fn fetch_bus_data_for(
        &self,
        bus_id: BusId,
        force: bool,
        mount: &ViewMount,
    ) -> FetchOutcome {
        self.fetch(bus_id, force, Some(mount)).await
    }

    async fn fetch(&self, bus_id: BusId, force: bool, mount: Option<&ViewMount>) -> FetchOutcome {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;

        match self.in_flight.entry(bus_id) {
            Entry::Occupied(mut entry) => {
                if !force {
                    tracing::debug!(bus_id, "Fetch already in flight, skipping");
                    return FetchOutcome::Skipped;
                }
                entry.insert(seq);
            }
            Entry::Vacant(entry) => {
                entry.insert(seq);
            }
        }

        tracing::debug!(bus_id, seq, force, "Fetching tracking data");
        let summary = self.summary(bus_id);
        let now = Utc::now();

        let (record, outcome) = match self.api.bus_tracking(bus_id).await {
            Ok(raw) => (
                TrackingRecord::from_payload(bus_id, &raw, summary.as_ref(), now),
                FetchOutcome::Live,
            ),
            Err(e) => {
                tracing::warn!(bus_id, error = %e, "Tracking fetch failed, falling back");
                match self.mock.bus(bus_id) {
                    Some(mock) => (
                        TrackingRecord::from_mock(bus_id, &mock.bus_name, &mock.path, now),
                        FetchOutcome::Mock,
                    ),
                    None => (
                        TrackingRecord::unavailable(bus_id, summary.as_ref(), now),
                        FetchOutcome::Unavailable,
                    ),
                }
            }
        };

        // Only the latest dispatched fetch clears the busy flag and stores.
        if self
            .in_flight
            .remove_if(&bus_id, |_, latest| *latest == seq)
            .is_none()
        {
            tracing::debug!(bus_id, seq, "Superseded fetch completed, discarding");
            return FetchOutcome::Discarded;
        }
        if mount.is_some_and(|m| !m.is_mounted()) {
            tracing::debug!(bus_id, "View unmounted, discarding fetch");
            return FetchOutcome::Discarded;
        }

        self.records.insert(bus_id, record);
        outcome
    }

    /// Buses the periodic poll should refresh: active and error-free.
    pub fn poll_targets(&self) -> Vec<BusId> {
        let mut ids: Vec<BusId> = self
            .records
            .iter()
            .filter(|entry| entry.value().is_pollable())
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// One poll round: a non-forced fetch per poll target, concurrently.
    pub async fn poll_once(&self) -> Vec<(BusId, FetchOutcome)> {
        self.poll_round(None).await
    }

    /// Poll round on behalf of a view.
    pub async fn poll_once_for(&self, mount: &ViewMount) -> Vec<(BusId, FetchOutcome)> {
        self.poll_round(Some(mount)).await
    }

    async fn poll_round(&self, mount: Option<&ViewMount>) -> Vec<(BusId, FetchOutcome)> {
        let mut outcomes: Vec<(BusId, FetchOutcome)> = stream::iter(self.poll_targets())
            .map(|id| async move { (id, self.fetch(id, false, mount).await) })
            .buffer_unordered(MAX_CONCURRENT_POLLS)
            .collect()
            .await;
        outcomes.sort_unstable_by_key(|(id, _)| *id);
        outcomes
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn record(&self, bus_id: BusId) -> Option<TrackingRecord> {
        self.records.get(&bus_id).map(|r| r.value().clone())
    }

    /// All records, ordered by bus id.
    pub fn records(&self) -> Vec<TrackingRecord> {
        let mut all: Vec<TrackingRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|r| r.id);
        all
    }

    pub fn buses(&self) -> Vec<BusSummary> {
        read(&self.buses).clone()
    }

    pub fn summary(&self, bus_id: BusId) -> Option<BusSummary> {
        read(&self.buses).iter().find(|b| b.id == bus_id).cloned()
    }

    pub fn stops(&self) -> Vec<Stop> {
        read(&self.stops).clone()
    }

    pub fn is_loading(&self, bus_id: BusId) -> bool {
        self.in_flight.contains_key(&bus_id)
    }

    /// Banner text from the last failed bus list load.
    pub fn api_error(&self) -> Option<String> {
        read(&self.api_error).clone()
    }

    pub fn dismiss_error(&self) {
        *write(&self.api_error) = None;
    }

    /// True until the first bus list load finished (either way).
    pub fn initial_loading(&self) -> bool {
        self.initial_loading.load(Ordering::Acquire)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
