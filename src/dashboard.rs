// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live tracking dashboard view-model.
//!
//! Owns what the tracking screen needs beyond the reconciler: which bus is
//! selected, where the map viewport is, whether it may auto-center, and the
//! nearest-stop ETA and street address for the selected bus. Rendering
//! reads [`DashboardView`] snapshots.

use crate::bus_colors::assign_colors;
use crate::eta::{distance_km, estimate_eta_in, SpeedUnit};
use crate::models::{BusId, BusSummary, Stop, TrackingRecord, FALLBACK_LAT, FALLBACK_LONG};
use crate::services::poller::TrackingPoller;
use crate::services::geocoding::{AddressResolver, NoGeocoder, ReverseGeocoder};
use crate::services::tracking::{BusTracker, FetchOutcome, ViewMount};
use crate::time_utils::updated_label;
use serde::Serialize;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Latitude/longitude span used when centering on a bus.
pub const ZOOM_DELTA: f64 = 0.005;

/// Visible map region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub fn centered(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta: ZOOM_DELTA,
            longitude_delta: ZOOM_DELTA,
        }
    }
}

impl Default for MapRegion {
    fn default() -> Self {
        Self::centered(FALLBACK_LAT, FALLBACK_LONG)
    }
}

/// Closest stop to a position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct NearestStop {
    pub stop: Stop,
    pub distance_km: f64,
}

/// Linear scan for the stop closest to `(lat, long)`.
pub fn nearest_stop(lat: f64, long: f64, stops: &[Stop]) -> Option<NearestStop> {
    stops
        .iter()
        .map(|stop| (stop, distance_km(lat, long, stop.lat, stop.long)))
        .fold(None, |best: Option<(&Stop, f64)>, (stop, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((stop, d)),
        })
        .map(|(stop, d)| NearestStop {
            stop: stop.clone(),
            distance_km: d,
        })
}

/// Nearest stop and ETA for a bus; `"N/A"` when the bus is inactive or
/// there are no stops.
pub fn arrival_estimate(
    record: Option<&TrackingRecord>,
    stops: &[Stop],
    unit: SpeedUnit,
) -> (Option<NearestStop>, String) {
    let record = match record {
        Some(r) if r.is_active => r,
        _ => return (None, "N/A".to_string()),
    };

    let pos = record.current_position;
    match nearest_stop(pos.lat, pos.long, stops) {
        Some(nearest) => {
            let eta = estimate_eta_in(nearest.distance_km, Some(pos.speed), unit);
            (Some(nearest), eta)
        }
        None => (None, "N/A".to_string()),
    }
}

/// One row of the bus picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct BusEntry {
    pub bus: BusSummary,
    pub color: String,
    pub selected: bool,
    pub loading: bool,
    /// Shown as the "(!)" indicator with a retry action
    pub has_error: bool,
    pub from_mock: bool,
}

/// Snapshot of everything the tracking screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct DashboardView {
    pub initial_loading: bool,
    pub buses: Vec<BusEntry>,
    pub selected: Option<TrackingRecord>,
    pub nearest_stop: Option<NearestStop>,
    pub eta: String,
    pub updated: Option<String>,
    /// Street address of the selected bus, or its coordinates
    pub address: Option<String>,
    /// Dismissible status banner
    pub banner: Option<String>,
    pub viewport: MapRegion,
    pub auto_center: bool,
}

/// Tracking screen state. Lives as long as the screen.
pub struct Dashboard<G: ReverseGeocoder = NoGeocoder> {
    tracker: BusTracker,
    speed_unit: SpeedUnit,
    poll_interval: Duration,
    poller: Option<TrackingPoller>,
    mount: ViewMount,
    address_resolver: AddressResolver<G>,

    selected: Option<BusId>,
    user_selected: bool,
    auto_center: bool,
    viewport: MapRegion,
    /// Position the viewport was last auto-centered on
    last_centered: Option<(f64, f64)>,
    /// Address text and the bus position it was resolved for
    address: Option<(BusId, (f64, f64), String)>,
}

impl Dashboard<NoGeocoder> {
    pub fn new(tracker: BusTracker, speed_unit: SpeedUnit, poll_interval: Duration) -> Self {
        Self::with_geocoder(tracker, speed_unit, poll_interval, NoGeocoder)
    }
}

impl<G: ReverseGeocoder> Dashboard<G> {
    pub fn with_geocoder(
        tracker: BusTracker,
        speed_unit: SpeedUnit,
        poll_interval: Duration,
        geocoder: G,
    ) -> Self {
        Self {
            tracker,
            speed_unit,
            poll_interval,
            poller: None,
            mount: ViewMount::new(),
            address_resolver: AddressResolver::new(geocoder),
            selected: None,
            user_selected: false,
            auto_center: true,
            viewport: MapRegion::default(),
            last_centered: None,
            address: None,
        }
    }

    /// Fresh mount token if this view was unmounted before.
    fn remount(&mut self) {
        if !self.mount.is_mounted() {
            self.mount = ViewMount::new();
        }
    }

    async fn fetch(&self, bus_id: BusId, force: bool) -> FetchOutcome {
        self.tracker
            .fetch_bus_data_for(bus_id, force, &self.mount)
            .await
    }

    /// Initial load: bus list and stops, then the selected bus.
    pub async fn load(&mut self) {
        self.remount();
        let (buses, _stops) = tokio::join!(self.tracker.fetch_bus_list(), self.tracker.fetch_stops());
        self.ensure_selection(&buses);

        if let Some(id) = self.selected {
            // Forced: a poll left over from an earlier view may be in flight.
            if self.tracker.record(id).is_none() {
                self.fetch(id, true).await;
            }
        }
        self.sync_viewport();
    }

    /// Keep the selection inside the bus list, auto-selecting the first
    /// active bus (else the first bus) when needed. A new pick also resumes
    /// auto-centering.
    fn ensure_selection(&mut self, buses: &[BusSummary]) {
        if let Some(id) = self.selected {
            if buses.iter().any(|b| b.id == id) {
                return;
            }
            tracing::info!(bus_id = id, "Selected bus left the bus list");
            self.user_selected = false;
        }

        self.selected = buses
            .iter()
            .find(|b| b.is_active)
            .or_else(|| buses.first())
            .map(|b| b.id);
        self.auto_center = true;
        self.last_centered = None;

        if let Some(id) = self.selected {
            tracing::debug!(bus_id = id, "Auto-selected bus");
        }
    }

    /// User picked a bus. Re-enables auto-centering and loads the bus if it
    /// has no record or an error record. Unknown ids are ignored.
    pub async fn select_bus(&mut self, bus_id: BusId) -> bool {
        if self.tracker.summary(bus_id).is_none() {
            tracing::warn!(bus_id, "Ignoring selection of unknown bus");
            return false;
        }

        self.selected = Some(bus_id);
        self.user_selected = true;
        self.auto_center = true;
        self.last_centered = None;

        let needs_fetch = self
            .tracker
            .record(bus_id)
            .map_or(true, |record| record.error);
        if needs_fetch {
            self.fetch(bus_id, false).await;
        }
        self.sync_viewport();
        true
    }

    /// Manual pan/zoom: suspends auto-centering until re-selection or
    /// [`recenter`](Self::recenter).
    pub fn on_user_pan(&mut self, region: MapRegion) {
        self.auto_center = false;
        self.viewport = region;
    }

    /// Explicit "center on bus". Returns the region to animate to, if any.
    pub fn recenter(&mut self) -> Option<MapRegion> {
        self.auto_center = true;
        self.last_centered = None;
        self.sync_viewport()
    }

    /// Follow the selected bus if auto-centering is on and its position
    /// changed since the last centering. Returns the region to animate to.
    pub fn sync_viewport(&mut self) -> Option<MapRegion> {
        if !self.auto_center {
            return None;
        }
        let record = self.tracker.record(self.selected?)?;
        if !record.is_active {
            return None;
        }

        let pos = (record.current_position.lat, record.current_position.long);
        if self.last_centered == Some(pos) {
            return None;
        }
        self.viewport = MapRegion::centered(pos.0, pos.1);
        self.last_centered = Some(pos);
        Some(self.viewport)
    }

    /// Reload bus list and stops and force-refresh the selected bus.
    pub async fn refresh(&mut self) {
        self.tracker.dismiss_error();
        let (buses, _stops) = tokio::join!(self.tracker.fetch_bus_list(), self.tracker.fetch_stops());
        self.ensure_selection(&buses);

        if let Some(id) = self.selected {
            self.fetch(id, true).await;
        }
        self.sync_viewport();
    }

    /// Per-bus retry after an error.
    pub async fn retry(&mut self, bus_id: BusId) -> FetchOutcome {
        let outcome = self.fetch(bus_id, true).await;
        self.sync_viewport();
        outcome
    }

    pub fn dismiss_banner(&self) {
        self.tracker.dismiss_error();
    }

    // ─── Lifetime ────────────────────────────────────────────────────────────

    /// Start periodic refresh; no-op if already running.
    pub fn start_polling(&mut self) {
        self.remount();
        if self.poller.is_none() {
            self.poller = Some(TrackingPoller::start_for(
                self.tracker.clone(),
                self.poll_interval,
                self.mount.clone(),
            ));
        }
    }

    pub fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(TrackingPoller::is_running)
    }

    /// Screen went away: stop polling and ignore this view's late fetch
    /// and address results. Other views on the same tracker carry on.
    pub fn unmount(&mut self) {
        self.stop_polling();
        self.mount.release();
        self.address_resolver.cancel();
    }

    // ─── Address ─────────────────────────────────────────────────────────────

    /// Resolve the selected bus's street address. Only looks up again when
    /// the position changed.
    pub async fn resolve_address(&mut self) -> Option<String> {
        let Some(record) = self.selected.and_then(|id| self.tracker.record(id)) else {
            self.address = None;
            return None;
        };
        if !record.is_active {
            self.address = None;
            return None;
        }

        let pos = (record.current_position.lat, record.current_position.long);
        let text = self
            .address_resolver
            .display_text(Some(pos.0), Some(pos.1))
            .await;
        self.address = Some((record.id, pos, text.clone()));
        Some(text)
    }

    /// Address for the current selection, if it was resolved at the
    /// selected bus's current position.
    fn current_address(&self, selected: Option<&TrackingRecord>) -> Option<String> {
        let record = selected.filter(|r| r.is_active)?;
        let pos = (record.current_position.lat, record.current_position.long);
        match &self.address {
            Some((id, at, text)) if *id == record.id && *at == pos => Some(text.clone()),
            _ => None,
        }
    }

    // ─── Snapshot ────────────────────────────────────────────────────────────

    /// Resolve the address, then take a [`view`](Self::view).
    pub async fn snapshot(&mut self) -> DashboardView {
        self.resolve_address().await;
        self.view()
    }

    /// Current view, after following the selected bus if allowed. The
    /// address is only filled in once resolved for the current position.
    pub fn view(&mut self) -> DashboardView {
        self.sync_viewport();

        let buses = self.tracker.buses();
        let colors = assign_colors(&buses);
        let entries = buses
            .into_iter()
            .map(|bus| {
                let record = self.tracker.record(bus.id);
                BusEntry {
                    color: colors.get(&bus.id).copied().unwrap_or_default().to_string(),
                    selected: self.selected == Some(bus.id),
                    loading: self.tracker.is_loading(bus.id),
                    has_error: record.as_ref().is_some_and(|r| r.error),
                    from_mock: record.as_ref().is_some_and(|r| !r.from_api && !r.error),
                    bus,
                }
            })
            .collect();

        let selected = self.selected.and_then(|id| self.tracker.record(id));
        let (nearest_stop, eta) =
            arrival_estimate(selected.as_ref(), &self.tracker.stops(), self.speed_unit);
        let updated = selected.as_ref().map(|r| updated_label(&r.last_updated));
        let address = self.current_address(selected.as_ref());

        DashboardView {
            initial_loading: self.tracker.initial_loading(),
            buses: entries,
            selected,
            nearest_stop,
            eta,
            updated,
            address,
            banner: self.tracker.api_error(),
            viewport: self.viewport,
            auto_center: self.auto_center,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn selected(&self) -> Option<BusId> {
        self.selected
    }

    pub fn user_selected(&self) -> bool {
        self.user_selected
    }

    pub fn auto_center(&self) -> bool {
        self.auto_center
    }

    pub fn viewport(&self) -> MapRegion {
        self.viewport
    }

    pub fn tracker(&self) -> &BusTracker {
        &self.tracker
    }

    pub fn address_resolver(&self) -> &AddressResolver<G> {
        &self.address_resolver
    }
}

impl<G: ReverseGeocoder> Drop for Dashboard<G> {
    fn drop(&mut self) {
        self.unmount();
    }
}
