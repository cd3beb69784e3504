//! Per-bus map colors.

use crate::models::{BusId, BusSummary};
use std::collections::HashMap;

/// Marker and polyline palette, cycled in bus list order.
pub const PALETTE: [&str; 10] = [
    "#22c55e", "#3b82f6", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#10b981", "#f97316",
    "#6366f1", "#eab308",
];

pub fn color_for_index(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Assign a color to every bus by its position in `buses`.
pub fn assign_colors(buses: &[BusSummary]) -> HashMap<BusId, &'static str> {
    buses
        .iter()
        .enumerate()
        .map(|(i, bus)| (bus.id, color_for_index(i)))
        .collect()
}
