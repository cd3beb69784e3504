//! Static fallback dataset, used when the backend is unreachable.

use crate::models::{BusId, BusSummary, PositionSample, Stop};

/// A mock bus with a fixed route.
#[derive(Debug, Clone)]
pub struct MockBus {
    pub id: BusId,
    pub bus_name: String,
    pub path: Vec<PositionSample>,
}

/// Buses and stops served in place of live data.
#[derive(Debug, Clone, Default)]
pub struct MockDataset {
    pub buses: Vec<MockBus>,
    pub stops: Vec<Stop>,
}

impl MockDataset {
    /// Built-in dataset around the reference coordinate.
    pub fn builtin() -> Self {
        let p = PositionSample::new;
        let buses = vec![
            MockBus {
                id: 1,
                bus_name: "Bus 1 - Capitol Loop".to_string(),
                path: vec![
                    p(14.683015, 120.538018, 0.0, 8),
                    p(14.684920, 120.539410, 18.0, 10),
                    p(14.686870, 120.540950, 22.0, 12),
                    p(14.688640, 120.542300, 20.0, 12),
                ],
            },
            MockBus {
                id: 2,
                bus_name: "Bus 2 - Market Line".to_string(),
                path: vec![
                    p(14.676450, 120.535120, 0.0, 4),
                    p(14.678300, 120.536480, 15.0, 6),
                    p(14.680210, 120.537050, 17.5, 9),
                ],
            },
            MockBus {
                id: 3,
                bus_name: "Bus 3 - Terminal Express".to_string(),
                path: vec![
                    p(14.692100, 120.545800, 0.0, 15),
                    p(14.690350, 120.543920, 25.0, 18),
                ],
            },
        ];

        let stops = vec![
            Stop {
                id: 1,
                name: "Capitol Stop".to_string(),
                lat: 14.684400,
                long: 120.539000,
            },
            Stop {
                id: 2,
                name: "Public Market".to_string(),
                lat: 14.679000,
                long: 120.536300,
            },
            Stop {
                id: 3,
                name: "City Terminal".to_string(),
                lat: 14.691500,
                long: 120.545000,
            },
            Stop {
                id: 4,
                name: "Plaza Mayor".to_string(),
                lat: 14.687500,
                long: 120.541700,
            },
        ];

        Self { buses, stops }
    }

    pub fn bus(&self, id: BusId) -> Option<&MockBus> {
        self.buses.iter().find(|b| b.id == id)
    }

    /// Bus list fallback: every mock bus, active, without driver details.
    pub fn summaries(&self) -> Vec<BusSummary> {
        self.buses
            .iter()
            .map(|b| BusSummary {
                id: b.id,
                bus_name: b.bus_name.clone(),
                driver_name: None,
                license_plate: None,
                is_active: true,
            })
            .collect()
    }
}
