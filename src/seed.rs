//! Seed defaults used when no usable snapshot exists.
//!
//! The seed is configuration, not a computed result: [`Seed::demo`] is the
//! built-in demo data set, and [`Seed::from_path`] lets a deployment supply
//! its own as a JSON state document.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::SeedError;
use crate::model::{
    AgeSteps, AppState, DataBundle, EarningsSeries, LocationPoint, Preview, UsageShare,
    UserProfile, Verification,
};
use crate::snapshot::validate;

/// Initial state installed on first run or after a rejected snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    state: AppState,
}

impl Seed {
    /// Wrap an arbitrary state as a seed.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Invalid`] if the state has duplicate bundle or
    /// cart ids, or out-of-range prices, ratings, or earnings.
    pub fn new(state: AppState) -> Result<Self, SeedError> {
        validate(&state).map_err(SeedError::Invalid)?;
        Ok(Self { state })
    }

    /// Load a seed from a JSON file laid out like a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Io`] if the file cannot be read,
    /// [`SeedError::Decode`] if it is not a valid state document, or
    /// [`SeedError::Invalid`] if it violates a catalog invariant.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let bytes = std::fs::read(path.as_ref())?;
        let state: AppState = serde_json::from_slice(&bytes)?;
        Self::new(state)
    }

    /// The built-in demo data: one verified user, three bundles, an empty
    /// cart, and a fixed earnings history.
    pub fn demo() -> Self {
        Self {
            state: AppState {
                user: Some(demo_user()),
                bundles: demo_bundles(),
                cart: Vec::new(),
                earnings: demo_earnings(),
            },
        }
    }

    /// Borrow the seeded state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Consume the seed, yielding its state.
    pub fn into_state(self) -> AppState {
        self.state
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::demo()
    }
}

/// A UTC listing time. Out-of-range components fall back to the epoch,
/// which `demo_timestamps_are_exact` guards against.
fn at(date: (i32, u32, u32), time: (u32, u32, u32)) -> DateTime<Utc> {
    let (year, month, day) = date;
    let (hour, min, sec) = time;
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_default()
}

fn demo_user() -> UserProfile {
    UserProfile {
        id: "1".into(),
        email: "demo@datacoop.com".into(),
        name: "Demo User".into(),
        avatar: Some(
            "https://images.pexels.com/photos/2379004/pexels-photo-2379004.jpeg?auto=compress&cs=tinysrgb&w=150"
                .into(),
        ),
        earnings: 2847.50,
        bundles: 12,
        verification: Verification::Verified,
    }
}

fn demo_bundles() -> Vec<DataBundle> {
    vec![
        DataBundle {
            id: "1".into(),
            title: "Urban Mobility Patterns - San Francisco".into(),
            description:
                "Anonymized location data showing movement patterns in downtown SF during peak hours"
                    .into(),
            price: 89.99,
            category: "Location".into(),
            tags: vec!["mobility".into(), "urban".into(), "transportation".into()],
            samples: 15_000,
            seller: "MobilityResearch".into(),
            rating: 4.8,
            preview: Preview::Location(vec![
                LocationPoint { lat: 37.7749, lng: -122.4194, count: 245 },
                LocationPoint { lat: 37.7849, lng: -122.4094, count: 189 },
                LocationPoint { lat: 37.7649, lng: -122.4294, count: 156 },
            ]),
            created: at((2024, 1, 15), (10, 30, 0)),
        },
        DataBundle {
            id: "2".into(),
            title: "Shopping Behavior Analytics Q4 2024".into(),
            description: "Consumer spending patterns and preferences during holiday season".into(),
            price: 134.99,
            category: "Behavior".into(),
            tags: vec!["shopping".into(), "consumer".into(), "retail".into()],
            samples: 8_500,
            seller: "RetailInsights".into(),
            rating: 4.9,
            preview: Preview::Usage(vec![
                UsageShare { category: "Electronics".into(), value: 34.2 },
                UsageShare { category: "Clothing".into(), value: 28.7 },
                UsageShare { category: "Home".into(), value: 22.1 },
            ]),
            created: at((2024, 1, 12), (14, 20, 0)),
        },
        DataBundle {
            id: "3".into(),
            title: "Health & Fitness Tracking Insights".into(),
            description: "Aggregated wellness data from fitness trackers with privacy protection"
                .into(),
            price: 67.50,
            category: "Health".into(),
            tags: vec!["fitness".into(), "health".into(), "wellness".into()],
            samples: 12_000,
            seller: "WellnessData".into(),
            rating: 4.6,
            preview: Preview::Demographic(vec![
                AgeSteps { age: "18-25".into(), steps: 8_500 },
                AgeSteps { age: "26-35".into(), steps: 7_200 },
                AgeSteps { age: "36-45".into(), steps: 6_800 },
            ]),
            created: at((2024, 1, 10), (9, 15, 0)),
        },
    ]
}

fn demo_earnings() -> EarningsSeries {
    EarningsSeries {
        daily: vec![45.0, 52.0, 38.0, 61.0, 47.0, 59.0, 43.0],
        weekly: vec![320.0, 285.0, 410.0, 365.0, 295.0, 380.0, 425.0],
        monthly: vec![
            1200.0, 1450.0, 1680.0, 1520.0, 1380.0, 1790.0, 1650.0, 1420.0, 1580.0, 1720.0,
            1890.0, 2100.0,
        ],
    }
}
