//! Portfolio history series for the chart view.
//!
//! There is no historical balance source yet; [`RandomWalkSeries`] produces a
//! plausible placeholder series. Callers only see [`SeriesSource`], so a real
//! history provider can replace it without touching them.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::{Network, NetworkFilter};

/// Values never drop below this, however bad the random draws are.
pub const SERIES_FLOOR: f64 = 100.0;

const STEP_SCALE: f64 = 500.0;
/// Slight upward drift: draws are centred on 0.45, not 0.5.
const STEP_BIAS: f64 = 0.45;

/// Chart window selectable in the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1S")]
    OneWeek,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1A")]
    OneYear,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::OneYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "1S",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::OneYear => "1A",
        }
    }

    /// Hourly points for a day, monthly points for a year, daily otherwise.
    pub fn point_count(&self) -> usize {
        match self {
            TimeRange::OneDay => 24,
            TimeRange::OneYear => 12,
            _ => 30,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        TimeRange::ALL
            .into_iter()
            .find(|range| range.as_str() == wanted)
            .ok_or_else(|| format!("unknown time range: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
}

/// Anything that can produce the history series for a network selection.
pub trait SeriesSource: Send + Sync {
    fn series(&self, filter: NetworkFilter, range: TimeRange) -> Vec<ChartDataPoint>;
}

/// Starting value of the synthetic walk per network selection.
pub fn base_value(filter: NetworkFilter) -> f64 {
    match filter {
        NetworkFilter::All => 10_000.0,
        NetworkFilter::Only(Network::Eth) => 5_000.0,
        NetworkFilter::Only(Network::Bsc) => 3_000.0,
        NetworkFilter::Only(Network::Solana) => 4_000.0,
        NetworkFilter::Only(Network::Cardano) => 1_500.0,
    }
}

/// Bounded random walk starting from `start`, one point per step.
pub fn random_walk<R: Rng + ?Sized>(rng: &mut R, start: f64, points: usize) -> Vec<ChartDataPoint> {
    let mut value = start;
    (0..points)
        .map(|i| {
            value += (rng.gen::<f64>() - STEP_BIAS) * STEP_SCALE;
            if value < SERIES_FLOOR {
                value = SERIES_FLOOR;
            }
            ChartDataPoint {
                label: format!("P{i}"),
                value: value.floor(),
            }
        })
        .collect()
}

/// Placeholder history generator.
#[derive(Debug, Clone, Default)]
pub struct RandomWalkSeries {
    seed: Option<u64>,
}

impl RandomWalkSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same selection always yields the same series.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl SeriesSource for RandomWalkSeries {
    fn series(&self, filter: NetworkFilter, range: TimeRange) -> Vec<ChartDataPoint> {
        let start = base_value(filter);
        let points = range.point_count();
        match self.seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                seed.hash(&mut hasher);
                filter.hash(&mut hasher);
                range.hash(&mut hasher);
                let mut rng = StdRng::seed_from_u64(hasher.finish());
                random_walk(&mut rng, start, points)
            }
            None => random_walk(&mut rand::thread_rng(), start, points),
        }
    }
}
