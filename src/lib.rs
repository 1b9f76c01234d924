//! # Fishing Oracle Core Library
//!
//! This library turns an hourly forecast of wind, waves and tide for one stretch of
//! coast into per-hour fishing-condition labels: wind sector, water clarity, sea
//! state, tide trend, fishing rating and beach exposure.
//!
//! ## Design Philosophy
//!
//! ### Pure Classification Core
//! - **No I/O**: [`classify`], [`conditions`] and [`tide_trend`] never touch the
//!   network, the file system or the terminal
//! - **Total functions**: every input degrades to an explicit `Variable` or `Unknown`
//!   label instead of an error, so a partial forecast still yields a usable table
//! - **Value ownership**: the caller builds a [`DailySeries`], the classifier returns
//!   a fresh `Vec` and keeps nothing between calls
//!
//! ### Data Flow
//! 1. **Fetch**: [`marine_data`] pulls wind and waves for the chosen zone and the tide
//!    curve for the shared coastal reference point from Open-Meteo
//! 2. **Normalize**: provider nulls become `0.0` (waves, direction) or missing hours;
//!    a day without tide stays tide-less rather than zero-filled
//! 3. **Classify**: [`classify::Classifier`] labels each requested hour
//! 4. **Render**: [`renderer`] draws a table or emits JSON
//!
//! ## Core Types
//!
//! - [`HourlySample`]: one hour of conditions at a location
//! - [`DailySeries`]: up to 24 samples for one location and date, ordered by hour

use serde::{Deserialize, Serialize};

// Module declarations
pub mod classify;
pub mod conditions;
pub mod config;
pub mod marine_data;
pub mod renderer;
pub mod tide_trend;


/// Last valid hour of a day.
pub const LAST_HOUR: u8 = 23;

/// One hour of observed or forecast conditions at a location.
///
/// Units follow the provider:
/// - `wind_speed` in km/h
/// - `wind_direction` in degrees clockwise from north
/// - `wave_height` and `tide_height` in meters
///
/// `tide_height` is `None` when the provider had no tide value for this hour.
///
/// # Example
/// ```
/// use fishing_oracle_lib::HourlySample;
///
/// let sample = HourlySample {
///     hour: 7,
///     wind_speed: 12.0,
///     wind_direction: 270.0,
///     wave_height: 0.3,
///     tide_height: Some(0.45),
/// };
/// assert_eq!(sample.hour, 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    /// Hour of the day (0-23)
    pub hour: u8,
    /// Wind speed in km/h
    pub wind_speed: f32,
    /// Wind direction in degrees
    pub wind_direction: f32,
    /// Significant wave height in meters
    pub wave_height: f32,
    /// Tide height in meters relative to the reference datum
    pub tide_height: Option<f32>,
}

/// Number of hourly slots in a day.
pub const HOURS_PER_DAY: usize = LAST_HOUR as usize + 1;

/// Tide height per hour of the day, indexed by hour.
pub type TideCurve = [Option<f32>; HOURS_PER_DAY];

/// Hourly samples for one location and calendar date.
///
/// Samples are kept sorted by hour with at most one sample per hour. Gaps are
/// allowed: a provider that only returned hours 0 through 18 yields a series of
/// 19 samples.
///
/// The tide curve is stored separately from the samples. Tide comes from a
/// different request than wind and waves, so it can cover hours that have no
/// sample, and the trend at the last sampled hour still sees the next tide value.
///
/// # Example
/// ```
/// use fishing_oracle_lib::{DailySeries, HourlySample};
///
/// let sample = |hour| HourlySample {
///     hour,
///     wind_speed: 10.0,
///     wind_direction: 90.0,
///     wave_height: 0.2,
///     tide_height: None,
/// };
///
/// let series = DailySeries::new(vec![sample(9), sample(8), sample(8)]);
///
/// assert_eq!(series.hours().collect::<Vec<_>>(), vec![8, 9]);
/// assert!(!series.has_tide());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SeriesRecord", into = "SeriesRecord")]
pub struct DailySeries {
    samples: Vec<HourlySample>,
    tides: TideCurve,
}

/// On-disk shape of a [`DailySeries`]. Decoding goes through
/// [`DailySeries::new`] so cached files get the same ordering guarantees.
#[derive(Serialize, Deserialize)]
struct SeriesRecord {
    samples: Vec<HourlySample>,
    #[serde(default)]
    tides: TideCurve,
}

impl From<SeriesRecord> for DailySeries {
    fn from(record: SeriesRecord) -> Self {
        let series = DailySeries::new(record.samples);
        let mut curve = series.tides;
        for (slot, stored) in curve.iter_mut().zip(record.tides) {
            if stored.is_some() {
                *slot = stored;
            }
        }
        series.with_tide_curve(curve)
    }
}

impl From<DailySeries> for SeriesRecord {
    fn from(series: DailySeries) -> Self {
        Self {
            samples: series.samples,
            tides: series.tides,
        }
    }
}

impl DailySeries {
    /// Build a series, sorting by hour.
    ///
    /// Samples with `hour > 23` are dropped. When an hour appears more than once
    /// the first occurrence wins. The tide curve is taken from the samples.
    pub fn new(samples: Vec<HourlySample>) -> Self {
        let mut samples: Vec<HourlySample> =
            samples.into_iter().filter(|s| s.hour <= LAST_HOUR).collect();

        // Stable sort keeps the first occurrence ahead of later duplicates
        samples.sort_by_key(|s| s.hour);
        samples.dedup_by_key(|s| s.hour);

        let mut tides = [None; HOURS_PER_DAY];
        for sample in &samples {
            tides[sample.hour as usize] = sample.tide_height;
        }

        Self { samples, tides }
    }

    /// Replace the tide curve, including hours that have no sample.
    ///
    /// Each sample's `tide_height` is updated to match the curve.
    pub fn with_tide_curve(mut self, curve: TideCurve) -> Self {
        for sample in &mut self.samples {
            sample.tide_height = curve[sample.hour as usize];
        }
        self.tides = curve;
        self
    }

    /// Sample for `hour`, if the provider supplied one.
    pub fn get(&self, hour: u8) -> Option<&HourlySample> {
        self.samples
            .binary_search_by_key(&hour, |s| s.hour)
            .ok()
            .map(|idx| &self.samples[idx])
    }

    /// Tide height at `hour`, whether or not wind and waves exist for that hour.
    pub fn tide_at(&self, hour: u8) -> Option<f32> {
        self.tides.get(hour as usize).copied().flatten()
    }

    pub fn tide_curve(&self) -> &TideCurve {
        &self.tides
    }

    /// Hours present in the series, in chronological order.
    pub fn hours(&self) -> impl Iterator<Item = u8> + '_ {
        self.samples.iter().map(|s| s.hour)
    }

    pub fn samples(&self) -> &[HourlySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True if any hour of the day has a tide height.
    pub fn has_tide(&self) -> bool {
        self.tides.iter().any(Option::is_some)
    }

    /// Copy of this series with every tide value cleared.
    pub fn without_tide(&self) -> Self {
        self.clone().with_tide_curve([None; HOURS_PER_DAY])
    }
}
