//! # Series Classification
//!
//! Composes the per-hour rules from [`crate::conditions`] with tide trend
//! detection from [`crate::tide_trend`] to label every requested hour of a
//! [`DailySeries`].
//!
//! ## Degradation
//!
//! Nothing in here fails on partial data:
//! - A requested hour with no sample is skipped, never synthesized
//! - A day without tide yields `Unknown` tide trend, rating and exposure while
//!   wind and wave labels are still computed
//! - Odd directions or heights fall through to the `Variable` or default branch
//!
//! The only error is an invalid [`HourRange`], which is a caller mistake rather
//! than a data problem.

use crate::conditions::{rate, ConditionLabel, Thresholds};
use crate::tide_trend::classify_tide_trend;
use crate::{DailySeries, LAST_HOUR};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Rejected hour range.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourRangeError {
    #[error("hour {0} is past the end of the day (max 23)")]
    HourOutOfDay(u8),

    #[error("range start {start} is after end {end}")]
    Inverted { start: u8, end: u8 },
}

/// Closed interval of hours `[start, end]` within one day.
///
/// Decoding runs the same checks as [`HourRange::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHourRange")]
pub struct HourRange {
    start: u8,
    end: u8,
}

#[derive(Deserialize)]
struct RawHourRange {
    start: u8,
    end: u8,
}

impl TryFrom<RawHourRange> for HourRange {
    type Error = HourRangeError;

    fn try_from(raw: RawHourRange) -> Result<Self, Self::Error> {
        HourRange::new(raw.start, raw.end)
    }
}

impl HourRange {
    pub fn new(start: u8, end: u8) -> Result<Self, HourRangeError> {
        if start > LAST_HOUR {
            return Err(HourRangeError::HourOutOfDay(start));
        }
        if end > LAST_HOUR {
            return Err(HourRangeError::HourOutOfDay(end));
        }
        if start > end {
            return Err(HourRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Every hour of the day.
    pub fn full_day() -> Self {
        Self {
            start: 0,
            end: LAST_HOUR,
        }
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn hours(&self) -> impl Iterator<Item = u8> {
        self.start..=self.end
    }
}

impl Default for HourRange {
    fn default() -> Self {
        Self::full_day()
    }
}

/// Label for one hour of the output sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyConditions {
    pub hour: u8,
    pub label: ConditionLabel,
}

/// Stateless rule engine holding one site calibration.
///
/// Safe to share across threads; every call works on its own input and
/// returns its own output.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Classifier {
    thresholds: Thresholds,
}

impl Classifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Label a single hour, or `None` if the series has no sample for it.
    pub fn classify_hour(&self, series: &DailySeries, hour: u8) -> Option<ConditionLabel> {
        let sample = series.get(hour)?;
        let t = &self.thresholds;

        let wind_sector = t.wind_sector(sample.wind_direction);
        let tide_trend = classify_tide_trend(series, hour);

        Some(ConditionLabel {
            wind_sector,
            water_clarity: t.clarity(sample.wave_height, wind_sector),
            sea_state: t.sea_state(sample.wave_height),
            tide_trend,
            fishing_rating: rate(tide_trend),
            beach_exposure: t.exposure(series.tide_at(hour)),
        })
    }

    /// Label every hour of `range` present in `series`, in chronological order.
    ///
    /// # Example
    /// ```
    /// use fishing_oracle_lib::classify::{Classifier, HourRange};
    /// use fishing_oracle_lib::conditions::{FishingRating, WindSector};
    /// use fishing_oracle_lib::{DailySeries, HourlySample};
    ///
    /// let series = DailySeries::new(
    ///     (0..24)
    ///         .map(|hour| HourlySample {
    ///             hour,
    ///             wind_speed: 14.0,
    ///             wind_direction: 270.0,
    ///             wave_height: 0.5,
    ///             tide_height: Some(0.5),
    ///         })
    ///         .collect(),
    /// );
    ///
    /// let range = HourRange::new(6, 12).unwrap();
    /// let rows = Classifier::default().classify_series(&series, range);
    ///
    /// assert_eq!(rows.len(), 7);
    /// assert_eq!(rows[0].hour, 6);
    /// assert_eq!(rows[0].label.wind_sector, WindSector::Poniente);
    /// assert_eq!(rows[0].label.fishing_rating, FishingRating::Fair);
    /// ```
    pub fn classify_series(&self, series: &DailySeries, range: HourRange) -> Vec<HourlyConditions> {
        if !series.has_tide() {
            debug!("no tide data for this day, tide-derived labels will be unknown");
        }

        range
            .hours()
            .filter_map(|hour| match self.classify_hour(series, hour) {
                Some(label) => Some(HourlyConditions { hour, label }),
                None => {
                    debug!(hour, "no sample for requested hour, skipping");
                    None
                }
            })
            .collect()
    }
}

/// [`Classifier::classify_series`] with the default calibration.
pub fn classify_series(series: &DailySeries, range: HourRange) -> Vec<HourlyConditions> {
    Classifier::default().classify_series(series, range)
}
