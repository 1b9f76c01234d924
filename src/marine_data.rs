//! # Open-Meteo Forecast Fetching and Caching
//!
//! This module handles all network operations for fetching hourly wind, wave and
//! tide forecasts from Open-Meteo, and turns the three responses into one
//! [`DailySeries`] for the classifier.
//!
//! ## Data Sources
//!
//! - **Forecast API**: `wind_speed_10m`, `wind_direction_10m` at the zone
//! - **Marine API**: `wave_height` at the zone
//! - **Marine API**: the configured tide variable (`sea_level_height_msl` unless
//!   `forecast.tide_variable` says otherwise) at the shared tide reference point.
//!   The tide is the same along the whole coast, and a fixed offshore point avoids
//!   the provider returning nothing for coordinates it considers land.
//!
//! ## Normalization Rules
//!
//! - Hours come from the `time` entries, not from array positions
//! - An hour without wind speed is left out of the series, but its tide value is
//!   kept on the tide curve so neighbouring hours still see it
//! - Null wind direction becomes `0.0`, null wave height becomes `0.0`
//! - Tide is optional: a failed tide request or an all-null tide array leaves the
//!   day without tide. It is never replaced by zeros.
//!
//! ## Caching Strategy
//!
//! The normalized series is stored as JSON per zone and date under the configured
//! cache directory. A file younger than `cache_ttl_minutes` (by modification time)
//! is used instead of the network. Cache write failures are non-fatal.

use crate::config::{Config, Coordinates, ForecastConfig, ZoneConfig};
use crate::{DailySeries, HourlySample, HOURS_PER_DAY, LAST_HOUR};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use std::{fs, io};
use thiserror::Error;
use tracing::{debug, info, warn};

const WIND_SPEED: &str = "wind_speed_10m";
const WIND_DIRECTION: &str = "wind_direction_10m";
const WAVE_HEIGHT: &str = "wave_height";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors that can occur while fetching forecast data.
///
/// Only the wind and wave requests can fail a fetch; tide problems degrade to a
/// tide-less day instead.
#[derive(Error, Debug)]
pub enum MarineDataError {
    /// HTTP request failed (network, server, or decoding error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response decoded but carried no hourly block
    #[error("{0} response has no hourly data")]
    MissingHourly(&'static str),
}

/// The parts of an Open-Meteo response this crate reads.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ProviderResponse {
    pub hourly: Option<HourlyBlock>,
}

/// Hourly arrays keyed by variable name; every entry may be null.
///
/// Variable names are whatever was requested, so the tide variable can change
/// through configuration without touching this type.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct HourlyBlock {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(flatten)]
    pub variables: HashMap<String, Vec<Option<f32>>>,
}

type HourSlots = [Option<f32>; HOURS_PER_DAY];

impl HourlyBlock {
    pub fn new(time: Vec<String>) -> Self {
        Self {
            time,
            variables: HashMap::new(),
        }
    }

    /// Add or replace the values of one variable.
    pub fn with_variable(mut self, name: &str, values: Vec<Option<f32>>) -> Self {
        self.variables.insert(name.to_string(), values);
        self
    }

    pub fn variable(&self, name: &str) -> Option<&[Option<f32>]> {
        self.variables.get(name).map(Vec::as_slice)
    }

    /// Values of one variable placed by hour of day.
    ///
    /// Entries whose time does not parse are ignored. If an hour occurs twice
    /// (the autumn clock change) the first value is kept.
    fn by_hour(&self, name: &str) -> HourSlots {
        let mut slots: HourSlots = [None; HOURS_PER_DAY];
        let mut seen = [false; HOURS_PER_DAY];
        let Some(values) = self.variable(name) else {
            return slots;
        };

        for (time, value) in self.time.iter().zip(values) {
            let hour = match NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M") {
                Ok(dt) => dt.hour() as usize,
                Err(_) => {
                    debug!(time = %time, "skipping entry with unparseable time");
                    continue;
                }
            };
            if !seen[hour] {
                seen[hour] = true;
                slots[hour] = *value;
            }
        }
        slots
    }
}

/// Merge the three provider responses into one series.
///
/// `tides` is `None` when the tide request failed or was not made;
/// `tide_variable` names the array to read from it.
pub fn normalize(
    weather: &HourlyBlock,
    waves: &HourlyBlock,
    tides: Option<&HourlyBlock>,
    tide_variable: &str,
) -> DailySeries {
    let wind_speed = weather.by_hour(WIND_SPEED);
    let wind_direction = weather.by_hour(WIND_DIRECTION);
    let wave_height = waves.by_hour(WAVE_HEIGHT);
    let tide_height = tides
        .map(|t| t.by_hour(tide_variable))
        .unwrap_or([None; HOURS_PER_DAY]);

    let samples = (0..=LAST_HOUR)
        .filter_map(|hour| {
            let h = hour as usize;
            let Some(speed) = wind_speed[h] else {
                debug!(hour, "no wind speed, hour left out");
                return None;
            };
            Some(HourlySample {
                hour,
                wind_speed: speed,
                wind_direction: wind_direction[h].unwrap_or(0.0),
                wave_height: wave_height[h].unwrap_or(0.0),
                tide_height: tide_height[h],
            })
        })
        .collect();

    let series = DailySeries::new(samples).with_tide_curve(tide_height);
    if tides.is_some() && !series.has_tide() {
        warn!(
            variable = tide_variable,
            "tide response had no usable values, treating the day as tide-less"
        );
    }
    series
}

/// Client for the Open-Meteo forecast and marine APIs.
#[derive(Debug, Clone)]
pub struct MarineClient {
    client: reqwest::Client,
    forecast: ForecastConfig,
    tide_reference: Coordinates,
}

impl MarineClient {
    pub fn new(config: &Config) -> Result<Self, MarineDataError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            forecast: config.forecast.clone(),
            tide_reference: config.tide_reference,
        }
    }

    /// Fetch the normalized series for `zone` on `date`, from cache when fresh.
    pub async fn fetch_day(&self, zone: &ZoneConfig, date: NaiveDate) -> Result<DailySeries, MarineDataError> {
        let cache = cache_path(&self.forecast.cache_dir, &zone.name, date);
        let ttl = Duration::from_secs(self.forecast.cache_ttl_minutes * 60);

        if let Ok(series) = load_cache(&cache, ttl) {
            debug!(zone = %zone.name, %date, "using cached forecast");
            return Ok(series);
        }

        info!(zone = %zone.name, %date, "fetching forecast from Open-Meteo");
        let at_zone = zone.coordinates();

        let wind_variables = format!("{WIND_SPEED},{WIND_DIRECTION}");
        let tide_variable = self.forecast.tide_variable.as_str();

        let required = async {
            tokio::try_join!(
                self.get_hourly(&self.forecast.weather_url, at_zone, &wind_variables, date, "wind"),
                self.get_hourly(&self.forecast.marine_url, at_zone, WAVE_HEIGHT, date, "wave"),
            )
        };
        let tide = self.get_hourly(
            &self.forecast.marine_url,
            self.tide_reference,
            tide_variable,
            date,
            "tide",
        );
        let (required, tide) = tokio::join!(required, tide);
        let (weather, waves) = required?;

        let tides = match tide {
            Ok(block) => Some(block),
            Err(e) => {
                warn!("tide fetch failed, continuing without tide: {e}");
                None
            }
        };

        let series = normalize(&weather, &waves, tides.as_ref(), tide_variable);

        // Cache write failures are not worth failing the request for
        if let Err(e) = save_cache(&cache, &series) {
            debug!(path = %cache.display(), "could not write cache: {e}");
        }

        Ok(series)
    }

    async fn get_hourly(
        &self,
        url: &str,
        at: Coordinates,
        variables: &str,
        date: NaiveDate,
        what: &'static str,
    ) -> Result<HourlyBlock, MarineDataError> {
        let date = date.format("%Y-%m-%d").to_string();
        let response: ProviderResponse = self
            .client
            .get(url)
            .query(&[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                ("hourly", variables.to_string()),
                ("timezone", self.forecast.timezone.clone()),
                ("start_date", date.clone()),
                ("end_date", date),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.hourly.ok_or(MarineDataError::MissingHourly(what))
    }
}

// -- Cache --

/// Cache file for one zone and date.
pub fn cache_path(dir: &Path, zone_name: &str, date: NaiveDate) -> PathBuf {
    let slug: String = zone_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    dir.join(format!("{slug}_{}.json", date.format("%Y-%m-%d")))
}

/// Load a cached series if the file is younger than `ttl`.
fn load_cache(path: &Path, ttl: Duration) -> Result<DailySeries, io::Error> {
    let meta = fs::metadata(path)?;

    let age = SystemTime::now()
        .duration_since(meta.modified()?)
        .map_err(|_| io::Error::other("time error"))?;

    if age > ttl {
        return Err(io::Error::other("stale"));
    }

    let data = fs::read(path)?;
    let series = serde_json::from_slice(&data)?;

    Ok(series)
}

fn save_cache(path: &Path, series: &DailySeries) -> Result<(), io::Error> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let data = serde_json::to_vec(series)?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TIDE_VARIABLE;

    fn times() -> Vec<String> {
        (0..24).map(|h| format!("2025-07-24T{h:02}:00")).collect()
    }

    fn block(json: &str) -> HourlyBlock {
        let response: ProviderResponse = serde_json::from_str(json).unwrap();
        response.hourly.unwrap()
    }

    fn weather_block() -> HourlyBlock {
        HourlyBlock::new(times())
            .with_variable(WIND_SPEED, (0..24).map(|h| Some(h as f32)).collect())
            .with_variable(WIND_DIRECTION, vec![Some(270.0); 24])
    }

    fn wave_block() -> HourlyBlock {
        HourlyBlock::new(times()).with_variable(WAVE_HEIGHT, vec![Some(0.5); 24])
    }

    fn tide_block(values: Vec<Option<f32>>) -> HourlyBlock {
        HourlyBlock::new(times()).with_variable(DEFAULT_TIDE_VARIABLE, values)
    }

    fn normalize_default(
        weather: &HourlyBlock,
        waves: &HourlyBlock,
        tides: Option<&HourlyBlock>,
    ) -> DailySeries {
        normalize(weather, waves, tides, DEFAULT_TIDE_VARIABLE)
    }

    #[test]
    fn test_parse_open_meteo_response() {
        let parsed = block(
            r#"{
                "latitude": 39.375,
                "longitude": -0.25,
                "generationtime_ms": 0.05,
                "utc_offset_seconds": 7200,
                "timezone": "Europe/Madrid",
                "hourly_units": { "time": "iso8601", "wave_height": "m" },
                "hourly": {
                    "time": ["2025-07-24T00:00", "2025-07-24T01:00"],
                    "wave_height": [0.42, null]
                }
            }"#,
        );
        assert_eq!(parsed.time.len(), 2);
        assert_eq!(parsed.variable(WAVE_HEIGHT), Some(&[Some(0.42), None][..]));
        assert!(parsed.variable(DEFAULT_TIDE_VARIABLE).is_none());
    }

    #[test]
    fn test_normalize_full_day() {
        let tides = tide_block((0..24).map(|h| Some(h as f32 / 100.0)).collect());
        let series = normalize_default(&weather_block(), &wave_block(), Some(&tides));

        assert_eq!(series.len(), 24);
        let noon = series.get(12).unwrap();
        assert_eq!(noon.wind_speed, 12.0);
        assert_eq!(noon.wind_direction, 270.0);
        assert_eq!(noon.wave_height, 0.5);
        assert_eq!(noon.tide_height, Some(0.12));
    }

    #[test]
    fn test_tide_read_from_configured_variable() {
        let response = block(
            r#"{ "hourly": {
                "time": ["2025-07-24T06:00", "2025-07-24T07:00"],
                "tide_height": [0.31, 0.35]
            } }"#,
        );
        let weather = HourlyBlock::new(response.time.clone())
            .with_variable(WIND_SPEED, vec![Some(5.0), Some(6.0)]);

        let series = normalize(&weather, &wave_block(), Some(&response), "tide_height");
        assert_eq!(series.tide_at(7), Some(0.35));

        // Same response read under a name the provider did not return
        let series = normalize_default(&weather, &wave_block(), Some(&response));
        assert!(!series.has_tide());
    }

    #[test]
    fn test_null_wave_and_direction_become_zero() {
        let mut direction = vec![Some(270.0); 24];
        direction[3] = None;
        let mut heights = vec![Some(0.5); 24];
        heights[3] = None;
        let weather = weather_block().with_variable(WIND_DIRECTION, direction);
        let waves = wave_block().with_variable(WAVE_HEIGHT, heights);

        let series = normalize_default(&weather, &waves, None);
        let sample = series.get(3).unwrap();
        assert_eq!(sample.wind_direction, 0.0);
        assert_eq!(sample.wave_height, 0.0);
    }

    #[test]
    fn test_missing_wave_variable_becomes_zero() {
        let waves = HourlyBlock::new(times());
        let series = normalize_default(&weather_block(), &waves, None);
        assert_eq!(series.len(), 24);
        assert!(series.samples().iter().all(|s| s.wave_height == 0.0));
    }

    #[test]
    fn test_null_wind_speed_drops_hour() {
        // Provider data ends after hour 18
        let speeds = (0..24).map(|h| (h <= 18).then_some(h as f32)).collect();
        let weather = weather_block().with_variable(WIND_SPEED, speeds);

        let series = normalize_default(&weather, &wave_block(), None);
        assert_eq!(series.len(), 19);
        assert!(series.get(18).is_some());
        assert!(series.get(19).is_none());
    }

    #[test]
    fn test_tide_kept_for_hours_without_wind() {
        let speeds = (0..24).map(|h| (h <= 18).then_some(10.0)).collect();
        let weather = weather_block().with_variable(WIND_SPEED, speeds);
        let tides = tide_block((0..24).map(|h| Some(h as f32 * 0.05)).collect());

        let series = normalize_default(&weather, &wave_block(), Some(&tides));
        assert_eq!(series.len(), 19);
        assert_eq!(series.tide_at(18), Some(18.0 * 0.05));
        assert_eq!(series.tide_at(19), Some(19.0 * 0.05));
        assert_eq!(series.tide_at(23), Some(23.0 * 0.05));

        // Tide only where wind is missing still counts as a tide day
        let late_tide = tide_block((0..24).map(|h| (h > 18).then_some(0.4)).collect());
        let series = normalize_default(&weather, &wave_block(), Some(&late_tide));
        assert!(series.has_tide());
        assert!(series.samples().iter().all(|s| s.tide_height.is_none()));
    }

    #[test]
    fn test_short_arrays_leave_gaps() {
        let weather = block(
            r#"{ "hourly": {
                "time": ["2025-07-24T06:00", "2025-07-24T07:00", "2025-07-24T08:00"],
                "wind_speed_10m": [5.0, 6.0],
                "wind_direction_10m": [90, 95, 100]
            } }"#,
        );
        let series = normalize_default(&weather, &wave_block(), None);
        assert_eq!(series.hours().collect::<Vec<_>>(), vec![6, 7]);
    }

    #[test]
    fn test_missing_tide_stays_missing() {
        // Tide request failed
        let series = normalize_default(&weather_block(), &wave_block(), None);
        assert!(!series.has_tide());

        // Tide request succeeded but every value is null
        let nulls = tide_block(vec![None; 24]);
        let series = normalize_default(&weather_block(), &wave_block(), Some(&nulls));
        assert!(!series.has_tide());
        assert_eq!(series.len(), 24);
    }

    #[test]
    fn test_unparseable_time_is_skipped() {
        let weather = block(
            r#"{ "hourly": {
                "time": ["yesterday", "2025-07-24T10:00"],
                "wind_speed_10m": [5.0, 6.0],
                "wind_direction_10m": [90, 95]
            } }"#,
        );
        let series = normalize_default(&weather, &wave_block(), None);
        assert_eq!(series.hours().collect::<Vec<_>>(), vec![10]);
        assert_eq!(series.get(10).unwrap().wind_speed, 6.0);
    }

    #[test]
    fn test_cache_path_slug() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 24).unwrap();
        let path = cache_path(Path::new("/tmp/oracle"), "Marina (Malvarrosa)", date);
        assert_eq!(
            path,
            Path::new("/tmp/oracle/marina--malvarrosa-_2025-07-24.json")
        );
    }

    #[test]
    fn test_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 7, 24).unwrap();
        let path = cache_path(&dir.path().join("nested"), "El Saler", date);

        let tides = tide_block((0..24).map(|h| Some(h as f32 / 10.0)).collect());
        let series = normalize_default(&weather_block(), &wave_block(), Some(&tides));
        save_cache(&path, &series).unwrap();

        let loaded = load_cache(&path, Duration::from_secs(60)).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn test_stale_cache_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.json");

        let series = normalize_default(&weather_block(), &wave_block(), None);
        save_cache(&path, &series).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        let err = load_cache(&path, Duration::ZERO).unwrap_err();
        assert_eq!(err.to_string(), "stale");

        // The same file is still served under a generous TTL
        assert!(load_cache(&path, Duration::from_secs(3600)).is_ok());
    }

    #[test]
    fn test_missing_cache_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(load_cache(&path, Duration::from_secs(60)).is_err());
    }
}
