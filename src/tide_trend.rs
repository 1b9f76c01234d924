//! # Tide Trend Detection
//!
//! Looks at the tide height one hour before and one hour after a given hour to
//! decide whether the tide is turning, rising or falling.
//!
//! ## Edge Flattening
//!
//! A neighbour that does not exist (before hour 0, after the last tide hour the
//! provider returned, or an hour without a tide value) is replaced by the
//! current height. A flat neighbour can never produce a strict maximum or
//! minimum, so no turn is reported at the edge of the data.
//!
//! ## Decision Order
//! 1. Higher than both neighbours: high-tide turn
//! 2. Lower than both neighbours: low-tide turn
//! 3. Next hour higher: rising
//! 4. Anything else: falling (this includes a perfectly flat curve)

use crate::conditions::TideTrend;
use crate::DailySeries;

/// Trend of the tide at `hour`.
///
/// Returns [`TideTrend::Unknown`] when the series has no tide value for
/// `hour`; a missing tide day never turns into a synthetic flat curve.
///
/// # Example
/// ```
/// use fishing_oracle_lib::{DailySeries, HourlySample};
/// use fishing_oracle_lib::conditions::TideTrend;
/// use fishing_oracle_lib::tide_trend::classify_tide_trend;
///
/// let series = DailySeries::new(
///     [1.0, 1.2, 1.0]
///         .iter()
///         .enumerate()
///         .map(|(hour, &tide)| HourlySample {
///             hour: hour as u8,
///             wind_speed: 0.0,
///             wind_direction: 0.0,
///             wave_height: 0.0,
///             tide_height: Some(tide),
///         })
///         .collect(),
/// );
///
/// assert_eq!(classify_tide_trend(&series, 1), TideTrend::HighTideTurn);
/// ```
pub fn classify_tide_trend(series: &DailySeries, hour: u8) -> TideTrend {
    let Some(current) = series.tide_at(hour) else {
        return TideTrend::Unknown;
    };

    let previous = hour
        .checked_sub(1)
        .and_then(|h| series.tide_at(h))
        .unwrap_or(current);
    let next = hour
        .checked_add(1)
        .and_then(|h| series.tide_at(h))
        .unwrap_or(current);

    trend_from_neighbours(previous, current, next)
}

fn trend_from_neighbours(previous: f32, current: f32, next: f32) -> TideTrend {
    if current > previous && current > next {
        TideTrend::HighTideTurn
    } else if current < previous && current < next {
        TideTrend::LowTideTurn
    } else if next > current {
        TideTrend::Rising
    } else {
        TideTrend::Falling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HourlySample;

    fn tide_series(tides: &[f32]) -> DailySeries {
        DailySeries::new(
            tides
                .iter()
                .enumerate()
                .map(|(hour, &tide)| HourlySample {
                    hour: hour as u8,
                    wind_speed: 10.0,
                    wind_direction: 0.0,
                    wave_height: 0.2,
                    tide_height: Some(tide),
                })
                .collect(),
        )
    }

    #[test]
    fn test_turning_points() {
        assert_eq!(
            classify_tide_trend(&tide_series(&[1.0, 1.2, 1.0]), 1),
            TideTrend::HighTideTurn
        );
        assert_eq!(
            classify_tide_trend(&tide_series(&[1.2, 1.0, 1.2]), 1),
            TideTrend::LowTideTurn
        );
    }

    #[test]
    fn test_rising_and_falling() {
        let rising = tide_series(&[1.0, 1.1, 1.2]);
        assert_eq!(classify_tide_trend(&rising, 1), TideTrend::Rising);

        let falling = tide_series(&[1.2, 1.1, 1.0]);
        assert_eq!(classify_tide_trend(&falling, 1), TideTrend::Falling);

        // A plateau is not a turn and not rising
        let plateau = tide_series(&[1.0, 1.2, 1.2]);
        assert_eq!(classify_tide_trend(&plateau, 1), TideTrend::Falling);
    }

    #[test]
    fn test_flat_curve_is_falling() {
        let flat = tide_series(&[0.5; 24]);
        for hour in 0..24 {
            assert_eq!(classify_tide_trend(&flat, hour), TideTrend::Falling);
        }
    }

    #[test]
    fn test_first_hour_has_no_synthetic_left_neighbour() {
        // Hour 0 is below hour 1; with a flattened left edge this is rising,
        // not a low-tide turn
        let series = tide_series(&[0.2, 0.4, 0.6]);
        assert_eq!(classify_tide_trend(&series, 0), TideTrend::Rising);

        // Hour 0 above hour 1 is falling, not a high-tide turn
        let series = tide_series(&[0.6, 0.4, 0.2]);
        assert_eq!(classify_tide_trend(&series, 0), TideTrend::Falling);
    }

    #[test]
    fn test_last_hour_has_no_synthetic_right_neighbour() {
        let mut tides = [0.0; 24];
        for (i, t) in tides.iter_mut().enumerate() {
            *t = i as f32 * 0.05;
        }
        let series = tide_series(&tides);
        // Strictly increasing into hour 23: next == current, so not a turn
        assert_eq!(classify_tide_trend(&series, 23), TideTrend::Falling);
        assert_eq!(classify_tide_trend(&series, 22), TideTrend::Rising);
    }

    #[test]
    fn test_last_available_hour_of_partial_series() {
        // Provider stopped at hour 2
        let series = tide_series(&[0.1, 0.3, 0.5]);
        assert_eq!(classify_tide_trend(&series, 2), TideTrend::Falling);
    }

    #[test]
    fn test_missing_tide_is_unknown() {
        let series = tide_series(&[1.0, 1.2, 1.0]).without_tide();
        for hour in 0..3 {
            assert_eq!(classify_tide_trend(&series, hour), TideTrend::Unknown);
        }

        // Hour absent from the series altogether
        assert_eq!(
            classify_tide_trend(&tide_series(&[1.0, 1.2]), 5),
            TideTrend::Unknown
        );
    }

    #[test]
    fn test_gap_next_to_hour_is_flattened() {
        let series = DailySeries::new(vec![
            HourlySample {
                hour: 4,
                wind_speed: 0.0,
                wind_direction: 0.0,
                wave_height: 0.0,
                tide_height: Some(0.8),
            },
            HourlySample {
                hour: 5,
                wind_speed: 0.0,
                wind_direction: 0.0,
                wave_height: 0.0,
                tide_height: Some(0.7),
            },
        ]);
        // No hour 3: previous is flattened, so hour 4 falls instead of peaking
        assert_eq!(classify_tide_trend(&series, 4), TideTrend::Falling);
    }
}
