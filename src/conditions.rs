//! # Condition Categories and Per-Hour Rules
//!
//! The categorical judgments made for a single hour, and the threshold rules
//! that produce them. Tide trend needs neighbouring hours and lives in
//! [`crate::tide_trend`]; everything here looks at one sample only.
//!
//! ## Calibration
//!
//! All cutoffs were tuned on one sandy beach south of Valencia. They are carried
//! in [`Thresholds`] so a zone with a different profile can override them from
//! the configuration file. The free functions use [`Thresholds::default`].
//!
//! | Rule          | Default                      |
//! |---------------|------------------------------|
//! | Levante       | 45°–135° inclusive           |
//! | Poniente      | 225°–315° inclusive          |
//! | Turbid        | wave > 0.6 m with Levante    |
//! | Clear         | Poniente, or wave < 0.3 m    |
//! | Choppy        | wave ≥ 0.4 m                 |
//! | High water    | tide ≥ 0.6 m                 |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wind sector derived from direction alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSector {
    /// Easterly, onshore on this coast
    Levante,
    /// Westerly, offshore on this coast
    Poniente,
    Variable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterClarity {
    Turbid,
    Clear,
    Variable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeaState {
    Choppy,
    Flat,
}

/// Direction of the tide around an hour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TideTrend {
    /// Local maximum (pleamar), about to fall
    HighTideTurn,
    /// Local minimum (bajamar), about to rise
    LowTideTurn,
    Rising,
    Falling,
    /// No tide value for this hour
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FishingRating {
    Good,
    Fair,
    /// Slack water at a tide turn
    Stopped,
    Unknown,
}

/// How much sand is exposed between the dune and the surf line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeachExposure {
    /// High water, surf line close to the dune
    Short,
    /// Low water
    Long,
    Unknown,
}

/// Everything the classifier says about one hour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionLabel {
    pub wind_sector: WindSector,
    pub water_clarity: WaterClarity,
    pub sea_state: SeaState,
    pub tide_trend: TideTrend,
    pub fishing_rating: FishingRating,
    pub beach_exposure: BeachExposure,
}

/// Inclusive range of compass degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionSector {
    pub from: f32,
    pub to: f32,
}

impl DirectionSector {
    pub const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    /// No wraparound: a sector with `from > to` contains nothing.
    pub fn contains(&self, degrees: f32) -> bool {
        self.from <= degrees && degrees <= self.to
    }
}

/// Site calibration for the per-hour rules.
///
/// Every field is optional when deserialized; missing fields keep their default.
///
/// ```
/// use fishing_oracle_lib::conditions::{Thresholds, SeaState};
///
/// let thresholds: Thresholds = toml::from_str("choppy_wave_height = 0.8").unwrap();
///
/// assert_eq!(thresholds.sea_state(0.5), SeaState::Flat);
/// assert_eq!(thresholds.turbid_wave_height, 0.6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub levante: DirectionSector,
    pub poniente: DirectionSector,
    /// Waves above this under Levante stir up sediment
    pub turbid_wave_height: f32,
    /// Waves below this leave the water clear
    pub clear_wave_height: f32,
    pub choppy_wave_height: f32,
    pub high_water_tide_height: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            levante: DirectionSector::new(45.0, 135.0),
            poniente: DirectionSector::new(225.0, 315.0),
            turbid_wave_height: 0.6,
            clear_wave_height: 0.3,
            choppy_wave_height: 0.4,
            high_water_tide_height: 0.6,
        }
    }
}

impl Thresholds {
    pub fn wind_sector(&self, direction_degrees: f32) -> WindSector {
        if self.levante.contains(direction_degrees) {
            WindSector::Levante
        } else if self.poniente.contains(direction_degrees) {
            WindSector::Poniente
        } else {
            WindSector::Variable
        }
    }

    /// First matching rule wins; the order matters because the rules overlap.
    pub fn clarity(&self, wave_height: f32, wind_sector: WindSector) -> WaterClarity {
        if wave_height > self.turbid_wave_height && wind_sector == WindSector::Levante {
            WaterClarity::Turbid
        } else if wind_sector == WindSector::Poniente || wave_height < self.clear_wave_height {
            WaterClarity::Clear
        } else {
            WaterClarity::Variable
        }
    }

    pub fn sea_state(&self, wave_height: f32) -> SeaState {
        if wave_height >= self.choppy_wave_height {
            SeaState::Choppy
        } else {
            SeaState::Flat
        }
    }

    pub fn exposure(&self, tide_height: Option<f32>) -> BeachExposure {
        match tide_height {
            Some(h) if h >= self.high_water_tide_height => BeachExposure::Short,
            Some(_) => BeachExposure::Long,
            None => BeachExposure::Unknown,
        }
    }
}

/// Wind sector with the default calibration.
///
/// Total over all reals: anything outside both sectors, including values
/// outside `[0, 360)` and NaN, is [`WindSector::Variable`].
pub fn classify_wind_sector(direction_degrees: f32) -> WindSector {
    Thresholds::default().wind_sector(direction_degrees)
}

pub fn classify_clarity(wave_height: f32, wind_sector: WindSector) -> WaterClarity {
    Thresholds::default().clarity(wave_height, wind_sector)
}

pub fn classify_sea_state(wave_height: f32) -> SeaState {
    Thresholds::default().sea_state(wave_height)
}

pub fn classify_exposure(tide_height: Option<f32>) -> BeachExposure {
    Thresholds::default().exposure(tide_height)
}

/// Fishing rating is a pure function of the tide trend.
pub fn rate(tide_trend: TideTrend) -> FishingRating {
    match tide_trend {
        TideTrend::HighTideTurn | TideTrend::LowTideTurn => FishingRating::Stopped,
        TideTrend::Rising => FishingRating::Good,
        TideTrend::Falling => FishingRating::Fair,
        TideTrend::Unknown => FishingRating::Unknown,
    }
}

// Stable machine names, shared by Display and the JSON output
macro_rules! machine_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

machine_names!(WindSector { Levante => "levante", Poniente => "poniente", Variable => "variable" });
machine_names!(WaterClarity { Turbid => "turbid", Clear => "clear", Variable => "variable" });
machine_names!(SeaState { Choppy => "choppy", Flat => "flat" });
machine_names!(TideTrend {
    HighTideTurn => "high_tide_turn",
    LowTideTurn => "low_tide_turn",
    Rising => "rising",
    Falling => "falling",
    Unknown => "unknown",
});
machine_names!(FishingRating { Good => "good", Fair => "fair", Stopped => "stopped", Unknown => "unknown" });
machine_names!(BeachExposure { Short => "short", Long => "long", Unknown => "unknown" });
