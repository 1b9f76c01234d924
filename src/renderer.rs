//! # Forecast Table Rendering
//!
//! This module turns classified hours into something a person reads: an aligned
//! terminal table with icons, or JSON for other tools. The classifier only names
//! categories; all human text and iconography is chosen here.
//!
//! `Unknown` values get their own icon so "could not classify" never looks like a
//! confident answer.

use crate::classify::HourlyConditions;
use crate::conditions::{
    BeachExposure, ConditionLabel, FishingRating, SeaState, TideTrend, WaterClarity, WindSector,
};
use crate::DailySeries;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::{self, Write};

const UNKNOWN: &str = "❔ Unknown";

/// Human-readable text for a condition category.
pub trait Describe {
    fn describe(&self) -> &'static str;
}

impl Describe for WindSector {
    fn describe(&self) -> &'static str {
        match self {
            WindSector::Levante => "Levante (E)",
            WindSector::Poniente => "Poniente (W)",
            WindSector::Variable => "Var.",
        }
    }
}

impl Describe for WaterClarity {
    fn describe(&self) -> &'static str {
        match self {
            WaterClarity::Turbid => "🟤 Turbid",
            WaterClarity::Clear => "🔵 Clear",
            WaterClarity::Variable => "⚪ Variable",
        }
    }
}

impl Describe for SeaState {
    fn describe(&self) -> &'static str {
        match self {
            SeaState::Choppy => "🌊 Choppy",
            SeaState::Flat => "💎 Flat",
        }
    }
}

impl Describe for TideTrend {
    fn describe(&self) -> &'static str {
        match self {
            TideTrend::HighTideTurn => "🛑 HIGH TIDE",
            TideTrend::LowTideTurn => "🛑 LOW TIDE",
            TideTrend::Rising => "⬆️ RISING",
            TideTrend::Falling => "⬇️ FALLING",
            TideTrend::Unknown => UNKNOWN,
        }
    }
}

impl Describe for FishingRating {
    fn describe(&self) -> &'static str {
        match self {
            FishingRating::Good => "✅ GOOD",
            FishingRating::Fair => "⚠️ FAIR",
            FishingRating::Stopped => "⛔ STOPPED",
            FishingRating::Unknown => UNKNOWN,
        }
    }
}

impl Describe for BeachExposure {
    fn describe(&self) -> &'static str {
        match self {
            BeachExposure::Short => "🌊 SHORT (high)",
            BeachExposure::Long => "🏖️ LONG (low)",
            BeachExposure::Unknown => UNKNOWN,
        }
    }
}

const HEADERS: [&str; 8] = [
    "HOUR", "WIND", "WAVES", "SEA", "WATER", "BEACH", "TIDE", "RATING",
];

fn table_cells(series: &DailySeries, row: &HourlyConditions) -> [String; 8] {
    let label = &row.label;
    let (wind, waves) = match series.get(row.hour) {
        Some(s) => (
            format!("{:.0} km/h {}", s.wind_speed, label.wind_sector.describe()),
            format!("{:.1}m", s.wave_height),
        ),
        None => ("-".to_string(), "-".to_string()),
    };

    [
        format!("{}:00", row.hour),
        wind,
        waves,
        label.sea_state.describe().to_string(),
        label.water_clarity.describe().to_string(),
        label.beach_exposure.describe().to_string(),
        label.tide_trend.describe().to_string(),
        label.fishing_rating.describe().to_string(),
    ]
}

/// Write an aligned table of `rows` followed by the zone note.
pub fn render_table<W: Write>(
    out: &mut W,
    zone: &str,
    series: &DailySeries,
    rows: &[HourlyConditions],
) -> io::Result<()> {
    writeln!(out, "🎣 Forecast for {zone}")?;
    writeln!(out)?;

    if rows.is_empty() {
        writeln!(out, "No forecast data for the requested hours.")?;
    } else {
        let cells: Vec<[String; 8]> = rows.iter().map(|r| table_cells(series, r)).collect();

        // Column width by character count; wide glyphs may still drift by a column
        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_row(out, &HEADERS.map(String::from), &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        writeln!(out, "{}", rule.join("─┼─"))?;
        for row in &cells {
            write_row(out, row, &widths)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "ℹ️  Wind and waves are specific to {zone}.")?;
    if series.has_tide() {
        writeln!(out, "ℹ️  Tide is the shared Valencia reference, valid for the whole coast.")?;
    } else {
        writeln!(out, "⚠️  No tide data for this day: tide, rating and beach are unknown.")?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: &[String; 8], widths: &[usize; 8]) -> io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    writeln!(out, "{}", padded.join(" │ ").trim_end())
}

#[derive(Serialize)]
struct JsonRow {
    hour: u8,
    wind_speed: Option<f32>,
    wind_direction: Option<f32>,
    wave_height: Option<f32>,
    tide_height: Option<f32>,
    #[serde(flatten)]
    label: ConditionLabel,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    zone: &'a str,
    date: NaiveDate,
    tide_available: bool,
    hours: Vec<JsonRow>,
}

/// Write `rows` as a single pretty-printed JSON document.
pub fn render_json<W: Write>(
    out: &mut W,
    zone: &str,
    date: NaiveDate,
    series: &DailySeries,
    rows: &[HourlyConditions],
) -> io::Result<()> {
    let report = JsonReport {
        zone,
        date,
        tide_available: series.has_tide(),
        hours: rows
            .iter()
            .map(|row| {
                let sample = series.get(row.hour);
                JsonRow {
                    hour: row.hour,
                    wind_speed: sample.map(|s| s.wind_speed),
                    wind_direction: sample.map(|s| s.wind_direction),
                    wave_height: sample.map(|s| s.wave_height),
                    tide_height: series.tide_at(row.hour),
                    label: row.label,
                }
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

/// Print the table to stdout.
pub fn draw_ascii(zone: &str, series: &DailySeries, rows: &[HourlyConditions]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    render_table(&mut lock, zone, series, rows)
}
