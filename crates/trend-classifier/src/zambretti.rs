//! Zambretti forecaster
//!
//! The classic Negretti & Zambra barometer table: sea-level pressure and
//! its three-hour tendency select one of 26 outlooks, A (settled fine)
//! through Z (stormy, much rain).

use crate::classifier::{Forecast, PressureForecaster};
use crate::trend::{pressure_change_per_3h, sea_level_pressure, PressureTrend};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zambretti outlook letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outlook {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
}

impl Outlook {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Outlook::A => "settled fine",
            Outlook::B => "fine weather",
            Outlook::C => "becoming fine",
            Outlook::D => "fine, becoming less settled",
            Outlook::E => "fine, possible showers",
            Outlook::F => "fairly fine, improving",
            Outlook::G => "fairly fine, possible showers early",
            Outlook::H => "fairly fine, showery later",
            Outlook::I => "showery early, improving",
            Outlook::J => "changeable, mending",
            Outlook::K => "fairly fine, showers likely",
            Outlook::L => "rather unsettled, clearing later",
            Outlook::M => "unsettled, probably improving",
            Outlook::N => "showery, bright intervals",
            Outlook::O => "showery, becoming less settled",
            Outlook::P => "changeable, some rain",
            Outlook::Q => "unsettled, short fine intervals",
            Outlook::R => "unsettled, rain later",
            Outlook::S => "unsettled, some rain",
            Outlook::T => "mostly very unsettled",
            Outlook::U => "occasional rain, worsening",
            Outlook::V => "rain at times, very unsettled",
            Outlook::W => "rain at frequent intervals",
            Outlook::X => "rain, very unsettled",
            Outlook::Y => "stormy, may improve",
            Outlook::Z => "stormy, much rain",
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use Outlook::*;

/// Zambretti numbers 1..=9
const FALLING: [Outlook; 9] = [A, B, D, H, O, R, U, X, Z];
/// Zambretti numbers 10..=19
const STEADY: [Outlook; 10] = [A, B, E, K, N, P, S, W, X, Z];
/// Zambretti numbers 20..=32
const RISING: [Outlook; 13] = [A, B, C, F, G, I, J, L, M, Q, T, Y, Z];

/// Zambretti forecaster
#[derive(Debug, Clone, Copy, Default)]
pub struct Zambretti;

impl Zambretti {
    /// Zambretti number for a sea-level pressure, clamped into the
    /// tendency's table range.
    pub fn number(trend: PressureTrend, sea_level_hpa: f64) -> u8 {
        let (raw, first, last) = if trend.is_falling() {
            (127.0 - 0.12 * sea_level_hpa, 1u8, 9u8)
        } else if trend.is_rising() {
            (185.0 - 0.16 * sea_level_hpa, 20, 32)
        } else {
            (144.0 - 0.13 * sea_level_hpa, 10, 19)
        };

        if raw.is_nan() {
            return first;
        }
        raw.round().clamp(f64::from(first), f64::from(last)) as u8
    }

    /// Outlook for a tendency and sea-level pressure
    pub fn outlook(trend: PressureTrend, sea_level_hpa: f64) -> Outlook {
        let z = Self::number(trend, sea_level_hpa);
        let (table, first): (&[Outlook], u8) = if trend.is_falling() {
            (&FALLING, 1)
        } else if trend.is_rising() {
            (&RISING, 20)
        } else {
            (&STEADY, 10)
        };

        let idx = usize::from(z.saturating_sub(first)).min(table.len() - 1);
        table[idx]
    }
}

impl PressureForecaster for Zambretti {
    fn forecast(
        &self,
        series: &[(DateTime<Utc>, f64)],
        elevation_m: f64,
        temperature_c: f64,
    ) -> Forecast {
        let change = pressure_change_per_3h(series);
        let trend = PressureTrend::from_change(change);

        let station_hpa = series.last().map_or(f64::NAN, |(_, p)| *p);
        let sea_level = sea_level_pressure(station_hpa, elevation_m, temperature_c);
        let outlook = Self::outlook(trend, sea_level);

        Forecast {
            label: format!("{}, {}", trend, outlook),
            trend,
            pressure_change_hpa: change,
        }
    }
}
