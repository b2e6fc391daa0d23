use std::env;

use anyhow::{Result, anyhow};

pub const DEFAULT_SEASON_WEEKS: usize = 39;
pub const DEFAULT_Y_MAX: f64 = 2500.0;
pub const DEFAULT_MAX_PARTICIPANTS: usize = 3;
pub const DEFAULT_PALETTE: [&str; 3] = ["#e43075", "#5dca36", "#2474a3"];

/// Which FPL history field feeds the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsMetric {
    /// Running season total (`total_points`).
    Total,
    /// Points scored in that gameweek alone (`points`).
    Weekly,
}

impl PointsMetric {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "total" | "total_points" | "cumulative" => Some(Self::Total),
            "weekly" | "points" | "week" => Some(Self::Weekly),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Weekly => "weekly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_hex(raw: &str) -> Result<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow!("invalid colour {raw:?}, expected #rrggbb"));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// Immutable per-run settings shared by the forecaster, pipeline and UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonConfig {
    /// Total chart weeks, week 0 included.
    pub season_length: usize,
    pub y_max: f64,
    pub max_participants: usize,
    pub metric: PointsMetric,
    pub palette: Vec<Rgb>,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            season_length: DEFAULT_SEASON_WEEKS,
            y_max: DEFAULT_Y_MAX,
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            metric: PointsMetric::Total,
            palette: default_palette(),
        }
    }
}

impl SeasonConfig {
    pub fn with_season_length(season_length: usize) -> Self {
        Self {
            season_length,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let season_length = env::var("FPL_SEASON_WEEKS")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.season_length)
            .max(2);
        let y_max = env::var("FPL_Y_MAX")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(defaults.y_max);
        let max_participants = env::var("FPL_MAX_PLAYERS")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.max_participants)
            .clamp(1, 8);
        let metric = env::var("FPL_METRIC")
            .ok()
            .and_then(|val| PointsMetric::parse(&val))
            .unwrap_or(defaults.metric);

        Self {
            season_length,
            y_max,
            max_participants,
            metric,
            palette: defaults.palette,
        }
    }

    /// Colour for the participant at `idx`, cycling through the palette.
    pub fn colour(&self, idx: usize) -> Rgb {
        if self.palette.is_empty() {
            return Rgb {
                r: 255,
                g: 255,
                b: 255,
            };
        }
        self.palette[idx % self.palette.len()]
    }

    pub fn last_week(&self) -> usize {
        self.season_length.saturating_sub(1)
    }
}

fn default_palette() -> Vec<Rgb> {
    DEFAULT_PALETTE
        .iter()
        .filter_map(|hex| Rgb::from_hex(hex).ok())
        .collect()
}
