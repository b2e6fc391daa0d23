use crate::config::{Rgb, SeasonConfig};
use crate::pipeline::ParticipantSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// One drawable line: a participant's observed or forecast segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub style: LineStyle,
    pub colour: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

pub fn axis_bounds(config: &SeasonConfig) -> AxisBounds {
    AxisBounds {
        x: [0.0, config.last_week() as f64],
        y: [0.0, config.y_max],
    }
}

/// Two lines per participant, observed then forecast, coloured by slot.
/// Empty segments are kept so legend order stays stable.
pub fn chart_series(participants: &[ParticipantSeries], config: &SeasonConfig) -> Vec<ChartSeries> {
    let mut out = Vec::with_capacity(participants.len() * 2);
    for p in participants {
        let colour = config.colour(p.slot);
        out.push(ChartSeries {
            label: format!("{} - Current", p.name),
            points: p.observed_points(),
            style: LineStyle::Solid,
            colour,
        });
        out.push(ChartSeries {
            label: format!("{} - Future", p.name),
            points: p.forecast_points(),
            style: LineStyle::Dashed,
            colour,
        });
    }
    out
}

/// Tick labels for an axis spanning `[lo, hi]`.
pub fn axis_labels(lo: f64, hi: f64, ticks: usize) -> Vec<String> {
    if ticks < 2 || hi <= lo {
        return vec![format!("{lo:.0}"), format!("{hi:.0}")];
    }
    let step = (hi - lo) / (ticks - 1) as f64;
    (0..ticks)
        .map(|i| format!("{:.0}", lo + step * i as f64))
        .collect()
}
