//! Additive-trend exponential smoothing (Holt's linear method) with estimated
//! initial state, used to project a manager's points over the rest of a season.
//!
//! ```text
//! ŷ_t = l_{t-1} + b_{t-1}
//! l_t = α y_t + (1 - α)(l_{t-1} + b_{t-1})
//! b_t = β (l_t - l_{t-1}) + (1 - β) b_{t-1}
//! ŷ_{n+h} = l_n + h b_n
//! ```
//!
//! `α`, `β` and the initial `(l_0, b_0)` are chosen together by minimising the
//! sum of squared one-step-ahead errors. `β` is parameterised as `α·β*` with
//! `β* ∈ [0, 1]`, which keeps `β <= α`.

use std::fmt;

use crate::optimizer::{NelderMeadConfig, nelder_mead};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    TooShort { len: usize },
    Constant,
    NonFinite,
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::TooShort { len } => {
                write!(f, "need at least 2 observations to fit a trend, got {len}")
            }
            FitError::Constant => write!(f, "series is constant, trend is not identifiable"),
            FitError::NonFinite => write!(f, "fit produced non-finite values"),
        }
    }
}

impl std::error::Error for FitError {}

#[derive(Debug, Clone)]
pub struct HoltFit {
    pub alpha: f64,
    pub beta: f64,
    pub initial_level: f64,
    pub initial_trend: f64,
    /// Level after the last observation.
    pub level: f64,
    /// Trend after the last observation.
    pub trend: f64,
    pub sse: f64,
    /// One-step-ahead fitted values, aligned with the input.
    pub fitted: Vec<f64>,
}

impl HoltFit {
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|h| self.level + h as f64 * self.trend)
            .collect()
    }
}

/// Observed series as passed in plus the rounded forecast for the rest of the season.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Forecast {
    pub observed: Vec<u32>,
    pub predicted: Vec<i64>,
}

/// Forecasts the weeks left in a season of `season_length` weeks.
///
/// An empty `observed` is the "no data" sentinel and comes back as a zero
/// series covering the whole season. Fitting failures leave `predicted` empty.
pub fn forecast(observed: &[u32], season_length: usize) -> Forecast {
    if observed.is_empty() {
        return Forecast {
            observed: vec![0; season_length],
            predicted: Vec::new(),
        };
    }
    Forecast {
        observed: observed.to_vec(),
        predicted: forecast_remaining(observed, season_length).unwrap_or_default(),
    }
}

/// Like [`forecast`], but reports why a forecast could not be produced.
///
/// Returns `Ok(vec![])` without fitting when the season is already complete.
pub fn forecast_remaining(observed: &[u32], season_length: usize) -> Result<Vec<i64>, FitError> {
    let horizon = season_length.saturating_sub(observed.len());
    if horizon == 0 {
        return Ok(Vec::new());
    }
    let values: Vec<f64> = observed.iter().map(|&v| v as f64).collect();
    let fit = fit_holt(&values)?;
    fit.forecast(horizon)
        .into_iter()
        .map(|v| {
            if v.is_finite() {
                Ok(v.round_ties_even() as i64)
            } else {
                Err(FitError::NonFinite)
            }
        })
        .collect()
}

pub fn fit_holt(values: &[f64]) -> Result<HoltFit, FitError> {
    if values.len() < 2 {
        return Err(FitError::TooShort { len: values.len() });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }
    if values.windows(2).all(|w| w[0] == w[1]) {
        return Err(FitError::Constant);
    }

    let l0 = values[0];
    let b0 = values[1] - values[0];
    let (alpha, beta_star) = grid_start(values, l0, b0);

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scale = (max - min).max(1.0);
    let steps = [0.05, 0.05, 0.1 * scale, 0.05 * scale];
    let bounds = [Some((0.0, 1.0)), Some((0.0, 1.0)), None, None];
    let objective = |x: &[f64]| match simulate(values, x[0], x[0] * x[1], x[2], x[3]) {
        Some(sim) => sim.sse,
        None => f64::INFINITY,
    };

    let mut x = vec![alpha, beta_star, l0, b0];
    let mut best = f64::INFINITY;
    // Restarting from the previous optimum recovers from a collapsed simplex.
    for _ in 0..3 {
        let res = nelder_mead(&objective, &x, &steps, &bounds, NelderMeadConfig::default());
        let improved = !best.is_finite() || res.value < best - 1e-9 * best.abs().max(1.0);
        if res.value <= best {
            best = res.value;
            x = res.x;
        }
        if !improved {
            break;
        }
    }

    let alpha = x[0];
    let beta = x[0] * x[1];
    let sim = simulate(values, alpha, beta, x[2], x[3]).ok_or(FitError::NonFinite)?;
    Ok(HoltFit {
        alpha,
        beta,
        initial_level: x[2],
        initial_trend: x[3],
        level: sim.level,
        trend: sim.trend,
        sse: sim.sse,
        fitted: sim.fitted,
    })
}

/// Coarse search over `(α, β*)` with the heuristic initial state.
fn grid_start(values: &[f64], l0: f64, b0: f64) -> (f64, f64) {
    let mut best = (0.5, 0.1);
    let mut best_sse = f64::INFINITY;
    for a_step in 1..=9 {
        let alpha = a_step as f64 / 10.0;
        for b_step in 0..=9 {
            let beta_star = b_step as f64 / 10.0;
            let Some(sim) = simulate(values, alpha, alpha * beta_star, l0, b0) else {
                continue;
            };
            if sim.sse < best_sse {
                best_sse = sim.sse;
                best = (alpha, beta_star);
            }
        }
    }
    best
}

struct Simulation {
    sse: f64,
    level: f64,
    trend: f64,
    fitted: Vec<f64>,
}

fn simulate(values: &[f64], alpha: f64, beta: f64, l0: f64, b0: f64) -> Option<Simulation> {
    let mut level = l0;
    let mut trend = b0;
    let mut sse = 0.0;
    let mut fitted = Vec::with_capacity(values.len());
    for &y in values {
        let yhat = level + trend;
        let e = y - yhat;
        sse += e * e;
        fitted.push(yhat);

        let prev_level = level;
        level = alpha * y + (1.0 - alpha) * (prev_level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        if !level.is_finite() || !trend.is_finite() {
            return None;
        }
    }
    sse.is_finite().then_some(Simulation {
        sse,
        level,
        trend,
        fitted,
    })
}
