use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::SeasonConfig;
use crate::forecast::{FitError, forecast_remaining};
use crate::fpl_fetch::{self, HistoryEntry, pad_history};

/// Where histories and manager names come from.
pub trait HistorySource: Sync {
    fn history(&self, team_id: u32) -> Result<Vec<HistoryEntry>>;
    fn manager_name(&self, team_id: u32) -> Result<Option<String>>;
}

/// Live FPL API.
#[derive(Debug, Clone, Copy, Default)]
pub struct FplSource;

impl HistorySource for FplSource {
    fn history(&self, team_id: u32) -> Result<Vec<HistoryEntry>> {
        fpl_fetch::fetch_history(team_id)
    }

    fn manager_name(&self, team_id: u32) -> Result<Option<String>> {
        fpl_fetch::fetch_manager_name(team_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SeriesStatus {
    Forecast,
    /// Observed weeks already fill the season.
    SeasonComplete,
    /// History missing, empty or unreachable; observed is the zero sentinel.
    NoData { reason: String },
    FitFailed(#[serde(serialize_with = "serialize_fit_error")] FitError),
}

fn serialize_fit_error<S: serde::Serializer>(err: &FitError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&err.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantSeries {
    /// Input slot the id was entered in; picks the chart colour.
    pub slot: usize,
    pub team_id: u32,
    pub name: String,
    /// Index `i` is gameweek `i`.
    pub observed: Vec<u32>,
    /// Continues right after `observed`.
    pub predicted: Vec<i64>,
    pub status: SeriesStatus,
}

impl ParticipantSeries {
    pub fn observed_points(&self) -> Vec<(f64, f64)> {
        self.observed
            .iter()
            .enumerate()
            .map(|(week, &pts)| (week as f64, pts as f64))
            .collect()
    }

    pub fn forecast_points(&self) -> Vec<(f64, f64)> {
        let start = self.observed.len();
        self.predicted
            .iter()
            .enumerate()
            .map(|(i, &pts)| ((start + i) as f64, pts as f64))
            .collect()
    }

    pub fn final_points(&self) -> Option<i64> {
        self.predicted
            .last()
            .copied()
            .or_else(|| self.observed.last().map(|&v| v as i64))
    }

    pub fn has_forecast(&self) -> bool {
        !self.predicted.is_empty()
    }
}

pub fn fallback_name(team_id: u32) -> String {
    format!("Player {team_id}")
}

/// Runs retrieve, pad, fit and forecast for one team. Never fails: problems
/// degrade to the zero series or to an empty forecast.
pub fn run_participant(
    source: &dyn HistorySource,
    config: &SeasonConfig,
    team_id: u32,
) -> ParticipantSeries {
    let name = match source.manager_name(team_id) {
        Ok(Some(name)) => name,
        _ => fallback_name(team_id),
    };

    let history = match source.history(team_id) {
        Ok(history) if !history.is_empty() => history,
        Ok(_) => return no_data(team_id, name, config, "no history".to_string()),
        Err(err) => return no_data(team_id, name, config, format!("{err:#}")),
    };

    let observed = pad_history(&history, config.metric, config.season_length);
    if observed.is_empty() {
        return no_data(team_id, name, config, "no history within the season".to_string());
    }
    let (predicted, status) = match forecast_remaining(&observed, config.season_length) {
        Ok(predicted) if predicted.is_empty() => (predicted, SeriesStatus::SeasonComplete),
        Ok(predicted) => (predicted, SeriesStatus::Forecast),
        Err(err) => (Vec::new(), SeriesStatus::FitFailed(err)),
    };
    ParticipantSeries {
        slot: 0,
        team_id,
        name,
        observed,
        predicted,
        status,
    }
}

fn no_data(team_id: u32, name: String, config: &SeasonConfig, reason: String) -> ParticipantSeries {
    ParticipantSeries {
        slot: 0,
        team_id,
        name,
        observed: vec![0; config.season_length],
        predicted: Vec::new(),
        status: SeriesStatus::NoData { reason },
    }
}

/// One isolated pipeline per id, run in parallel. Output order follows
/// `team_ids` and each id's slot is its position; ids past
/// `config.max_participants` are ignored.
pub fn run_all(
    source: &dyn HistorySource,
    config: &SeasonConfig,
    team_ids: &[u32],
) -> Vec<ParticipantSeries> {
    let requests: Vec<(usize, u32)> = team_ids.iter().copied().enumerate().collect();
    run_slots(source, config, &requests)
}

/// Like [`run_all`] for `(slot, team_id)` pairs, keeping each slot so blank
/// inputs do not shift the others.
pub fn run_slots(
    source: &dyn HistorySource,
    config: &SeasonConfig,
    requests: &[(usize, u32)],
) -> Vec<ParticipantSeries> {
    let take = requests.len().min(config.max_participants);
    requests[..take]
        .par_iter()
        .map(|&(slot, team_id)| ParticipantSeries {
            slot,
            ..run_participant(source, config, team_id)
        })
        .collect()
}

pub fn parse_team_ids(raw: &str) -> Vec<u32> {
    raw.split([',', ';', ' '])
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .collect()
}
