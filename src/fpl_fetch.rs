use std::collections::BTreeMap;
use std::env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::PointsMetric;
use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;

const FPL_API_BASE: &str = "https://fantasy.premierleague.com/api";

/// One gameweek row from `entry/{id}/history/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Gameweek number, 1-based.
    pub event: u32,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub rank: Option<u64>,
    #[serde(default)]
    pub overall_rank: Option<u64>,
    #[serde(default)]
    pub event_transfers_cost: i64,
    #[serde(default)]
    pub points_on_bench: i64,
}

impl HistoryEntry {
    pub fn new(event: u32, points: i64, total_points: i64) -> Self {
        Self {
            event,
            points,
            total_points,
            rank: None,
            overall_rank: None,
            event_transfers_cost: 0,
            points_on_bench: 0,
        }
    }

    fn value(&self, metric: PointsMetric) -> i64 {
        match metric {
            PointsMetric::Total => self.total_points,
            PointsMetric::Weekly => self.points,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    current: Option<Vec<HistoryEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManagerEntry {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub player_first_name: Option<String>,
    #[serde(default)]
    pub player_last_name: Option<String>,
    /// Team name chosen by the manager.
    #[serde(default)]
    pub name: Option<String>,
}

impl ManagerEntry {
    pub fn display_name(&self) -> Option<String> {
        let first = self.player_first_name.as_deref().unwrap_or("").trim();
        let last = self.player_last_name.as_deref().unwrap_or("").trim();
        if first.is_empty() && last.is_empty() {
            return None;
        }
        Some(format!("{first} {last}").trim().to_string())
    }
}

pub fn api_base() -> String {
    env::var("FPL_API_BASE")
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| FPL_API_BASE.to_string())
}

/// Gameweek history for `team_id`. A 404 is reported as an empty history.
pub fn fetch_history(team_id: u32) -> Result<Vec<HistoryEntry>> {
    let client = http_client()?;
    let url = format!("{}/entry/{team_id}/history/", api_base());
    let body = fetch_json_cached(client, &url, &[]).context("history request failed")?;
    history_from_response(body.as_deref())
}

/// Manager display name for `team_id`, `None` when the entry has no name.
pub fn fetch_manager_name(team_id: u32) -> Result<Option<String>> {
    let client = http_client()?;
    let url = format!("{}/entry/{team_id}/", api_base());
    let body = fetch_json_cached(client, &url, &[]).context("entry request failed")?;
    name_from_response(body.as_deref())
}

/// `None` is a 404 from the API.
fn history_from_response(body: Option<&str>) -> Result<Vec<HistoryEntry>> {
    match body {
        Some(body) => parse_history_json(body),
        None => Ok(Vec::new()),
    }
}

fn name_from_response(body: Option<&str>) -> Result<Option<String>> {
    match body {
        Some(body) => Ok(parse_entry_json(body)?.display_name()),
        None => Ok(None),
    }
}

pub fn parse_history_json(raw: &str) -> Result<Vec<HistoryEntry>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let resp: HistoryResponse = serde_json::from_str(trimmed).context("invalid history json")?;
    Ok(resp.current.unwrap_or_default())
}

pub fn parse_entry_json(raw: &str) -> Result<ManagerEntry> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(ManagerEntry::default());
    }
    serde_json::from_str(trimmed).context("invalid entry json")
}

/// Lays history out so that index `i` is gameweek `i`.
///
/// Index 0 and every week before the first active gameweek `k` are zero, so
/// the series starts with exactly `k` zeros. Rows are ordered by gameweek and
/// a repeated gameweek keeps its last row. Missing weeks after the first
/// active one repeat the previous total, or are zero for weekly points.
/// Rows for gameweek `season_length` or later are dropped, so the series never
/// outgrows the season.
pub fn pad_history(entries: &[HistoryEntry], metric: PointsMetric, season_length: usize) -> Vec<u32> {
    let by_week: BTreeMap<u32, i64> = entries
        .iter()
        .map(|e| (e.event.max(1), e.value(metric)))
        .filter(|(week, _)| (*week as usize) < season_length)
        .collect();
    let Some((&last_week, _)) = by_week.last_key_value() else {
        return Vec::new();
    };
    let first_week = by_week.keys().next().copied().unwrap_or(1);

    let mut out = vec![0u32; first_week as usize];
    let mut carried = 0u32;
    for week in first_week..=last_week {
        let value = match by_week.get(&week) {
            Some(v) => (*v).clamp(0, u32::MAX as i64) as u32,
            None => match metric {
                PointsMetric::Total => carried,
                PointsMetric::Weekly => 0,
            },
        };
        carried = value;
        out.push(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_week_one_gets_single_leading_zero() {
        let entries = vec![HistoryEntry::new(1, 60, 60), HistoryEntry::new(2, 45, 105)];
        assert_eq!(pad_history(&entries, PointsMetric::Total, 39), vec![0, 60, 105]);
        assert_eq!(pad_history(&entries, PointsMetric::Weekly, 39), vec![0, 60, 45]);
    }

    #[test]
    fn late_joiner_is_padded_to_their_first_week() {
        let entries = vec![HistoryEntry::new(4, 50, 50), HistoryEntry::new(5, 70, 120)];
        let series = pad_history(&entries, PointsMetric::Total, 39);
        assert_eq!(series, vec![0, 0, 0, 0, 50, 120]);
    }

    #[test]
    fn gaps_carry_totals_and_zero_weekly() {
        let entries = vec![HistoryEntry::new(3, 40, 100), HistoryEntry::new(1, 60, 60)];
        assert_eq!(pad_history(&entries, PointsMetric::Total, 39), vec![0, 60, 60, 100]);
        assert_eq!(pad_history(&entries, PointsMetric::Weekly, 39), vec![0, 60, 0, 40]);
    }

    #[test]
    fn weeks_past_the_season_are_dropped() {
        let entries = vec![
            HistoryEntry::new(1, 60, 60),
            HistoryEntry::new(2, 45, 105),
            HistoryEntry::new(400_000_000, 10, 115),
            HistoryEntry::new(u32::MAX, 10, 125),
        ];
        assert_eq!(pad_history(&entries, PointsMetric::Total, 39), vec![0, 60, 105]);

        let late = vec![HistoryEntry::new(38, 50, 2000), HistoryEntry::new(39, 50, 2050)];
        let series = pad_history(&late, PointsMetric::Total, 39);
        assert_eq!(series.len(), 39);
        assert_eq!(series.last(), Some(&2000));
        assert!(pad_history(&late[1..], PointsMetric::Total, 39).is_empty());
    }

    #[test]
    fn not_found_responses_are_empty() {
        assert!(history_from_response(None).expect("404 is not an error").is_empty());
        assert_eq!(name_from_response(None).expect("404 is not an error"), None);
        let rows = history_from_response(Some(r#"{"current":[{"event":2,"points":5,"total_points":5}]}"#))
            .expect("body should parse");
        assert_eq!(rows, vec![HistoryEntry::new(2, 5, 5)]);
        assert!(history_from_response(Some("{broken")).is_err());
    }

    #[test]
    fn display_name_trims_and_skips_blank() {
        let entry = ManagerEntry {
            player_first_name: Some("Aly ".to_string()),
            player_last_name: Some("".to_string()),
            ..ManagerEntry::default()
        };
        assert_eq!(entry.display_name().as_deref(), Some("Aly"));
        assert!(ManagerEntry::default().display_name().is_none());
    }
}
