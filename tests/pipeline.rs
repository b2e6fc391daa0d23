use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};

use fpl_forecast::chart::{LineStyle, axis_bounds, chart_series};
use fpl_forecast::config::{PointsMetric, SeasonConfig};
use fpl_forecast::demo_feed::DemoSource;
use fpl_forecast::forecast::FitError;
use fpl_forecast::fpl_fetch::HistoryEntry;
use fpl_forecast::pipeline::{
    HistorySource, SeriesStatus, parse_team_ids, run_all, run_participant, run_slots,
};

/// 1: steady scorer from week 1, 2: joins at week 4 and sleeps first,
/// 3: transport error, 4: scored nothing, 5: name lookup fails,
/// 6: one row claims an absurd gameweek.
struct StubSource;

impl HistorySource for StubSource {
    fn history(&self, team_id: u32) -> Result<Vec<HistoryEntry>> {
        match team_id {
            1 | 5 => Ok(cumulative(1, &[60, 52, 71, 48, 66, 59])),
            2 => {
                thread::sleep(Duration::from_millis(50));
                Ok(cumulative(4, &[40, 62, 58]))
            }
            3 => Err(anyhow!("connection reset")),
            4 => Ok(cumulative(1, &[0, 0, 0])),
            6 => {
                let mut rows = cumulative(1, &[60, 52, 71, 48, 66]);
                rows.push(HistoryEntry::new(400_000_000, 10, 307));
                Ok(rows)
            }
            _ => Ok(Vec::new()),
        }
    }

    fn manager_name(&self, team_id: u32) -> Result<Option<String>> {
        match team_id {
            5 => Err(anyhow!("timeout")),
            _ => Ok(Some(format!("Manager {team_id}"))),
        }
    }
}

fn cumulative(first_week: u32, weekly: &[i64]) -> Vec<HistoryEntry> {
    let mut total = 0;
    weekly
        .iter()
        .enumerate()
        .map(|(i, &pts)| {
            total += pts;
            HistoryEntry::new(first_week + i as u32, pts, total)
        })
        .collect()
}

fn config() -> SeasonConfig {
    SeasonConfig {
        max_participants: 8,
        ..SeasonConfig::with_season_length(39)
    }
}

#[test]
fn steady_scorer_gets_full_season() {
    let cfg = config();
    let p = run_participant(&StubSource, &cfg, 1);
    assert_eq!(p.name, "Manager 1");
    assert_eq!(p.status, SeriesStatus::Forecast);
    assert_eq!(p.observed, vec![0, 60, 112, 183, 231, 297, 356]);
    assert_eq!(p.observed.len() + p.predicted.len(), cfg.season_length);
}

#[test]
fn late_joiner_has_leading_zeros_for_missed_weeks() {
    let p = run_participant(&StubSource, &config(), 2);
    assert_eq!(&p.observed[..4], &[0, 0, 0, 0]);
    assert_eq!(p.observed[4], 40);
}

#[test]
fn failed_retrieval_becomes_zero_series() {
    let cfg = config();
    let p = run_participant(&StubSource, &cfg, 3);
    assert_eq!(p.observed, vec![0; cfg.season_length]);
    assert!(p.predicted.is_empty());
    assert!(matches!(p.status, SeriesStatus::NoData { .. }));

    let unknown = run_participant(&StubSource, &cfg, 999);
    assert_eq!(unknown.observed, vec![0; cfg.season_length]);
    assert!(matches!(unknown.status, SeriesStatus::NoData { .. }));
}

#[test]
fn flat_history_keeps_observed_without_forecast() {
    let p = run_participant(&StubSource, &config(), 4);
    assert_eq!(p.observed, vec![0, 0, 0, 0]);
    assert!(p.predicted.is_empty());
    assert_eq!(p.status, SeriesStatus::FitFailed(FitError::Constant));
}

#[test]
fn name_lookup_failure_falls_back_without_touching_forecast() {
    let cfg = config();
    let named = run_participant(&StubSource, &cfg, 1);
    let unnamed = run_participant(&StubSource, &cfg, 5);
    assert_eq!(unnamed.name, "Player 5");
    assert_eq!(unnamed.observed, named.observed);
    assert_eq!(unnamed.predicted, named.predicted);
}

#[test]
fn run_all_preserves_order_and_isolates_failures() {
    let out = run_all(&StubSource, &config(), &[2, 3, 1]);
    let ids: Vec<u32> = out.iter().map(|p| p.team_id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
    assert_eq!(out[0].status, SeriesStatus::Forecast);
    assert!(matches!(out[1].status, SeriesStatus::NoData { .. }));
    assert_eq!(out[2].status, SeriesStatus::Forecast);
}

#[test]
fn run_all_caps_participants() {
    let cfg = SeasonConfig::default();
    let out = run_all(&StubSource, &cfg, &[1, 2, 4, 5]);
    assert_eq!(out.len(), cfg.max_participants);
}

#[test]
fn weekly_metric_uses_gameweek_points() {
    let cfg = SeasonConfig {
        metric: PointsMetric::Weekly,
        ..config()
    };
    let p = run_participant(&StubSource, &cfg, 1);
    assert_eq!(p.observed, vec![0, 60, 52, 71, 48, 66, 59]);
}

#[test]
fn demo_source_runs_end_to_end() {
    let cfg = config();
    let out = run_all(&DemoSource::new(12), &cfg, &[7, 0, 194]);
    assert_eq!(out[0].observed.len(), 13);
    assert_eq!(out[0].predicted.len(), cfg.season_length - 13);
    assert!(matches!(out[1].status, SeriesStatus::NoData { .. }));
    assert_eq!(out[1].name, "Player 0");
    assert_eq!(out[2].name, "Player 194");
}

#[test]
fn chart_series_pairs_solid_and_dashed_lines() {
    let cfg = config();
    let out = run_all(&StubSource, &cfg, &[1, 3]);
    let series = chart_series(&out, &cfg);
    assert_eq!(series.len(), 4);
    assert_eq!(series[0].label, "Manager 1 - Current");
    assert_eq!(series[0].style, LineStyle::Solid);
    assert_eq!(series[1].label, "Manager 1 - Future");
    assert_eq!(series[1].style, LineStyle::Dashed);
    assert_eq!(series[1].points.first().map(|p| p.0), Some(7.0));
    assert_eq!(series[0].colour, series[1].colour);
    assert_ne!(series[0].colour, series[2].colour);
    assert!(series[3].points.is_empty());

    let bounds = axis_bounds(&cfg);
    assert_eq!(bounds.x, [0.0, 38.0]);
    assert_eq!(bounds.y, [0.0, 2500.0]);
}

#[test]
fn team_ids_parse_from_mixed_separators() {
    assert_eq!(parse_team_ids("12, 34;56 x 78"), vec![12, 34, 56, 78]);
    assert!(parse_team_ids("").is_empty());
}

#[test]
fn out_of_season_rows_do_not_grow_the_series() {
    let cfg = config();
    let p = run_participant(&StubSource, &cfg, 6);
    assert_eq!(p.observed, vec![0, 60, 112, 183, 231, 297]);
    assert_eq!(p.status, SeriesStatus::Forecast);
    assert_eq!(p.observed.len() + p.predicted.len(), cfg.season_length);
}

#[test]
fn chart_colours_follow_input_slots() {
    let cfg = config();
    let out = run_slots(&StubSource, &cfg, &[(1, 1), (2, 3)]);
    assert_eq!(out.iter().map(|p| p.slot).collect::<Vec<_>>(), vec![1, 2]);
    let series = chart_series(&out, &cfg);
    assert_eq!(series[0].colour, cfg.colour(1));
    assert_eq!(series[1].colour, cfg.colour(1));
    assert_eq!(series[2].colour, cfg.colour(2));
    assert_ne!(series[0].colour, cfg.colour(0));

    let positional = run_all(&StubSource, &cfg, &[2, 1]);
    assert_eq!(positional[1].slot, 1);
}
