use std::fs;

use fpl_forecast::config::SeasonConfig;
use fpl_forecast::export::export_series;
use fpl_forecast::forecast::FitError;
use fpl_forecast::pipeline::{ParticipantSeries, SeriesStatus};
use fpl_forecast::state::{AppState, Delta, Focus, apply_delta};

fn participant(team_id: u32, status: SeriesStatus, predicted: Vec<i64>) -> ParticipantSeries {
    ParticipantSeries {
        slot: 0,
        team_id,
        name: format!("Manager {team_id}"),
        observed: vec![0, 55, 120],
        predicted,
        status,
    }
}

#[test]
fn inputs_accept_only_digits_in_focused_slot() {
    let mut state = AppState::new(SeasonConfig::default());
    for c in "12a3".chars() {
        state.push_char(c);
    }
    state.focus_next();
    state.push_char('9');
    state.backspace();
    state.push_char('4');
    assert_eq!(state.inputs, vec!["123".to_string(), "4".to_string(), String::new()]);
    assert_eq!(state.requested_ids(), vec![123, 4]);
}

#[test]
fn blank_slots_keep_their_positions() {
    let mut state = AppState::new(SeasonConfig::default());
    state.focus_next();
    for c in "123".chars() {
        state.push_char(c);
    }
    assert_eq!(state.inputs, vec![String::new(), "123".to_string(), String::new()]);
    assert_eq!(state.requested_slots(), vec![(1, 123)]);
    assert_eq!(state.requested_ids(), vec![123]);
}

#[test]
fn focus_cycles_through_slots_and_button() {
    let mut state = AppState::new(SeasonConfig::default());
    state.focus_next();
    state.focus_next();
    state.focus_next();
    assert_eq!(state.focus, Focus::Generate);
    state.push_char('1');
    assert!(state.requested_ids().is_empty());
    state.focus_next();
    assert_eq!(state.focus, Focus::Input(0));
    state.focus_prev();
    assert_eq!(state.focus, Focus::Generate);
    state.focus_prev();
    assert_eq!(state.focus, Focus::Input(2));
}

#[test]
fn set_participants_replaces_chart_and_logs_outcomes() {
    let mut state = AppState::new(SeasonConfig::default());
    state.pending = true;
    apply_delta(
        &mut state,
        Delta::SetParticipants(vec![
            participant(1, SeriesStatus::Forecast, vec![180, 240]),
            participant(
                2,
                SeriesStatus::NoData {
                    reason: "no history".to_string(),
                },
                Vec::new(),
            ),
            participant(3, SeriesStatus::FitFailed(FitError::Constant), Vec::new()),
        ]),
    );
    assert!(!state.pending);
    assert_eq!(state.participants.len(), 3);
    assert_eq!(state.logs.len(), 3);
    assert!(state.logs[0].starts_with("[INFO]"));
    assert!(state.logs[1].contains("no data"));
    assert!(state.logs[2].starts_with("[WARN]"));
    assert!(state.status_line.contains("Manager 1: ~240"));
    assert!(state.status_line.contains("Manager 3: 120"));
}

#[test]
fn log_ring_is_bounded() {
    let mut state = AppState::new(SeasonConfig::default());
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
}

#[test]
fn export_writes_workbook() {
    let path = std::env::temp_dir().join(format!("fpl_forecast_test_{}.xlsx", std::process::id()));
    let rows = vec![
        participant(1, SeriesStatus::Forecast, vec![180, 240]),
        participant(2, SeriesStatus::SeasonComplete, Vec::new()),
    ];
    let report = export_series(&path, &rows).expect("export should succeed");
    assert_eq!(report.participants, 2);
    assert_eq!(report.rows, 3 + 2 + 3);
    assert!(fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false));
    let _ = fs::remove_file(&path);
}
