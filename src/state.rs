use std::collections::VecDeque;
use std::path::PathBuf;

use crate::config::SeasonConfig;
use crate::pipeline::{ParticipantSeries, SeriesStatus};

const MAX_ID_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input(usize),
    Generate,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: SeasonConfig,
    /// Raw text of each team-id slot.
    pub inputs: Vec<String>,
    pub focus: Focus,
    pub participants: Vec<ParticipantSeries>,
    pub pending: bool,
    pub status_line: String,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(config: SeasonConfig) -> Self {
        let slots = config.max_participants;
        Self {
            config,
            inputs: vec![String::new(); slots],
            focus: Focus::Input(0),
            participants: Vec::new(),
            pending: false,
            status_line: "Enter your Team ID(s) and press Generate".to_string(),
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Input(i) if i + 1 < self.inputs.len() => Focus::Input(i + 1),
            Focus::Input(_) => Focus::Generate,
            Focus::Generate => Focus::Input(0),
        };
    }

    pub fn focus_prev(&mut self) {
        let last = self.inputs.len().saturating_sub(1);
        self.focus = match self.focus {
            Focus::Input(0) => Focus::Generate,
            Focus::Input(i) => Focus::Input(i - 1),
            Focus::Generate => Focus::Input(last),
        };
    }

    /// Appends a digit to the focused slot; other characters are ignored.
    pub fn push_char(&mut self, c: char) {
        let Focus::Input(idx) = self.focus else {
            return;
        };
        if !c.is_ascii_digit() {
            return;
        }
        if let Some(slot) = self.inputs.get_mut(idx)
            && slot.len() < MAX_ID_DIGITS
        {
            slot.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Focus::Input(idx) = self.focus
            && let Some(slot) = self.inputs.get_mut(idx)
        {
            slot.pop();
        }
    }

    pub fn clear_inputs(&mut self) {
        for slot in &mut self.inputs {
            slot.clear();
        }
        self.focus = Focus::Input(0);
    }

    /// `(slot, team_id)` for every slot holding a valid id, in slot order.
    pub fn requested_slots(&self) -> Vec<(usize, u32)> {
        self.inputs
            .iter()
            .enumerate()
            .filter_map(|(slot, raw)| raw.trim().parse::<u32>().ok().map(|id| (slot, id)))
            .collect()
    }

    pub fn requested_ids(&self) -> Vec<u32> {
        self.requested_slots().into_iter().map(|(_, id)| id).collect()
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetParticipants(Vec<ParticipantSeries>),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Generate { requests: Vec<(usize, u32)> },
    Export { path: PathBuf, participants: Vec<ParticipantSeries> },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetParticipants(participants) => {
            for p in &participants {
                let line = match &p.status {
                    SeriesStatus::Forecast => format!(
                        "[INFO] {} ({}): {} weeks observed, {} forecast",
                        p.name,
                        p.team_id,
                        p.observed.len(),
                        p.predicted.len()
                    ),
                    SeriesStatus::SeasonComplete => {
                        format!("[INFO] {} ({}): season complete", p.name, p.team_id)
                    }
                    SeriesStatus::NoData { reason } => {
                        format!("[WARN] {} ({}): no data ({reason})", p.name, p.team_id)
                    }
                    SeriesStatus::FitFailed(err) => {
                        format!("[WARN] {} ({}): no forecast ({err})", p.name, p.team_id)
                    }
                };
                state.push_log(line);
            }
            state.status_line = summary_line(&participants);
            state.participants = participants;
            state.pending = false;
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn summary_line(participants: &[ParticipantSeries]) -> String {
    if participants.is_empty() {
        return "Enter your Team ID(s) and press Generate".to_string();
    }
    participants
        .iter()
        .map(|p| match p.final_points() {
            Some(pts) if p.has_forecast() => format!("{}: ~{pts}", p.name),
            Some(pts) => format!("{}: {pts}", p.name),
            None => format!("{}: -", p.name),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
