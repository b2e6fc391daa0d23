use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Instant;

use chrono::Local;

use crate::config::SeasonConfig;
use crate::demo_feed::DemoSource;
use crate::export;
use crate::pipeline::{self, FplSource, HistorySource};
use crate::state::{Delta, ProviderCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Fpl,
    Demo,
}

impl SourceKind {
    pub fn from_env() -> Self {
        match env::var("FPL_SOURCE")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "demo" | "offline" => Self::Demo,
            _ => Self::Fpl,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fpl => "FPL API",
            Self::Demo => "DEMO",
        }
    }
}

pub fn source_for(kind: SourceKind) -> Box<dyn HistorySource + Send> {
    match kind {
        SourceKind::Fpl => Box::new(FplSource),
        SourceKind::Demo => Box::new(DemoSource::default()),
    }
}

/// Worker thread: runs Generate and Export commands off the UI thread and
/// reports back through `tx`. Exits when the command channel closes.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    config: SeasonConfig,
    kind: SourceKind,
) {
    thread::spawn(move || {
        let source = source_for(kind);
        let pool = build_fetch_pool();

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Generate { requests } => {
                    let started = Instant::now();
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] {} Generating for {} team(s) from {}",
                        stamp(),
                        requests.len(),
                        kind.label()
                    )));
                    let participants = with_fetch_pool(&pool, || {
                        pipeline::run_slots(source.as_ref(), &config, &requests)
                    });
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Done in {} ms",
                        started.elapsed().as_millis()
                    )));
                    let _ = tx.send(Delta::SetParticipants(participants));
                }
                ProviderCommand::Export { path, participants } => {
                    match export::export_series(&path, &participants) {
                        Ok(report) => {
                            let _ = tx.send(Delta::Log(format!(
                                "[INFO] Exported {} participant(s), {} rows to {}",
                                report.participants,
                                report.rows,
                                path.display()
                            )));
                        }
                        Err(err) => {
                            let _ = tx.send(Delta::Log(format!("[WARN] Export failed: {err:#}")));
                        }
                    }
                }
            }
        }
    });
}

fn stamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    let threads = fetch_parallelism();
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .ok()
}

fn with_fetch_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(3)
        .clamp(1, 16)
}
