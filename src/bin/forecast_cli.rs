use anyhow::{Context, Result, anyhow};

use fpl_forecast::config::{PointsMetric, SeasonConfig};
use fpl_forecast::export::status_label;
use fpl_forecast::pipeline::{self, parse_team_ids};
use fpl_forecast::provider::{SourceKind, source_for};

struct Args {
    season: Option<usize>,
    metric: Option<PointsMetric>,
    demo: bool,
    json: bool,
    team_ids: Vec<u32>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = parse_args(std::env::args().skip(1).collect())?;
    if args.team_ids.is_empty() {
        return Err(anyhow!(
            "usage: forecast_cli [--season N] [--metric total|weekly] [--demo] [--json] ID..."
        ));
    }

    let mut config = SeasonConfig::from_env();
    if let Some(season) = args.season {
        config.season_length = season.max(2);
    }
    if let Some(metric) = args.metric {
        config.metric = metric;
    }
    config.max_participants = config.max_participants.max(args.team_ids.len());

    let kind = if args.demo {
        SourceKind::Demo
    } else {
        SourceKind::from_env()
    };
    let source = source_for(kind);
    let participants = pipeline::run_all(source.as_ref(), &config, &args.team_ids);

    if args.json {
        let out = serde_json::to_string_pretty(&participants).context("serialize series")?;
        println!("{out}");
        return Ok(());
    }

    for p in &participants {
        println!("{} ({})", p.name, p.team_id);
        println!("  status:    {}", status_label(&p.status));
        println!("  observed:  {}", join(&p.observed));
        println!("  predicted: {}", join(&p.predicted));
        if let Some(final_points) = p.final_points() {
            println!("  week {}: {final_points}", config.last_week());
        }
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args> {
    let mut out = Args {
        season: None,
        metric: None,
        demo: false,
        json: false,
        team_ids: Vec::new(),
    };
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if let Some(raw) = arg.strip_prefix("--season=") {
            out.season = Some(raw.trim().parse::<usize>().context("invalid --season")?);
        } else if arg == "--season" {
            let raw = iter.next().context("--season needs a value")?;
            out.season = Some(raw.trim().parse::<usize>().context("invalid --season")?);
        } else if let Some(raw) = arg.strip_prefix("--metric=") {
            out.metric = Some(PointsMetric::parse(raw).context("invalid --metric")?);
        } else if arg == "--metric" {
            let raw = iter.next().context("--metric needs a value")?;
            out.metric = Some(PointsMetric::parse(&raw).context("invalid --metric")?);
        } else if arg == "--demo" {
            out.demo = true;
        } else if arg == "--json" {
            out.json = true;
        } else {
            let ids = parse_team_ids(&arg);
            if ids.is_empty() {
                eprintln!("[WARN] ignoring argument {arg:?}");
            }
            out.team_ids.extend(ids);
        }
    }
    Ok(out)
}

fn join<T: ToString>(values: &[T]) -> String {
    if values.is_empty() {
        return "-".to_string();
    }
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
