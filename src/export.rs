use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::pipeline::{ParticipantSeries, SeriesStatus};

pub struct ExportReport {
    pub participants: usize,
    pub rows: usize,
}

/// Writes a "Series" sheet (one row per week and participant) and a
/// "Summary" sheet (one row per participant).
pub fn export_series(path: &Path, participants: &[ParticipantSeries]) -> Result<ExportReport> {
    let mut series_rows = vec![vec![
        "Team ID".to_string(),
        "Name".to_string(),
        "Week".to_string(),
        "Points".to_string(),
        "Kind".to_string(),
    ]];
    let mut summary_rows = vec![vec![
        "Team ID".to_string(),
        "Name".to_string(),
        "Status".to_string(),
        "Observed Weeks".to_string(),
        "Forecast Weeks".to_string(),
        "Final Points".to_string(),
    ]];

    for p in participants {
        for (week, pts) in p.observed.iter().enumerate() {
            series_rows.push(vec![
                p.team_id.to_string(),
                p.name.clone(),
                week.to_string(),
                pts.to_string(),
                "Observed".to_string(),
            ]);
        }
        for (i, pts) in p.predicted.iter().enumerate() {
            series_rows.push(vec![
                p.team_id.to_string(),
                p.name.clone(),
                (p.observed.len() + i).to_string(),
                pts.to_string(),
                "Forecast".to_string(),
            ]);
        }
        summary_rows.push(vec![
            p.team_id.to_string(),
            p.name.clone(),
            status_label(&p.status),
            p.observed.len().to_string(),
            p.predicted.len().to_string(),
            p.final_points()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Series")?;
        write_rows(sheet, &series_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        participants: participants.len(),
        rows: series_rows.len().saturating_sub(1),
    })
}

pub fn status_label(status: &SeriesStatus) -> String {
    match status {
        SeriesStatus::Forecast => "forecast".to_string(),
        SeriesStatus::SeasonComplete => "season complete".to_string(),
        SeriesStatus::NoData { reason } => format!("no data: {reason}"),
        SeriesStatus::FitFailed(err) => format!("fit failed: {err}"),
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            match value.parse::<i64>() {
                Ok(num) if row_idx > 0 => {
                    worksheet
                        .write_number(row_idx as u32, col_idx as u16, num as f64)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
                _ => {
                    worksheet
                        .write_string(row_idx as u32, col_idx as u16, value)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
            }
        }
    }
    Ok(())
}
