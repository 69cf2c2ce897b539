//! Shared terminal rendering helpers.

use chrono::NaiveDate;
use colored::{ColoredString, Colorize};
use taskchain::engine::report::TaskReport;
use taskchain::engine::types::ActualStatus;

pub fn status_icon(status: ActualStatus) -> ColoredString {
    match status {
        ActualStatus::Wait => "○".dimmed(),
        ActualStatus::Work => "▶".yellow(),
        ActualStatus::Done => "✓".green(),
        ActualStatus::Stop => "■".red(),
    }
}

pub fn status_label(status: ActualStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        ActualStatus::Wait => label.dimmed(),
        ActualStatus::Work => label.yellow(),
        ActualStatus::Done => label.green(),
        ActualStatus::Stop => label.red(),
    }
}

pub fn date_or(date: Option<NaiveDate>, missing: &str) -> String {
    date.map_or_else(|| missing.to_string(), |d| d.to_string())
}

pub fn days(n: i64) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}

/// One-line schedule summary for list views.
pub fn schedule_note(report: &TaskReport) -> ColoredString {
    match report.status {
        ActualStatus::Wait => match report.days_to_start {
            Some(n) => format!("starts in {}", days(n)).dimmed(),
            None => "start unpredictable".yellow(),
        },
        ActualStatus::Work => match (report.remaining_days, report.days_after_deadline) {
            (_, Some(late)) => format!("overdue by {}", days(late)).red(),
            (Some(left), None) => format!("{} left", days(left)).normal(),
            (None, None) => "due".normal(),
        },
        ActualStatus::Done => match report.days_after_deadline {
            Some(late) => format!("finished {} late", days(late)).yellow(),
            None => "finished in time".green(),
        },
        ActualStatus::Stop => "stopped".red(),
    }
}
