//! Handler for the `task` command.

use super::render::{date_or, days, status_icon, status_label};
use super::Session;
use anyhow::{bail, Result};
use colored::Colorize;
use taskchain::engine::db::Db;
use taskchain::engine::report::TaskReport;
use taskchain::engine::repo::Store;
use taskchain::engine::sequence::SequenceAccessor;
use taskchain::engine::task::TaskTimeline;
use taskchain::engine::types::{ActualStatus, Chain, StoredStatus, Task};

/// Explains the derived status and schedule of a single task.
///
/// # Errors
/// Returns error if the task is unknown or its chain data is broken.
pub fn handle(session: &Session, id: i64, json: bool) -> Result<()> {
    let conn = Db::connect(&session.db)?;
    let store = Store::new(&conn);
    let Some(task) = store.tasks().find_by_id(id)? else {
        bail!("Task {id} not found");
    };

    let timeline = TaskTimeline::new(&task, &store, &session.clock)?;
    let report = TaskReport::build(&timeline)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let predecessor = if task.is_first() {
        None
    } else {
        Some(store.predecessor(&task)?)
    };
    print_human(&task, timeline.chain(), predecessor.as_ref(), &report);
    Ok(())
}

fn print_human(task: &Task, chain: &Chain, prev: Option<&Task>, report: &TaskReport) {
    println!(
        "{} [{}] {}",
        status_icon(report.status),
        task.id.to_string().cyan().bold(),
        task.task
    );
    println!("   Chain:     {} (#{} of chain {})", chain.name, task.order, chain.id);
    println!("   Worker:    {}", task.worker);
    println!(
        "   Status:    {} ({})",
        status_label(report.status),
        report.status.color_hint().dimmed()
    );
    println!("   Deadline:  {}", task.deadline);
    println!("   Start:     {}", date_or(report.start_date, "unpredictable"));
    if let Some(finish) = task.finish_date {
        println!("   Finished:  {finish}");
    }
    println!("   Allotted:  {}", days(report.duration));
    println!();

    print_explanation(task, chain, prev, report.status);
    print_metrics(report);
}

fn print_explanation(task: &Task, chain: &Chain, prev: Option<&Task>, status: ActualStatus) {
    match (status, prev) {
        (ActualStatus::Done | ActualStatus::Stop, _) => {
            println!("{} Marked {} explicitly.", "reason:".blue(), task.status);
        }
        (ActualStatus::Wait, None) => {
            println!(
                "{} The chain starts on {}.",
                "reason:".yellow(),
                chain.start_date
            );
        }
        (ActualStatus::Work, None) => {
            println!(
                "{} First task; the chain started on {}.",
                "reason:".green(),
                chain.start_date
            );
        }
        (ActualStatus::Wait, Some(p)) => explain_waiting_on(p),
        (ActualStatus::Work, Some(p)) => {
            println!(
                "{} [{}] {} was delivered on {}.",
                "reason:".green(),
                p.id,
                p.task,
                date_or(p.finish_date, "?")
            );
        }
    }
}

fn explain_waiting_on(prev: &Task) {
    println!(
        "{} Waiting for [{}] {} ({}, stored {}).",
        "reason:".yellow(),
        prev.id,
        prev.task,
        prev.worker,
        prev.status
    );
    if prev.status == StoredStatus::Stop {
        println!("         The previous task was stopped; this one cannot start.");
    }
}

fn print_metrics(report: &TaskReport) {
    println!();
    println!("{}", "Schedule:".dimmed().underline());
    if let Some(n) = report.days_to_start {
        println!("   Days to start:    {n}");
    }
    if let Some(n) = report.remaining_days {
        println!("   Days remaining:   {n}");
    }
    if let Some(n) = report.days_after_deadline {
        println!("   Days overdue:     {}", n.to_string().red());
    }
    match report.expended_days {
        Some(n) => println!("   Days expended:    {n}"),
        None => println!("   Days expended:    {}", "n/a".dimmed()),
    }
    let verdict = if report.in_time {
        "in time".green()
    } else {
        "late".red()
    };
    println!("   Verdict:          {verdict}");
}
