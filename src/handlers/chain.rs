//! Handler for the `chain` command.

use super::render::{date_or, schedule_note, status_icon, status_label};
use super::Session;
use anyhow::{bail, Result};
use colored::Colorize;
use taskchain::engine::chain::ChainTimeline;
use taskchain::engine::db::Db;
use taskchain::engine::report::ChainReport;
use taskchain::engine::repo::Store;

/// Shows a chain and every task in it.
///
/// # Errors
/// Returns error if the chain is unknown or its data is broken.
pub fn handle(session: &Session, id: i64, json: bool) -> Result<()> {
    let conn = Db::connect(&session.db)?;
    let store = Store::new(&conn);
    let Some(chain) = store.chains().find_by_id(id)? else {
        bail!("Chain {id} not found");
    };
    let tasks = store.tasks().by_chain(chain.id)?;

    let timeline = ChainTimeline::new(&chain, &store, &session.clock);
    let report = ChainReport::build(&timeline, &tasks)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human(&report);
    Ok(())
}

fn print_human(report: &ChainReport) {
    println!(
        "{} [{}] {}",
        status_icon(report.status),
        report.id.to_string().cyan().bold(),
        report.name
    );
    println!("   Owner:     {}", report.owner);
    println!("   Status:    {}", status_label(report.status));
    println!("   Start:     {}", report.start_date);
    println!("   Deadline:  {}", date_or(report.deadline, "no tasks yet"));
    println!(
        "   Tasks:     {} ({} waiting, {} working, {} done, {} stopped)",
        report.counts.total(),
        report.counts.wait,
        report.counts.work,
        report.counts.done,
        report.counts.stop
    );
    println!();

    for task in &report.tasks {
        println!(
            "   {} {}. {} ({})  {} → {}  {}",
            status_icon(task.status),
            task.order,
            task.task,
            task.worker.dimmed(),
            date_or(task.start_date, "?"),
            task.deadline,
            schedule_note(task)
        );
    }
    for issue in &report.issues {
        println!(
            "   {} {}. [{}]  {}",
            "!".red(),
            issue.order,
            issue.id,
            issue.error.red()
        );
    }
}
