//! Handler for the `tasks` and `archive` commands.

use super::render::{schedule_note, status_icon, status_label};
use super::Session;
use anyhow::Result;
use colored::Colorize;
use taskchain::engine::db::Db;
use taskchain::engine::report::{report_tasks, TaskRow};
use taskchain::engine::repo::Store;

/// Lists a worker's tasks with their derived status.
///
/// # Errors
/// Returns error if the database query fails.
pub fn handle(session: &Session, worker: &str, archived: bool, json: bool) -> Result<()> {
    let conn = Db::connect(&session.db)?;
    let store = Store::new(&conn);
    let tasks = if archived {
        store.tasks().archived_by_worker(worker)?
    } else {
        store.tasks().actual_by_worker(worker)?
    };
    let rows = report_tasks(&tasks, &store, &session.clock);

    if json {
        return print_json(&rows);
    }

    print_human(&rows, worker, archived);
    Ok(())
}

fn print_json(rows: &[TaskRow<'_>]) -> Result<()> {
    let output: Vec<_> = rows
        .iter()
        .map(|row| match &row.report {
            Ok(report) => serde_json::to_value(report),
            Err(e) => Ok(serde_json::json!({
                "id": row.task.id,
                "error": e.to_string(),
            })),
        })
        .collect::<Result<_, _>>()?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_human(rows: &[TaskRow<'_>], worker: &str, archived: bool) {
    let title = if archived { "Task archive" } else { "Tasks" };
    println!("{} {} of {}:", "📋".cyan(), title, worker.bold());

    if rows.is_empty() {
        println!("   (nothing here)");
        return;
    }

    for row in rows {
        let task = row.task;
        match &row.report {
            Ok(report) => println!(
                "   {} [{}] {}  due {}  {}  {}",
                status_icon(report.status),
                task.id.to_string().yellow(),
                task.task,
                task.deadline,
                status_label(report.status),
                schedule_note(report)
            ),
            Err(e) => println!(
                "   {} [{}] {}  {}",
                "!".red(),
                task.id.to_string().yellow(),
                task.task,
                e.to_string().red()
            ),
        }
    }
}
