//! Handler for the `chains` and `chain-archive` commands.

use super::render::{date_or, status_icon, status_label};
use super::Session;
use anyhow::Result;
use colored::Colorize;
use taskchain::engine::db::Db;
use taskchain::engine::error::EngineError;
use taskchain::engine::report::{report_chains, ChainReport};
use taskchain::engine::repo::Store;
use taskchain::engine::types::Chain;

type ChainRow<'c> = (&'c Chain, Result<ChainReport, EngineError>);

/// Lists an owner's chains with their derived status.
///
/// # Errors
/// Returns error if the database query fails.
pub fn handle(session: &Session, owner: &str, archived: bool, json: bool) -> Result<()> {
    let conn = Db::connect(&session.db)?;
    let store = Store::new(&conn);
    let chains = if archived {
        store.chains().archived_by_owner(owner)?
    } else {
        store.chains().actual_by_owner(owner)?
    };
    let rows = report_chains(&chains, &store, &session.clock);

    if json {
        return print_json(&rows);
    }

    print_human(&rows, owner, archived);
    Ok(())
}

fn print_json(rows: &[ChainRow<'_>]) -> Result<()> {
    let output: Vec<_> = rows
        .iter()
        .map(|(chain, report)| match report {
            Ok(report) => serde_json::to_value(report),
            Err(e) => Ok(serde_json::json!({
                "id": chain.id,
                "name": chain.name,
                "error": e.to_string(),
            })),
        })
        .collect::<Result<_, _>>()?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_human(rows: &[ChainRow<'_>], owner: &str, archived: bool) {
    let title = if archived { "Chain archive" } else { "Chains" };
    println!("{} {} of {}:", "🔗".cyan(), title, owner.bold());

    if rows.is_empty() {
        println!("   (nothing here)");
        return;
    }

    for (chain, report) in rows {
        match report {
            Ok(report) => println!(
                "   {} [{}] {}  {} → {}  {}  {}",
                status_icon(report.status),
                chain.id.to_string().yellow(),
                chain.name,
                chain.start_date,
                date_or(report.deadline, "?"),
                status_label(report.status),
                format!("priority {}", chain.priority).dimmed()
            ),
            Err(e) => println!(
                "   {} [{}] {}  {}",
                "!".red(),
                chain.id.to_string().yellow(),
                chain.name,
                e.to_string().red()
            ),
        }
    }
}
