use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::initialize::missing_tables;
use crate::db::integrity::{Violation, check_session_accounting};
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::colors::{CYAN, GREEN, RED, RESET};
use rusqlite::Connection;

/// Database maintenance: migrations, consistency checks, statistics, VACUUM.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum,
        info,
    } = cmd
    {
        if !(*migrate || *check || *vacuum || *info) {
            warning("Nothing to do: use --migrate, --check, --vacuum or --info");
            return Ok(());
        }

        let mut pool = DbPool::new(&cfg.database)?;

        //
        // 1) MIGRATE
        //
        if *migrate {
            println!("{}▶ Running migrations…{}", CYAN, RESET);
            run_pending_migrations(&pool.conn)?;
            println!("{}✔ Migration completed.{}\n", GREEN, RESET);
        }

        //
        // 2) CHECK
        //
        if *check {
            check_database(&pool.conn)?;
        }

        //
        // 3) INFO
        //
        if *info {
            stats::print_db_info(&mut pool, &cfg.database)?;
        }

        //
        // 4) VACUUM
        //
        if *vacuum {
            println!("{}▶ Running VACUUM…{}", CYAN, RESET);
            pool.conn.execute_batch("VACUUM;")?;
            println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
        }
    }

    Ok(())
}

/// SQLite integrity, schema presence, then session accounting.
fn check_database(conn: &Connection) -> AppResult<()> {
    println!("{}▶ Running integrity check…{}", CYAN, RESET);

    let integrity: String = conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
    if integrity == "ok" {
        println!("{}✔ Integrity check passed.{}", GREEN, RESET);
    } else {
        println!("{}✘ Integrity check failed:{} {}", RED, RESET, integrity);
    }

    let missing = missing_tables(conn)?;
    if !missing.is_empty() {
        warning(format!(
            "Missing tables: {} (run `puzzlesync db --migrate`)",
            missing.join(", ")
        ));
        return Ok(());
    }

    println!("{}▶ Checking session accounting…{}", CYAN, RESET);

    let violations = check_session_accounting(conn)?;
    if violations.is_empty() {
        success("Session accounting consistent.");
    } else {
        for v in &violations {
            println!("{}✘{} {}", RED, RESET, v);
        }
        warning(format!(
            "{} accounting issue(s), puzzle ids: {}",
            violations.len(),
            puzzle_ids(&violations)
        ));
    }
    println!();

    Ok(())
}

fn puzzle_ids(violations: &[Violation]) -> String {
    let mut ids: Vec<i64> = violations.iter().map(Violation::puzzle_id).collect();
    ids.dedup();
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
