use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use crate::utils::time::secs2readable;
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) PUZZLES / SOLVED
    //
    let (puzzles, solved): (i64, i64) = pool.conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(solved), 0) FROM crossword_stats",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    println!(
        "{}• Puzzles:{} {}{}{} ({} solved)",
        CYAN, RESET, GREEN, puzzles, RESET, solved
    );

    //
    // 3) SESSIONS
    //
    let (sessions, seconds): (i64, i64) = pool.conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(solving_seconds), 0) FROM puzzle_sessions",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    println!(
        "{}• Sessions:{} {}{}{} ({} recorded)",
        CYAN,
        RESET,
        GREEN,
        sessions,
        RESET,
        secs2readable(seconds)
    );

    //
    // 4) PRINT DATE RANGE
    //
    let range: Option<(Option<String>, Option<String>)> = pool
        .conn
        .query_row(
            "SELECT MIN(print_date), MAX(print_date) FROM crossword_stats",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (first, last) = range.unwrap_or((None, None));
    let fmt_first = first.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Print dates:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 5) AVERAGE SESSION
    //
    if sessions > 0 {
        println!(
            "{}• Average session:{} {}",
            CYAN,
            RESET,
            secs2readable(seconds / sessions)
        );
    }

    println!();
    Ok(())
}
