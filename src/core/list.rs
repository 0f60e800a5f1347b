use crate::db::pool::DbPool;
use crate::db::queries::{load_sessions, load_state, load_states_with_totals};
use crate::errors::{AppError, AppResult};
use crate::utils::colors::{CYAN, GREY, RESET};
use crate::utils::formatting::{bold, describe_progress, or_dash};
use crate::utils::table::{Column, Table};
use crate::utils::time::{secs2readable, to_db_timestamp};

pub struct ListLogic;

impl ListLogic {
    /// Table of every stored puzzle with its recorded session totals.
    pub fn print_puzzles(pool: &mut DbPool) -> AppResult<()> {
        let rows = load_states_with_totals(&pool.conn)?;

        if rows.is_empty() {
            println!("No puzzles stored yet.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("ID", 10),
            Column::new("DATE", 10),
            Column::new("DAY", 9),
            Column::new("TITLE", 30),
            Column::new("PROGRESS", 8),
            Column::new("TIME", 12),
            Column::new("SESSIONS", 8),
        ]);

        for (state, sessions, recorded) in &rows {
            let r = &state.record;
            table.add_row(vec![
                r.puzzle_id.to_string(),
                r.print_date_str(),
                r.day_of_week_name.clone(),
                or_dash(r.title.as_deref()),
                describe_progress(r.solved, r.percent_filled),
                secs2readable(*recorded),
                sessions.to_string(),
            ]);
        }

        print!("{}", table.render());
        println!("\n{} puzzles", rows.len());
        Ok(())
    }

    /// State and session history of a single puzzle.
    pub fn print_puzzle(pool: &mut DbPool, puzzle_id: i64) -> AppResult<()> {
        let state = load_state(&pool.conn, puzzle_id)?.ok_or(AppError::PuzzleNotFound(puzzle_id))?;
        let sessions = load_sessions(&pool.conn, puzzle_id)?;
        let r = &state.record;

        println!("{}", bold(&format!("Puzzle {}", r.puzzle_id)));
        println!("{CYAN}• Title:{RESET}     {}", or_dash(r.title.as_deref()));
        println!("{CYAN}• Author:{RESET}    {}", or_dash(r.author.as_deref()));
        println!("{CYAN}• Editor:{RESET}    {}", or_dash(r.editor.as_deref()));
        println!(
            "{CYAN}• Printed:{RESET}   {} ({}, {} {})",
            r.print_date_str(),
            r.day_of_week_name,
            r.publish_type,
            r.format_type
        );
        println!(
            "{CYAN}• Progress:{RESET}  {}{}",
            describe_progress(r.solved, r.percent_filled),
            r.star
                .as_deref()
                .map(|s| format!(" [{s}]"))
                .unwrap_or_default()
        );
        println!(
            "{CYAN}• Cumulative:{RESET} {}",
            r.solving_seconds
                .map(secs2readable)
                .unwrap_or_else(|| format!("{GREY}unknown{RESET}"))
        );
        println!(
            "{CYAN}• Stored:{RESET}    created {}, updated {}",
            to_db_timestamp(&state.created_at),
            to_db_timestamp(&state.last_updated_at)
        );
        println!();

        if sessions.is_empty() {
            println!("No sessions recorded.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("#", 4),
            Column::new("SESSION DATE", 27),
            Column::new("TIME", 12),
        ]);

        let mut total = 0;
        for (i, s) in sessions.iter().enumerate() {
            total += s.solving_seconds;
            table.add_row(vec![
                (i + 1).to_string(),
                to_db_timestamp(&s.session_date),
                secs2readable(s.solving_seconds),
            ]);
        }

        print!("{}", table.render());
        println!("\nTotal recorded: {}", secs2readable(total));
        Ok(())
    }
}
