use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::list::ListLogic;
use crate::db::initialize::open_ready;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { puzzle } = cmd {
        let mut pool = open_ready(&cfg.database)?;

        match puzzle {
            Some(id) => ListLogic::print_puzzle(&mut pool, *id)?,
            None => ListLogic::print_puzzles(&mut pool)?,
        }
    }

    Ok(())
}
