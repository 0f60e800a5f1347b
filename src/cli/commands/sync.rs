use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::normalize::Normalizer;
use crate::core::sync::{SyncLogic, SyncOptions};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::input::{InputFormat, load_records};
use crate::ui::messages::info;
use std::path::Path;

/// Reconcile a file of puzzle records into the database.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sync {
        file,
        format,
        dry_run,
        verbose,
    } = cmd
    {
        //
        // 1. Read the batch (fatal on failure: nothing has been touched yet)
        //
        let path = Path::new(file);
        let format = match format {
            Some(f) => *f,
            None => InputFormat::from_path(path)?,
        };
        let records = load_records(path, Some(format))?;
        info(format!(
            "Found {} records in {} ({})",
            records.len(),
            file,
            format.as_str()
        ));

        //
        // 2. Open DB
        //
        let mut pool = DbPool::new(&cfg.database)?;

        //
        // 3. Execute logic
        //
        let normalizer = Normalizer::new(cfg.missing_markers.clone());
        let opts = SyncOptions {
            commit_mode: cfg.commit_mode,
            dry_run: *dry_run,
            verbose: *verbose,
        };

        SyncLogic::apply(&mut pool, &records, &normalizer, &opts)?;
    }

    Ok(())
}
