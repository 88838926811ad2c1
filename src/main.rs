mod config;
mod db;
mod export;
mod import;
mod models;
mod org;
mod run;
mod ui;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;
    config::init_tracing(&config)?;
    let mut db = db::Database::open(&config.db_path)?;

    match args.len() {
        1 => run::as_tui(&mut db),
        2.. => run::as_cli(&args, &mut db),
        _ => {
            eprintln!("Usage: budgettier [command]");
            Ok(())
        }
    }
}
