//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load configuration, open the laundry database and run start-up cleanup.
//! - Print a deterministic table summary for quick local sanity checks.
//!
//! The interactive menu lives outside this crate.

use laundry_core::db::open_db;
use laundry_core::{core_version, LaundryConfig, LaundrySystem};
use log::error;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("laundry: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = LaundryConfig::from_env()?;
    config.init_logging()?;

    let conn = open_db(&config.db_path)?;
    let system = LaundrySystem::open(&conn)?;

    println!("laundry_core version={}", core_version());
    println!("db_path={}", config.db_path.display());
    println!("clients={}", system.clients()?.len());
    println!("admins={}", system.admins()?.len());
    println!("applications={}", system.applications()?.len());
    println!("pollution_statuses={}", system.pollution_statuses()?.len());
    println!("application_statuses={}", system.application_statuses()?.len());
    Ok(())
}
