//! Lumina
//!
//! Terminal monitor for an hourly power-outage schedule.

use anyhow::{Context, Result};
use chrono::Local;
use log::info;

use lumina::config::Config;
use lumina::monitor::{self, Monitor};
use lumina::store::SledStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Lumina");
    println!("{}", "=".repeat(50));

    let now = Local::now();
    println!("Date: {}\n", now.format("%A, %B %d, %Y"));

    let config = Config::from_env()?;
    info!("Using state store at {}", config.db_path.display());

    let store = SledStore::open(&config.db_path)
        .with_context(|| format!("Failed to open state store at {}", config.db_path.display()))?;

    monitor::run(Monitor::new(store), config.tick).await
}
