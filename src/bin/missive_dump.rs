use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use missive::config::DEFAULT_BATCH_SIZE;
use missive::import::load_csv;
use missive::MessageStore;

#[derive(Parser)]
#[command(name = "missive-dump")]
#[command(about = "Load messages from CSV and print them newest first")]
struct Cli {
    /// CSV file containing message data
    #[arg(long, default_value = "./data.csv")]
    data: PathBuf,

    /// Maximum messages per transaction while loading
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = MessageStore::new();
    load_csv(&store, &cli.data, cli.batch_size)?;

    for message in store.fetch_anti_chrono() {
        println!("message from {} at {}", message.name, message.timestamp()?);
    }
    Ok(())
}
