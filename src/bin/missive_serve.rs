use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use missive::http::{self, AppState};
use missive::import::load_csv;
use missive::{MessageStore, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "missive-serve")]
#[command(about = "Serve the in-memory message store over HTTP")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(long)]
    bind: Option<String>,

    /// CSV file to load before serving
    #[arg(long)]
    data: Option<PathBuf>,

    /// Messages per transaction when loading CSV data
    #[arg(long)]
    batch_size: Option<usize>,

    /// Basic-auth user for the private endpoints
    #[arg(long)]
    admin_user: Option<String>,

    /// Basic-auth password for the private endpoints
    #[arg(long)]
    admin_password: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(data) = self.data {
            config.data_path = Some(data);
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(user) = self.admin_user {
            config.admin_user = user;
        }
        if let Some(password) = self.admin_password {
            config.admin_password = password;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let config = Cli::parse().into_config()?;

    let store = Arc::new(MessageStore::new());
    if let Some(path) = &config.data_path {
        let stats = load_csv(&store, path, config.batch_size)?;
        info!(
            "loaded rows={} batches={} min_time={:?} max_time={:?}",
            stats.rows, stats.batches, stats.min_time, stats.max_time
        );
    }

    let addr: SocketAddr = config.bind.parse().context("parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("listening on http://{}", listener.local_addr()?);

    let state = AppState::from_config(store, &config);
    http::serve(listener, state, shutdown_signal())
        .await
        .context("server shutdown")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}
