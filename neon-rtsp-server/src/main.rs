mod app;
mod module;
mod net;
mod runtime;
mod session;

use std::env::args;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use app::config::AppConfig;
use app::RtspApp;
use module::{launch, Registry};
use runtime::Runtime;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("LOG"))
        .init();

    let config = match args().nth(1) {
        Some(config_file) => AppConfig::from_file(Path::new(&config_file))?,
        None => {
            tracing::info!("no config file given, using defaults");
            AppConfig::default()
        }
    };
    tracing::debug!(?config, "read config");

    let runtime = Arc::new(Runtime::new());

    let mut registry = Registry::new();
    registry.register(Box::new(RtspApp::new(config)));

    if let Err(err) = launch(registry, runtime.clone()).await {
        runtime.stop().await;
        return Err(err.into());
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("stopping");
    runtime.stop().await;

    Ok(())
}
