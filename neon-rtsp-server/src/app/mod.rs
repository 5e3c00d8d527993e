pub mod config;
pub mod handler;
pub mod session;

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::app::config::AppConfig;
use crate::app::handler::AppHandler;
use crate::module::{LaunchError, Module};
use crate::net::server::Server;
use crate::runtime::Runtime;
use crate::session::Session;

/// The RTSP server as a module: one listener, one [`AppHandler`] per
/// connection.
pub struct RtspApp {
    config: AppConfig,
}

impl RtspApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn serve(config: AppConfig, runtime: Arc<Runtime>) -> Result<Server, LaunchError> {
        let streams = Arc::new(config.streams);
        for stream in streams.iter() {
            tracing::info!(%stream, "registered stream");
        }

        let malformed = config.server.malformed;
        let options = config.server.connection_options();
        let addr = (config.server.host, config.server.port);
        let server = Server::start(
            addr.clone(),
            move || Session::new(AppHandler::new(streams.clone()), malformed),
            options,
            runtime,
        )
        .await
        .map_err(|source| LaunchError::Bind {
            addr: format!("{}:{}", addr.0, addr.1),
            source,
        })?;

        Ok(server)
    }
}

impl Module for RtspApp {
    fn name(&self) -> &str {
        "rtsp"
    }

    fn start(self: Box<Self>, runtime: Arc<Runtime>) -> BoxFuture<'static, Result<(), LaunchError>> {
        async move {
            Self::serve(self.config, runtime).await?;
            Ok(())
        }
        .boxed()
    }
}
