use std::io;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::runtime::Runtime;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("module `{0}` registered more than once")]
    Duplicate(String),
}

/// Something that runs as part of the server process. Starting a module
/// spawns its long-running work on the runtime and returns once it is up.
pub trait Module: Send {
    fn name(&self) -> &str;

    fn start(self: Box<Self>, runtime: Arc<Runtime>) -> BoxFuture<'static, Result<(), LaunchError>>;
}

/// Modules to start, in registration order.
#[derive(Default)]
pub struct Registry {
    modules: Vec<Box<dyn Module>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Box<dyn Module>) {
        self.modules.push(module);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|module| module.name())
    }
}

/// Start every registered module in order. Stops at the first module that
/// fails; modules started before it keep running until the runtime stops.
pub async fn launch(registry: Registry, runtime: Arc<Runtime>) -> Result<(), LaunchError> {
    if let Some(name) = find_duplicate(&registry) {
        tracing::error!(%name, "duplicate module");
        return Err(LaunchError::Duplicate(name));
    }

    for module in registry.modules {
        let name = module.name().to_string();
        tracing::debug!(%name, "starting module");
        if let Err(err) = module.start(runtime.clone()).await {
            tracing::error!(%name, %err, "module failed to start");
            return Err(err);
        }
        tracing::info!(%name, "started module");
    }

    Ok(())
}

fn find_duplicate(registry: &Registry) -> Option<String> {
    let names = registry.names().collect::<Vec<_>>();
    names
        .iter()
        .enumerate()
        .find(|&(index, name)| names[..index].contains(name))
        .map(|(_, name)| name.to_string())
}
