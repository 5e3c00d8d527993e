use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::select;

use crate::net::connection::{Connection, ConnectionOptions};
use crate::net::context::Context;
use crate::runtime::task_manager::TaskContext;
use crate::runtime::Runtime;

/// TCP listener that hands every accepted socket to a fresh context made by
/// `factory`. Runs until the runtime is stopped.
pub struct Server {
    local_addr: SocketAddr,
}

impl Server {
    pub async fn start<A, F, C>(
        addrs: A,
        factory: F,
        options: ConnectionOptions,
        runtime: Arc<Runtime>,
    ) -> io::Result<Self>
    where
        A: ToSocketAddrs,
        F: Fn() -> C + Send + Sync + 'static,
        C: Context + 'static,
    {
        let listener = TcpListener::bind(addrs).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "listening");

        runtime
            .task()
            .spawn({
                let runtime = runtime.clone();
                move |task_context| Self::run(listener, factory, options, runtime, task_context)
            })
            .await;

        Ok(Self { local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    async fn run<F, C>(
        listener: TcpListener,
        factory: F,
        options: ConnectionOptions,
        runtime: Arc<Runtime>,
        mut task_context: TaskContext,
    ) where
        F: Fn() -> C + Send + Sync + 'static,
        C: Context + 'static,
    {
        loop {
            select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            tracing::trace!(%addr, "accepted client");
                            let context = factory();
                            let options = options.clone();
                            runtime
                                .task()
                                .spawn(move |task_context| {
                                    Connection::run(stream, context, options, task_context)
                                })
                                .await;
                        },
                        Err(err) => {
                            tracing::error!(%err, "failed to accept connection");
                        },
                    }
                },
                _ = task_context.wait_for_stop() => {
                    tracing::trace!("server stopping");
                    break;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::net::connection::ConnectionOptions;
    use crate::net::context::BasicContext;
    use crate::runtime::Runtime;

    use super::Server;

    #[tokio::test]
    async fn context_per_connection() {
        let runtime = Arc::new(Runtime::new());
        let created = Arc::new(AtomicUsize::new(0));
        let server = Server::start(
            "127.0.0.1:0",
            {
                let created = created.clone();
                move || {
                    created.fetch_add(1, Ordering::SeqCst);
                    BasicContext::new()
                }
            },
            ConnectionOptions::default(),
            runtime.clone(),
        )
        .await
        .unwrap();

        for _ in 0..2 {
            let mut client = TcpStream::connect(server.local_addr()).await.unwrap();
            client.write_all(b"ignored").await.unwrap();
            client.shutdown().await.unwrap();
            // The connection ends once it sees end of stream.
            let mut received = Vec::new();
            client.read_to_end(&mut received).await.unwrap();
            assert!(received.is_empty());
        }

        assert_eq!(created.load(Ordering::SeqCst), 2);
        runtime.stop().await;
    }
}
