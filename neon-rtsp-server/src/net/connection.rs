use std::time::Duration;

use bytes::{Buf, BytesMut};
use futures::SinkExt;

use tokio::io::AsyncReadExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::mpsc;
use tokio_util::codec::{BytesCodec, FramedWrite};

use crate::net::context::{ConnectionHandle, Context, ContextError, Network, WriterRx};
use crate::runtime::task_manager::TaskContext;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("buffered {size} bytes without a complete request (limit {limit})")]
    RequestTooLarge { size: usize, limit: usize },
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Maximum number of bytes buffered while waiting for a request to
    /// complete.
    pub max_request_size: usize,
    /// How long queued responses may take to drain once the connection is
    /// closing. The writer is aborted after that.
    pub flush_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            max_request_size: 64 * 1024,
            flush_timeout: Duration::from_secs(5),
        }
    }
}

pub struct Connection;

impl Connection {
    /// Drive one accepted socket until the peer disconnects, the context
    /// fails, or the runtime stops.
    ///
    /// The context is attached for the lifetime of the connection and is
    /// closed exactly once on the way out. Writes go through a separate
    /// writer task, which exits after the context has detached and every
    /// queued write has been flushed, or is aborted when flushing takes
    /// longer than [`ConnectionOptions::flush_timeout`].
    pub async fn run<C: Context>(
        stream: TcpStream,
        mut context: C,
        options: ConnectionOptions,
        mut task_context: TaskContext,
    ) {
        let local_addr = stream.local_addr().ok();
        let remote_addr = stream.peer_addr().ok();
        let (read, write) = stream.into_split();

        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        context.attach(
            ConnectionHandle::new(writer_tx, Network::Tcp)
                .with_local_addr(local_addr)
                .with_remote_addr(remote_addr),
        );
        let remote = context.remote_addr();
        tracing::trace!(%remote, "connection attached");

        let mut writer = tokio::spawn(Self::run_writer(write, writer_rx));

        select! {
            result = Self::run_reader(read, &mut context, &options) => {
                match result {
                    Ok(()) => {
                        tracing::trace!(remote = %context.remote_addr(), "client disconnected");
                    }
                    Err(err) => {
                        tracing::warn!(%err, remote = %context.remote_addr(), "closing connection");
                    }
                }
            },
            _ = task_context.wait_for_stop() => {
                tracing::trace!(remote = %context.remote_addr(), "connection stopping");
            },
        }

        if let Err(err) = context.close() {
            tracing::error!(%err, "failed to close connection context");
        }

        // Detaching dropped the last sender, so the writer finishes once its
        // queue is empty, unless the peer stopped reading.
        match tokio::time::timeout(options.flush_timeout, &mut writer).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(%err, "connection writer panicked");
            }
            Err(_) => {
                tracing::warn!(%remote, "peer not reading; dropping unsent responses");
                writer.abort();
            }
        }
    }

    async fn run_reader<C: Context>(
        mut read: OwnedReadHalf,
        context: &mut C,
        options: &ConnectionOptions,
    ) -> Result<(), ConnectionError> {
        let mut buf = BytesMut::with_capacity(4096);
        loop {
            if read.read_buf(&mut buf).await? == 0 {
                return Ok(());
            }

            while !buf.is_empty() {
                let consumed = context.on_read(&buf)?;
                if consumed == 0 {
                    break;
                }
                buf.advance(consumed.min(buf.len()));
            }

            if buf.len() > options.max_request_size {
                return Err(ConnectionError::RequestTooLarge {
                    size: buf.len(),
                    limit: options.max_request_size,
                });
            }
        }
    }

    async fn run_writer(write: OwnedWriteHalf, mut writer_rx: WriterRx) {
        let mut outbound = FramedWrite::new(write, BytesCodec::new());
        while let Some(data) = writer_rx.recv().await {
            if let Err(err) = outbound.send(data).await {
                tracing::error!(%err, "write failed");
                break;
            }
        }
        tracing::trace!("connection writer stopping");
    }
}

#[cfg(test)]
mod tests {

    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use crate::net::context::{ConnectionHandle, Context, ContextError};
    use crate::runtime::Runtime;

    use super::{Connection, ConnectionOptions};

    /// Writes every complete line back to the peer.
    #[derive(Default)]
    struct Echo {
        handle: Option<ConnectionHandle>,
    }

    impl Context for Echo {
        fn handle(&self) -> Option<&ConnectionHandle> {
            self.handle.as_ref()
        }

        fn set_handle(&mut self, handle: Option<ConnectionHandle>) {
            self.handle = handle;
        }

        fn on_read(&mut self, buf: &[u8]) -> Result<usize, ContextError> {
            match buf.iter().position(|byte| *byte == b'\n') {
                Some(index) => {
                    self.write(Bytes::copy_from_slice(&buf[..=index]))?;
                    Ok(index + 1)
                }
                None => Ok(0),
            }
        }
    }

    async fn connect(runtime: &Runtime, options: ConnectionOptions) -> TcpStream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (stream, _) = listener.accept().await.unwrap();
        assert!(
            runtime
                .task()
                .spawn(move |task_context| {
                    Connection::run(stream, Echo::default(), options, task_context)
                })
                .await
        );
        client
    }

    #[tokio::test]
    async fn echoes_complete_lines() {
        let runtime = Arc::new(Runtime::new());
        let mut client = connect(&runtime, ConnectionOptions::default()).await;

        client.write_all(b"first\nsec").await.unwrap();
        client.write_all(b"ond\n").await.unwrap();

        let mut received = vec![0; "first\nsecond\n".len()];
        client.read_exact(&mut received).await.unwrap();
        assert_eq!(received, b"first\nsecond\n");

        drop(client);
        runtime.stop().await;
    }

    #[tokio::test]
    async fn oversized_request_closes() {
        let runtime = Arc::new(Runtime::new());
        let mut client = connect(
            &runtime,
            ConnectionOptions {
                max_request_size: 8,
                ..Default::default()
            },
        )
        .await;

        client.write_all(b"no newline in sight").await.unwrap();

        // The server may reset instead of closing cleanly; either way nothing
        // comes back.
        let mut received = Vec::new();
        let _ = client.read_to_end(&mut received).await;
        assert!(received.is_empty());

        runtime.stop().await;
    }

    #[tokio::test]
    async fn stop_closes_connection() {
        let runtime = Arc::new(Runtime::new());
        let mut client = connect(&runtime, ConnectionOptions::default()).await;

        runtime.stop().await;

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn stop_does_not_wait_for_peer_that_never_reads() {
        let runtime = Arc::new(Runtime::new());
        let mut client = connect(
            &runtime,
            ConnectionOptions {
                flush_timeout: Duration::from_millis(100),
                ..Default::default()
            },
        )
        .await;

        // More echoed data than both socket buffers hold, so the writer ends
        // up blocked on a full socket.
        let mut line = vec![b'x'; 1023];
        line.push(b'\n');
        let data = line.repeat(16 * 1024);
        client.write_all(&data).await.unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(10), runtime.stop()).await;
        assert!(stopped.is_ok());

        drop(client);
    }
}
