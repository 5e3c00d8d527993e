pub mod handler;

use serde::Deserialize;

use neon_rtsp_protocol as rtsp;
use rtsp::{MethodView, Request, Response, Status};

use crate::net::context::{ConnectionHandle, Context, ContextError};
use crate::session::handler::Handler;

/// What to do with bytes that cannot be decoded as a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Answer `400 Bad Request`, drop the malformed message and keep reading.
    Skip,
    /// Drop the connection.
    #[default]
    Close,
}

/// RTSP conversation on one connection: decodes requests from the connection
/// buffer, hands them to the handler and writes back the responses.
pub struct Session<H: Handler> {
    handle: Option<ConnectionHandle>,
    handler: H,
    malformed: MalformedPolicy,
}

impl<H: Handler> Session<H> {
    pub fn new(handler: H, malformed: MalformedPolicy) -> Self {
        Self {
            handle: None,
            handler,
            malformed,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    fn respond(&mut self, request: &Request) -> Response {
        match MethodView::of(request) {
            Some(view) => self.handler.handle(view),
            None => reply_not_implemented(request),
        }
    }

    fn reply(&self, response: Response) -> Result<(), ContextError> {
        tracing::trace!(%response, "S->C");
        self.write(response.to_bytes())
    }
}

impl<H: Handler> Context for Session<H> {
    fn handle(&self) -> Option<&ConnectionHandle> {
        self.handle.as_ref()
    }

    fn set_handle(&mut self, handle: Option<ConnectionHandle>) {
        self.handle = handle;
    }

    fn on_read(&mut self, buf: &[u8]) -> Result<usize, ContextError> {
        match rtsp::decode(buf) {
            Ok((request, consumed)) => {
                tracing::trace!(%request, "C->S");
                let response = self.respond(&request);
                self.reply(response)?;
                Ok(consumed)
            }
            Err(rtsp::Error::Incomplete) => Ok(0),
            Err(err) => match self.malformed {
                MalformedPolicy::Skip => {
                    let consumed = err.consumed().unwrap_or(buf.len());
                    tracing::debug!(%err, consumed, remote = %self.remote_addr(), "skipping malformed request");
                    self.reply(Response::error(Status::BadRequest).build())?;
                    Ok(consumed)
                }
                MalformedPolicy::Close => {
                    tracing::debug!(%err, remote = %self.remote_addr(), "malformed request");
                    Err(err.into())
                }
            },
        }
    }

    fn on_close(&mut self) -> Result<(), ContextError> {
        tracing::trace!(remote = %self.remote_addr(), "session closed");
        self.handler.closed();
        Ok(())
    }
}

#[inline]
fn reply_not_implemented(request: &Request) -> Response {
    tracing::warn!(method = %request.method, "client sent unknown method");
    Response::error(Status::NotImplemented)
        .with_cseq_of(request)
        .build()
}
