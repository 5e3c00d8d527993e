use std::collections::HashMap;
use std::sync::Arc;

use neon_rtsp_protocol as rtsp;
use rtsp::{Request, Response, Status};

use crate::app::config::Stream;
use crate::app::session::{SessionId, SessionState, StreamSession};
use crate::session::handler::Handler;

/// Methods answered with something other than `501 Not Implemented`.
const PUBLIC: &str = "OPTIONS, SETUP, PLAY, PAUSE, TEARDOWN, GET_PARAMETER, SET_PARAMETER";

/// Handles the requests of one connection. Sessions set up on a connection
/// live as long as the connection or until `TEARDOWN`.
pub struct AppHandler {
    streams: Arc<Vec<Stream>>,
    sessions: HashMap<SessionId, StreamSession>,
}

impl AppHandler {
    pub fn new(streams: Arc<Vec<Stream>>) -> Self {
        Self {
            streams,
            sessions: HashMap::new(),
        }
    }

    pub fn sessions(&self) -> &HashMap<SessionId, StreamSession> {
        &self.sessions
    }

    fn stream(&self, path: &str) -> Option<&Stream> {
        self.streams
            .iter()
            .find(|stream| stream.path.trim_end_matches('/').eq_ignore_ascii_case(path))
    }

    fn lookup(&mut self, request: &Request) -> Result<(SessionId, &mut StreamSession), Response> {
        let id = SessionId::of(request).ok_or_else(|| reply_session_not_found(request))?;
        match self.sessions.get_mut(&id) {
            Some(session) => Ok((id, session)),
            None => Err(reply_session_not_found(request)),
        }
    }
}

impl Handler for AppHandler {
    fn options(&mut self, request: rtsp::Options<'_>) -> Response {
        if !is_request_require_supported(&request) {
            return reply_option_not_supported(&request);
        }
        reply_to_options_with_supported_methods(&request)
    }

    fn describe(&mut self, request: rtsp::Describe<'_>) -> Response {
        reply_not_implemented(&request)
    }

    fn announce(&mut self, request: rtsp::Announce<'_>) -> Response {
        reply_not_implemented(&request)
    }

    fn record(&mut self, request: rtsp::Record<'_>) -> Response {
        reply_not_implemented(&request)
    }

    fn setup(&mut self, request: rtsp::Setup<'_>) -> Response {
        let path = request.path();
        if self.stream(&path).is_none() {
            return reply_not_found(&request);
        }

        if request.headers.has("session") {
            // Changing the transport of an existing session is not supported.
            return reply_aggregate_operation_not_allowed(&request);
        }

        let transport = match request.transport() {
            Ok(transport) if !transport.is_multicast() => transport,
            Ok(_) | Err(_) => return reply_unsupported_transport(&request),
        };

        let id = SessionId::generate();
        if self.sessions.contains_key(&id) {
            tracing::error!(request = %request.request(), "session id already present (collision)");
            return reply_internal_server_error(&request);
        }

        tracing::debug!(%id, path = %path, %transport, "session set up");
        let response = reply_to_setup_with_session(&request, &id, &transport);
        self.sessions.insert(id, StreamSession::new(path, transport));
        response
    }

    fn play(&mut self, request: rtsp::Play<'_>) -> Response {
        let range = match request.range() {
            Some(Ok(range)) if is_range_supported(&range) => range,
            Some(Ok(_)) | Some(Err(_)) => return reply_invalid_range(&request),
            None => rtsp::Range::live(),
        };

        let (id, session) = match self.lookup(&request) {
            Ok(found) => found,
            Err(response) => return response,
        };
        match session.play() {
            Ok(()) => {
                tracing::debug!(%id, path = %session.path, "session playing");
                Response::ok()
                    .with_cseq_of(&request)
                    .with_session(&id.to_string())
                    .with_header("Range", range.to_string())
                    .build()
            }
            Err(state) => reply_method_not_valid_in_state(&request, state),
        }
    }

    fn pause(&mut self, request: rtsp::Pause<'_>) -> Response {
        if let Some(Err(_)) = request.range() {
            return reply_invalid_range(&request);
        }

        let (id, session) = match self.lookup(&request) {
            Ok(found) => found,
            Err(response) => return response,
        };
        match session.pause() {
            Ok(()) => {
                tracing::debug!(%id, path = %session.path, "session paused");
                Response::ok()
                    .with_cseq_of(&request)
                    .with_session(&id.to_string())
                    .build()
            }
            Err(state) => reply_method_not_valid_in_state(&request, state),
        }
    }

    fn teardown(&mut self, request: rtsp::Teardown<'_>) -> Response {
        let id = match self.lookup(&request) {
            Ok((id, _)) => id,
            Err(response) => return response,
        };
        self.sessions.remove(&id);
        tracing::debug!(%id, "session torn down");
        Response::ok().with_cseq_of(&request).build()
    }

    fn get_parameter(&mut self, request: rtsp::GetParameter<'_>) -> Response {
        let names = request.parameters();
        let session = match SessionId::of(&request) {
            Some(_) => match self.lookup(&request) {
                Ok((_, session)) => Some(session),
                Err(response) => return response,
            },
            None => None,
        };

        if names.is_empty() {
            // Keep-alive.
            return Response::ok().with_cseq_of(&request).build();
        }

        let mut body = String::new();
        for name in names {
            let name = name.trim();
            match session.as_ref().and_then(|session| session.parameters.get(name)) {
                Some(value) => body.push_str(&format!("{name}: {value}\r\n")),
                None => return reply_parameter_not_understood(&request, name),
            }
        }

        Response::ok()
            .with_cseq_of(&request)
            .with_body("text/parameters", body)
            .build()
    }

    fn set_parameter(&mut self, request: rtsp::SetParameter<'_>) -> Response {
        let parameters = request.parameters();
        let (id, session) = match self.lookup(&request) {
            Ok(found) => found,
            Err(response) => return response,
        };
        for (var, val) in parameters {
            session
                .parameters
                .insert(var.trim().to_string(), val.trim().to_string());
        }
        tracing::trace!(%id, parameters = session.parameters.len(), "parameters set");
        Response::ok().with_cseq_of(&request).build()
    }

    fn closed(&mut self) {
        if !self.sessions.is_empty() {
            tracing::debug!(sessions = self.sessions.len(), "dropping sessions of closed connection");
        }
        self.sessions.clear();
    }
}

#[inline]
fn is_request_require_supported(request: &Request) -> bool {
    // No extensions are supported.
    !request.headers.has("require")
}

/// Only live playback from the current position is supported.
#[inline]
fn is_range_supported(range: &rtsp::Range) -> bool {
    match (range.start.as_ref(), range.end.as_ref()) {
        (Some(rtsp::NptTime::Now), None) => true,
        (Some(rtsp::NptTime::Time(start)), None) if *start <= 0.0 => true,
        _ => false,
    }
}

#[inline]
fn reply_to_options_with_supported_methods(request: &Request) -> Response {
    Response::ok()
        .with_cseq_of(request)
        .with_header("Public", PUBLIC)
        .build()
}

#[inline]
fn reply_to_setup_with_session(
    request: &Request,
    id: &SessionId,
    transport: &rtsp::Transport,
) -> Response {
    Response::ok()
        .with_cseq_of(request)
        .with_session(&id.to_string())
        .with_header("Transport", transport.to_string())
        .build()
}

#[inline]
fn reply_option_not_supported(request: &Request) -> Response {
    tracing::debug!(%request, "client asked for feature that is not supported");
    Response::error(Status::OptionNotSupported)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_not_implemented(request: &Request) -> Response {
    tracing::warn!(method = %request.method, "client sent unsupported request");
    Response::error(Status::NotImplemented)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_not_found(request: &Request) -> Response {
    tracing::debug!(path = %request.path(), "path not registered as stream");
    Response::error(Status::NotFound)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_aggregate_operation_not_allowed(request: &Request) -> Response {
    tracing::debug!(%request, "refusing to do aggregate request");
    Response::error(Status::AggregateOperationNotAllowed)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_unsupported_transport(request: &Request) -> Response {
    tracing::debug!(transport = request.headers.get("transport"), "unsupported transport");
    Response::error(Status::UnsupportedTransport)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_session_not_found(request: &Request) -> Response {
    tracing::debug!(session = request.session(), "session not found");
    Response::error(Status::SessionNotFound)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_method_not_valid_in_state(request: &Request, state: SessionState) -> Response {
    tracing::debug!(method = %request.method, %state, "method not valid in session state");
    Response::error(Status::MethodNotValidInThisState)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_invalid_range(request: &Request) -> Response {
    tracing::debug!(range = request.headers.get("range"), "range not supported");
    Response::error(Status::InvalidRange)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_parameter_not_understood(request: &Request, name: &str) -> Response {
    tracing::debug!(name, "parameter not understood");
    Response::error(Status::ParameterNotUnderstood)
        .with_cseq_of(request)
        .build()
}

#[inline]
fn reply_internal_server_error(request: &Request) -> Response {
    Response::error(Status::InternalServerError)
        .with_cseq_of(request)
        .build()
}
