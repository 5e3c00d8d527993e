use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;

use neon_rtsp_protocol as rtsp;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    const SESSION_ID_LEN: usize = 16;

    pub fn generate() -> SessionId {
        SessionId(
            rand::thread_rng()
                .sample_iter(&rand::distributions::Alphanumeric)
                .take(Self::SESSION_ID_LEN)
                .map(char::from)
                .collect(),
        )
    }

    /// Identifier carried by a `Session` header value, without parameters
    /// such as `;timeout=60`.
    pub fn of(request: &rtsp::Request) -> Option<SessionId> {
        let value = request.session().split(';').next()?.trim();
        (!value.is_empty()).then(|| SessionId(value.to_string()))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SessionId {
    fn from(session_id: &str) -> Self {
        SessionId(session_id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Playing,
    Paused,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionState::Ready => write!(f, "ready"),
            SessionState::Playing => write!(f, "playing"),
            SessionState::Paused => write!(f, "paused"),
        }
    }
}

/// Server side state of one `SETUP`.
#[derive(Debug, Clone)]
pub struct StreamSession {
    pub path: String,
    pub transport: rtsp::Transport,
    pub state: SessionState,
    pub parameters: BTreeMap<String, String>,
}

impl StreamSession {
    pub fn new(path: String, transport: rtsp::Transport) -> Self {
        Self {
            path,
            transport,
            state: SessionState::Ready,
            parameters: BTreeMap::new(),
        }
    }

    pub fn play(&mut self) -> Result<(), SessionState> {
        // Playing again is how a client seeks.
        self.transition(SessionState::Playing, &[
            SessionState::Ready,
            SessionState::Playing,
            SessionState::Paused,
        ])
    }

    pub fn pause(&mut self) -> Result<(), SessionState> {
        self.transition(SessionState::Paused, &[
            SessionState::Playing,
            SessionState::Paused,
        ])
    }

    fn transition(&mut self, to: SessionState, from: &[SessionState]) -> Result<(), SessionState> {
        if from.contains(&self.state) {
            self.state = to;
            Ok(())
        } else {
            Err(self.state)
        }
    }
}

#[cfg(test)]
mod tests {

    use neon_rtsp_protocol as rtsp;

    use super::{SessionId, SessionState, StreamSession};

    #[test]
    fn generate_is_alphanumeric() {
        let id = SessionId::generate().to_string();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn of_strips_parameters() {
        let (request, _) = rtsp::decode(
            b"PLAY rtsp://host/a RTSP/1.0\r\nCSeq: 1\r\nSession: abc123;timeout=60\r\n\r\n",
        )
        .unwrap();
        assert_eq!(SessionId::of(&request), Some(SessionId::from("abc123")));

        let (request, _) =
            rtsp::decode(b"PLAY rtsp://host/a RTSP/1.0\r\nCSeq: 1\r\n\r\n").unwrap();
        assert_eq!(SessionId::of(&request), None);
    }

    #[test]
    fn state_machine() {
        let mut session = StreamSession::new("/a".to_string(), rtsp::Transport::new());
        assert_eq!(session.pause(), Err(SessionState::Ready));
        assert_eq!(session.play(), Ok(()));
        assert_eq!(session.pause(), Ok(()));
        assert_eq!(session.state, SessionState::Paused);
        assert_eq!(session.play(), Ok(()));
        assert_eq!(session.state, SessionState::Playing);
    }
}
