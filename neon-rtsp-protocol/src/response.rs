use std::fmt;

use bytes::{BufMut, BytesMut};

use super::{headers::Headers, request::Request, serialize::Serialize, Bytes};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Response {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub const VERSION: &'static str = "RTSP/1.0";

    #[must_use]
    pub fn ok() -> ResponseBuilder {
        ResponseBuilder::new(Status::Ok)
    }

    #[must_use]
    pub fn error(status: Status) -> ResponseBuilder {
        ResponseBuilder::new(status)
    }

    /// Case-insensitive lookup. Responses keep header names as they were
    /// given to the builder (`CSeq`, `Content-Length`, ...).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(var, _)| var.eq_ignore_ascii_case(name))
            .map(|(_, val)| val)
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::new();
        self.serialize(&mut dst);
        dst.freeze()
    }
}

impl Serialize for Response {
    fn serialize(&self, dst: &mut BytesMut) {
        dst.put(format!("{} {} {}\r\n", self.version, self.status, self.reason).as_bytes());
        dst.put(self.headers.serialize().as_bytes());
        dst.put(b"\r\n".as_slice());
        dst.put(self.body.as_ref());
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Version: {}, Status Code: {}, Reason Phrase: {}",
            self.version, self.status, &self.reason
        )?;

        if !self.headers.is_empty() {
            writeln!(f, "\nHeaders:")?;
            for (var, val) in self.headers.iter() {
                writeln!(f, " - {}: {}", &var, &val)?;
            }
        }

        if !self.body.is_empty() {
            writeln!(f, "[{} bytes]", self.body.len())?;
        }

        Ok(())
    }
}

pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    fn new(status: Status) -> Self {
        Self {
            response: Response {
                version: Response::VERSION.to_string(),
                status: status.code(),
                reason: status.to_string(),
                headers: Headers::new(),
                body: Bytes::new(),
            },
        }
    }

    /// Echo the request's `CSeq`, if it sent one.
    #[must_use]
    pub fn with_cseq_of(self, request: &Request) -> Self {
        match request.headers.get_opt("cseq") {
            Some(cseq) => self.with_header("CSeq", cseq.trim()),
            None => self,
        }
    }

    #[must_use]
    pub fn with_header(mut self, var: impl Into<String>, val: impl Into<String>) -> Self {
        self.response.headers.set(var, val);
        self
    }

    #[must_use]
    pub fn with_session(self, session: &str) -> Self {
        self.with_header("Session", session)
    }

    #[must_use]
    pub fn with_body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.response.headers.set("Content-Type", content_type);
        self.response
            .headers
            .set("Content-Length", body.len().to_string());
        self.response.body = body;
        self
    }

    #[must_use]
    pub fn build(self) -> Response {
        self.response
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    RequestEntityTooLarge,
    ParameterNotUnderstood,
    SessionNotFound,
    MethodNotValidInThisState,
    InvalidRange,
    AggregateOperationNotAllowed,
    UnsupportedTransport,
    InternalServerError,
    NotImplemented,
    ServiceUnavailable,
    VersionNotSupported,
    OptionNotSupported,
}

impl Status {
    pub const fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::NotAcceptable => 406,
            Status::RequestEntityTooLarge => 413,
            Status::ParameterNotUnderstood => 451,
            Status::SessionNotFound => 454,
            Status::MethodNotValidInThisState => 455,
            Status::InvalidRange => 457,
            Status::AggregateOperationNotAllowed => 459,
            Status::UnsupportedTransport => 461,
            Status::InternalServerError => 500,
            Status::NotImplemented => 501,
            Status::ServiceUnavailable => 503,
            Status::VersionNotSupported => 505,
            Status::OptionNotSupported => 551,
        }
    }
}

/// Reason phrase.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::NotAcceptable => "Not Acceptable",
            Status::RequestEntityTooLarge => "Request Entity Too Large",
            Status::ParameterNotUnderstood => "Parameter Not Understood",
            Status::SessionNotFound => "Session Not Found",
            Status::MethodNotValidInThisState => "Method Not Valid in This State",
            Status::InvalidRange => "Invalid Range",
            Status::AggregateOperationNotAllowed => "Aggregate Operation Not Allowed",
            Status::UnsupportedTransport => "Unsupported Transport",
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
            Status::ServiceUnavailable => "Service Unavailable",
            Status::VersionNotSupported => "RTSP Version Not Supported",
            Status::OptionNotSupported => "Option Not Supported",
        };
        write!(f, "{reason}")
    }
}

#[cfg(test)]
mod tests {

    use super::super::decode;
    use super::{Response, Status};

    #[test]
    fn ok_with_cseq() {
        let (request, _) = decode(b"OPTIONS * RTSP/1.0\r\nCSeq: 1\r\n\r\n").unwrap();
        let response = Response::ok()
            .with_cseq_of(&request)
            .with_header("Public", "OPTIONS, SETUP")
            .build();
        assert_eq!(response.status, 200);
        assert_eq!(response.header("cseq"), Some("1"));
        assert_eq!(
            response.to_bytes().as_ref(),
            b"RTSP/1.0 200 OK\r\nCSeq: 1\r\nPublic: OPTIONS, SETUP\r\n\r\n",
        );
    }

    #[test]
    fn error_without_cseq() {
        let response = Response::error(Status::SessionNotFound).build();
        assert_eq!(
            response.to_bytes().as_ref(),
            b"RTSP/1.0 454 Session Not Found\r\n\r\n",
        );
    }

    #[test]
    fn with_body_sets_length() {
        let response = Response::ok()
            .with_body("text/parameters", "jitter: 0.5\r\n")
            .build();
        assert_eq!(response.header("Content-Length"), Some("13"));
        assert_eq!(
            response.to_bytes().as_ref(),
            b"RTSP/1.0 200 OK\r\nContent-Type: text/parameters\r\nContent-Length: 13\r\n\r\njitter: 0.5\r\n",
        );
    }
}
