use std::fmt;

use bytes::{BufMut, BytesMut};

use super::{
    headers::Headers,
    method::Method,
    serialize::Serialize,
    view::{
        Announce, Describe, GetParameter, MethodView, Options, Pause, Play, Record,
        SetParameter, Setup, Teardown,
    },
    Bytes, Uri,
};

/// A decoded request.
///
/// The method, url and version tokens are folded to lower case by the
/// decoder. Header values are kept as they appeared on the wire.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub version: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl Request {
    /// Typed method, if the token is one of the supported methods.
    pub fn method_kind(&self) -> Option<Method> {
        self.method.parse().ok()
    }

    /// Sequence number used to correlate requests and responses, or `-1`
    /// when the header is missing or not a number.
    pub fn cseq(&self) -> i64 {
        self.headers
            .get_opt("cseq")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(-1)
    }

    pub fn session(&self) -> &str {
        self.headers.get("session")
    }

    pub fn uri(&self) -> Option<Uri> {
        self.url.parse().ok()
    }

    /// Path of the request url without trailing slash. Empty when the url
    /// cannot be parsed (for example `*`).
    pub fn path(&self) -> String {
        self.uri()
            .map(|uri| uri.path().trim_end_matches('/').to_string())
            .unwrap_or_default()
    }

    /// Equal method, url, version and body, with headers compared by
    /// [`Headers::semantic_eq`]. A decoded request that is serialized and
    /// decoded again is semantically equal to itself, though not always
    /// `==`.
    pub fn semantic_eq(&self, other: &Request) -> bool {
        self.method == other.method
            && self.url == other.url
            && self.version == other.version
            && self.body == other.body
            && self.headers.semantic_eq(&other.headers)
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::new();
        self.serialize(&mut dst);
        dst.freeze()
    }

    /// View matching the method token, or `None` for unsupported methods.
    pub fn view(&self) -> Option<MethodView<'_>> {
        MethodView::of(self)
    }

    pub fn options(&self) -> Options<'_> {
        Options::new(self)
    }

    pub fn describe(&self) -> Describe<'_> {
        Describe::new(self)
    }

    pub fn announce(&self) -> Announce<'_> {
        Announce::new(self)
    }

    pub fn setup(&self) -> Setup<'_> {
        Setup::new(self)
    }

    pub fn play(&self) -> Play<'_> {
        Play::new(self)
    }

    pub fn pause(&self) -> Pause<'_> {
        Pause::new(self)
    }

    pub fn teardown(&self) -> Teardown<'_> {
        Teardown::new(self)
    }

    pub fn get_parameter(&self) -> GetParameter<'_> {
        GetParameter::new(self)
    }

    pub fn set_parameter(&self) -> SetParameter<'_> {
        SetParameter::new(self)
    }

    pub fn record(&self) -> Record<'_> {
        Record::new(self)
    }
}

impl Serialize for Request {
    fn serialize(&self, dst: &mut BytesMut) {
        dst.put(self.method.as_bytes());
        dst.put_u8(b' ');
        dst.put(self.url.as_bytes());
        dst.put_u8(b' ');
        dst.put(self.version.as_bytes());
        dst.put(b"\r\n".as_slice());
        dst.put(self.headers.serialize().as_bytes());
        dst.put(b"\r\n".as_slice());
        dst.put(self.body.as_ref());
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Version: {}, Method: {}, Url: {}",
            self.version, self.method, self.url
        )?;

        if !self.headers.is_empty() {
            writeln!(f, "\nHeaders:")?;
            for (var, val) in self.headers.iter() {
                writeln!(f, " - {}:{}", &var, &val)?;
            }
        }

        if !self.body.is_empty() {
            writeln!(f, "[{} bytes]", self.body.len())?;
        }

        Ok(())
    }
}
