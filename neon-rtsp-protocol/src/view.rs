//! Method-specific views over a decoded [`Request`].
//!
//! A view borrows the request and only adds accessors for the headers and
//! body that matter to its method. Constructing a view never checks the
//! method token; use [`MethodView::of`] to pick the right one.

use std::collections::BTreeMap;
use std::ops::Deref;

use super::{
    error::{Error, Result},
    method::Method,
    range::Range,
    request::Request,
    transport::Transport,
};

macro_rules! view {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug)]
        pub struct $name<'r> {
            request: &'r Request,
        }

        impl<'r> $name<'r> {
            pub const fn new(request: &'r Request) -> Self {
                Self { request }
            }

            pub const fn request(&self) -> &'r Request {
                self.request
            }
        }

        impl Deref for $name<'_> {
            type Target = Request;

            fn deref(&self) -> &Request {
                self.request
            }
        }
    };
}

view!(
    /// `OPTIONS` request.
    Options
);
view!(
    /// `DESCRIBE` request.
    Describe
);
view!(
    /// `ANNOUNCE` request.
    Announce
);
view!(
    /// `SETUP` request.
    Setup
);
view!(
    /// `PLAY` request.
    Play
);
view!(
    /// `PAUSE` request.
    Pause
);
view!(
    /// `TEARDOWN` request.
    Teardown
);
view!(
    /// `GET_PARAMETER` request.
    GetParameter
);
view!(
    /// `SET_PARAMETER` request.
    SetParameter
);
view!(
    /// `RECORD` request.
    Record
);

impl<'r> Options<'r> {
    pub fn require(&self) -> &'r str {
        self.request.headers.get("require")
    }

    pub fn proxy_require(&self) -> &'r str {
        self.request.headers.get("proxy-require")
    }
}

impl<'r> Describe<'r> {
    pub fn accept(&self) -> &'r str {
        self.request.headers.get("accept")
    }

    pub fn accepts(&self) -> Vec<&'r str> {
        self.accept()
            .split(',')
            .map(str::trim)
            .filter(|content_type| !content_type.is_empty())
            .collect()
    }
}

impl<'r> Announce<'r> {
    pub fn content_type(&self) -> &'r str {
        self.request.headers.get("content-type")
    }
}

impl<'r> Setup<'r> {
    pub fn transport_str(&self) -> &'r str {
        self.request.headers.get("transport")
    }

    /// First transport the client proposed.
    pub fn transport(&self) -> Result<Transport> {
        self.transports()?
            .into_iter()
            .next()
            .ok_or(Error::TransportMissing)
    }

    /// All transports the client proposed, in order of preference.
    pub fn transports(&self) -> Result<Vec<Transport>> {
        let value = self.transport_str().trim();
        if value.is_empty() {
            return Err(Error::TransportMissing);
        }
        value
            .split(',')
            .map(|transport| transport.trim().parse())
            .collect()
    }
}

impl<'r> Play<'r> {
    pub fn range_str(&self) -> &'r str {
        self.request.headers.get("range")
    }

    pub fn range(&self) -> Option<Result<Range>> {
        parse_range(self.request)
    }
}

impl<'r> Pause<'r> {
    pub fn range_str(&self) -> &'r str {
        self.request.headers.get("range")
    }

    pub fn range(&self) -> Option<Result<Range>> {
        parse_range(self.request)
    }
}

fn parse_range(request: &Request) -> Option<Result<Range>> {
    request
        .headers
        .get_opt("range")
        .map(|value| value.trim().parse())
}

impl GetParameter<'_> {
    /// Names of the requested parameters, one per body line. An empty body
    /// (a keep-alive) yields no names. Invalid UTF-8 in the body is replaced
    /// with U+FFFD; the body itself is left untouched.
    pub fn parameters(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.request.body)
            .split("\r\n")
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl SetParameter<'_> {
    /// Body lines split on the first colon. Lines without a colon are left
    /// out. Names and values are not trimmed. Invalid UTF-8 is replaced with
    /// U+FFFD.
    pub fn parameters(&self) -> BTreeMap<String, String> {
        String::from_utf8_lossy(&self.request.body)
            .split("\r\n")
            .filter_map(|line| line.split_once(':'))
            .map(|(var, val)| (var.to_string(), val.to_string()))
            .collect()
    }
}

/// One of the ten views, selected from the request's method token.
#[derive(Clone, Copy, Debug)]
pub enum MethodView<'r> {
    Options(Options<'r>),
    Describe(Describe<'r>),
    Announce(Announce<'r>),
    Setup(Setup<'r>),
    Play(Play<'r>),
    Pause(Pause<'r>),
    Teardown(Teardown<'r>),
    GetParameter(GetParameter<'r>),
    SetParameter(SetParameter<'r>),
    Record(Record<'r>),
}

impl<'r> MethodView<'r> {
    pub fn of(request: &'r Request) -> Option<Self> {
        Some(match request.method_kind()? {
            Method::Options => Self::Options(Options::new(request)),
            Method::Describe => Self::Describe(Describe::new(request)),
            Method::Announce => Self::Announce(Announce::new(request)),
            Method::Setup => Self::Setup(Setup::new(request)),
            Method::Play => Self::Play(Play::new(request)),
            Method::Pause => Self::Pause(Pause::new(request)),
            Method::Teardown => Self::Teardown(Teardown::new(request)),
            Method::GetParameter => Self::GetParameter(GetParameter::new(request)),
            Method::SetParameter => Self::SetParameter(SetParameter::new(request)),
            Method::Record => Self::Record(Record::new(request)),
        })
    }

    pub const fn method(&self) -> Method {
        match self {
            Self::Options(_) => Method::Options,
            Self::Describe(_) => Method::Describe,
            Self::Announce(_) => Method::Announce,
            Self::Setup(_) => Method::Setup,
            Self::Play(_) => Method::Play,
            Self::Pause(_) => Method::Pause,
            Self::Teardown(_) => Method::Teardown,
            Self::GetParameter(_) => Method::GetParameter,
            Self::SetParameter(_) => Method::SetParameter,
            Self::Record(_) => Method::Record,
        }
    }

    pub const fn request(&self) -> &'r Request {
        match self {
            Self::Options(view) => view.request(),
            Self::Describe(view) => view.request(),
            Self::Announce(view) => view.request(),
            Self::Setup(view) => view.request(),
            Self::Play(view) => view.request(),
            Self::Pause(view) => view.request(),
            Self::Teardown(view) => view.request(),
            Self::GetParameter(view) => view.request(),
            Self::SetParameter(view) => view.request(),
            Self::Record(view) => view.request(),
        }
    }
}

#[cfg(test)]
mod tests {

    use std::collections::BTreeMap;

    use super::super::{
        decode,
        transport::{Lower, Parameter, Port},
        Bytes, Error, Method, Request,
    };
    use super::MethodView;

    fn make(method: &str, headers: &[(&str, &str)], body: &'static str) -> Request {
        Request {
            method: method.to_string(),
            url: "rtsp://example.com/media".to_string(),
            version: "rtsp/1.0".to_string(),
            headers: headers.iter().copied().collect(),
            body: body.into(),
        }
    }

    #[test]
    fn view_selected_by_method() {
        for method in Method::ALL {
            let request = make(method.as_str(), &[], "");
            let view = MethodView::of(&request).unwrap();
            assert_eq!(view.method(), method);
            assert!(std::ptr::eq(view.request(), &request));
        }
    }

    #[test]
    fn view_unknown_method() {
        let request = make("redirect", &[], "");
        assert!(MethodView::of(&request).is_none());
        assert!(request.view().is_none());
    }

    #[test]
    fn view_derefs_to_request() {
        let request = make("teardown", &[("cseq", " 8"), ("session", " abc")], "");
        let teardown = request.teardown();
        assert_eq!(teardown.cseq(), 8);
        assert_eq!(teardown.session(), " abc");
    }

    #[test]
    fn options() {
        let request = make(
            "options",
            &[("require", " implicit-play"), ("proxy-require", " gzipped-messages")],
            "",
        );
        let options = request.options();
        assert_eq!(options.require(), " implicit-play");
        assert_eq!(options.proxy_require(), " gzipped-messages");
    }

    #[test]
    fn describe_accepts() {
        let request = make("describe", &[("accept", " application/sdp, application/rtsl")], "");
        assert_eq!(
            request.describe().accepts(),
            vec!["application/sdp", "application/rtsl"],
        );
        let request = Request::default();
        assert!(request.describe().accepts().is_empty());
    }

    #[test]
    fn announce_content_type() {
        let request = make("announce", &[("content-type", " application/sdp")], "");
        assert_eq!(request.announce().content_type(), " application/sdp");
    }

    #[test]
    fn setup_transport() {
        let request = make(
            "setup",
            &[("transport", " RTP/AVP;unicast;client_port=4588-4589")],
            "",
        );
        let setup = request.setup();
        assert_eq!(setup.transport_str(), " RTP/AVP;unicast;client_port=4588-4589");
        let transport = setup.transport().unwrap();
        assert_eq!(transport.lower_protocol(), None);
        assert_eq!(transport.client_port(), Some(&Port::Range(4588, 4589)));
        assert!(transport.parameters_iter().any(|p| *p == Parameter::Unicast));
    }

    #[test]
    fn setup_transport_alternatives() {
        let request = make(
            "setup",
            &[("transport", " RTP/AVP/TCP;interleaved=0-1, RTP/AVP/UDP;unicast")],
            "",
        );
        let transports = request.setup().transports().unwrap();
        assert_eq!(transports.len(), 2);
        assert_eq!(transports[0].lower_protocol(), Some(&Lower::Tcp));
        assert_eq!(transports[1].lower_protocol(), Some(&Lower::Udp));
    }

    #[test]
    fn setup_transport_missing() {
        let request = make("setup", &[], "");
        assert!(matches!(request.setup().transport(), Err(Error::TransportMissing)));
    }

    #[test]
    fn setup_transport_malformed() {
        let request = make("setup", &[("transport", " RAW/RAW/UDP;unicast")], "");
        assert!(matches!(
            request.setup().transport(),
            Err(Error::TransportProtocolProfileMissing { .. }),
        ));
    }

    #[test]
    fn play_range() {
        let request = make("play", &[("range", " npt=now-")], "");
        let play = request.play();
        assert_eq!(play.range_str(), " npt=now-");
        assert!(play.range().unwrap().is_ok());

        let request = make("pause", &[], "");
        assert!(request.pause().range().is_none());
    }

    #[test]
    fn get_parameter_empty_body() {
        let request = make("get_parameter", &[], "");
        assert!(request.get_parameter().parameters().is_empty());
    }

    #[test]
    fn get_parameter_names() {
        let request = make("get_parameter", &[], "a\r\nb");
        assert_eq!(request.get_parameter().parameters(), vec!["a", "b"]);
        let request = make("get_parameter", &[], "packets_received\r\njitter\r\n");
        assert_eq!(
            request.get_parameter().parameters(),
            vec!["packets_received", "jitter"],
        );
    }

    #[test]
    fn parameters_replace_invalid_utf8() {
        let mut request = make("get_parameter", &[], "");
        request.body = Bytes::from_static(b"jit\xffter\r\nscale");
        assert_eq!(
            request.get_parameter().parameters(),
            vec!["jit\u{FFFD}ter", "scale"],
        );
        assert_eq!(request.body.as_ref(), b"jit\xffter\r\nscale");

        request.body = Bytes::from_static(b"a:\xfe\r\nb:2");
        let parameters = request.set_parameter().parameters();
        assert_eq!(parameters["a"], "\u{FFFD}");
        assert_eq!(parameters["b"], "2");
    }

    #[test]
    fn set_parameter_skips_lines_without_colon() {
        let request = make("set_parameter", &[], "a:1\r\nbadline\r\nb:2");
        let expected = [("a", "1"), ("b", "2")]
            .into_iter()
            .map(|(var, val)| (var.to_string(), val.to_string()))
            .collect::<BTreeMap<_, _>>();
        assert_eq!(request.set_parameter().parameters(), expected);
    }

    #[test]
    fn set_parameter_from_wire() {
        let wire = b"SET_PARAMETER rtsp://example.com/fizzle/foo RTSP/1.0\r\n\
CSeq: 421\r\n\
Content-length: 27\r\n\
Content-type: text/parameters\r\n\
\r\n\
barparam: barstuff\r\n\
x:1:2\r\n";
        let (request, consumed) = decode(wire).unwrap();
        assert_eq!(consumed, wire.len());
        let parameters = request.set_parameter().parameters();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters["barparam"], " barstuff");
        assert_eq!(parameters["x"], "1:2");
    }
}
