use std::fmt;
use std::str::FromStr;

/// The request methods this layer knows how to view.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Method {
    Options,
    Describe,
    Announce,
    Setup,
    Play,
    Pause,
    Teardown,
    GetParameter,
    SetParameter,
    Record,
}

impl Method {
    pub const ALL: [Method; 10] = [
        Method::Options,
        Method::Describe,
        Method::Announce,
        Method::Setup,
        Method::Play,
        Method::Pause,
        Method::Teardown,
        Method::GetParameter,
        Method::SetParameter,
        Method::Record,
    ];

    /// Token as stored on a decoded request (lower case).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Options => "options",
            Method::Describe => "describe",
            Method::Announce => "announce",
            Method::Setup => "setup",
            Method::Play => "play",
            Method::Pause => "pause",
            Method::Teardown => "teardown",
            Method::GetParameter => "get_parameter",
            Method::SetParameter => "set_parameter",
            Method::Record => "record",
        }
    }
}

/// Formats the method the way it appears on the wire, in upper case.
impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Options => write!(f, "OPTIONS"),
            Method::Describe => write!(f, "DESCRIBE"),
            Method::Announce => write!(f, "ANNOUNCE"),
            Method::Setup => write!(f, "SETUP"),
            Method::Play => write!(f, "PLAY"),
            Method::Pause => write!(f, "PAUSE"),
            Method::Teardown => write!(f, "TEARDOWN"),
            Method::GetParameter => write!(f, "GET_PARAMETER"),
            Method::SetParameter => write!(f, "SET_PARAMETER"),
            Method::Record => write!(f, "RECORD"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MethodUnknown(pub String);

impl fmt::Display for MethodUnknown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "method unknown: {}", self.0)
    }
}

impl std::error::Error for MethodUnknown {}

impl FromStr for Method {
    type Err = MethodUnknown;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MethodUnknown(s.to_string()))
    }
}
