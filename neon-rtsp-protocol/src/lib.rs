mod decode;
mod error;
mod headers;
mod method;
mod range;
mod request;
mod response;
mod serialize;
mod transport;
mod view;

#[cfg(feature = "tokio-codec")]
mod codec;

pub use bytes::Bytes;
pub use http::uri::Uri;

pub use decode::decode;
pub use error::{Error, Result};
pub use headers::Headers;
pub use method::{Method, MethodUnknown};
pub use range::{NptTime, Range};
pub use request::Request;
pub use response::{Response, ResponseBuilder, Status};
pub use serialize::Serialize;
pub use transport::{Channel, Lower, Parameter, Port, Transport};
pub use view::{
    Announce, Describe, GetParameter, MethodView, Options, Pause, Play, Record, SetParameter,
    Setup, Teardown,
};

#[cfg(feature = "tokio-codec")]
pub use codec::Codec;
