use std::convert;
use std::error;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The buffer does not hold a complete message yet. Nothing was
    /// consumed; retry once more bytes have arrived.
    Incomplete,
    /// The head of the message is malformed: too few lines, a request line
    /// that does not consist of exactly three tokens, or a head line that is
    /// not valid UTF-8.
    InvalidPacket { consumed: usize },
    /// The `content-length` header is present but is not a non-negative
    /// base-10 integer.
    ContentLength { value: String, consumed: usize },
    /// The `transport` header is missing on a request that needs one.
    TransportMissing,
    /// Transport does not start with the `RTP/AVP` profile.
    TransportProtocolProfileMissing { value: String },
    /// Lower transport is neither `TCP` nor `UDP`.
    TransportLowerUnknown { value: String },
    /// Transport parameter is empty or otherwise unreadable.
    TransportParameterInvalid { parameter: String },
    /// Transport parameter name is not recognized.
    TransportParameterUnknown { var: String },
    /// Transport parameter requires a value but none was given.
    TransportParameterValueMissing { var: String },
    /// Transport parameter value could not be parsed.
    TransportParameterValueInvalid { var: String, val: String },
    /// Interleaved channel is not `N` or `N-M`.
    TransportChannelMalformed { value: String },
    /// Port is not `N` or `N-M`.
    TransportPortMalformed { value: String },
    /// Range header uses a unit other than `npt`.
    RangeUnitNotSupported { value: String },
    /// Range header is not of the form `unit=start-end`.
    RangeMalformed { value: String },
    /// Range header carries a `time=` parameter, which is not supported.
    RangeTimeNotSupported { value: String },
    /// NPT time value could not be parsed.
    RangeNptTimeMalformed { value: String },
    /// I/O error occurred.
    Io(io::Error),
}

impl Error {
    /// Number of bytes the caller should drop from its buffer before trying
    /// to decode again. `None` means the buffer must be kept as is.
    pub fn consumed(&self) -> Option<usize> {
        match self {
            Error::InvalidPacket { consumed } => Some(*consumed),
            Error::ContentLength { consumed, .. } => Some(*consumed),
            _ => None,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Error::Incomplete)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Incomplete => write!(f, "incomplete packet"),
            Error::InvalidPacket { consumed } => {
                write!(f, "invalid packet ({consumed} bytes)")
            }
            Error::ContentLength { value, .. } => {
                write!(f, "request has invalid value for content-length: {value}")
            }
            Error::TransportMissing => write!(f, "transport header missing"),
            Error::TransportProtocolProfileMissing { value } => {
                write!(f, "transport protocol and profile missing: {value}")
            }
            Error::TransportLowerUnknown { value } => {
                write!(f, "transport lower protocol unknown: {value}")
            }
            Error::TransportParameterInvalid { parameter } => {
                write!(f, "transport parameter invalid: {parameter}")
            }
            Error::TransportParameterUnknown { var } => {
                write!(f, "transport parameter unknown: {var}")
            }
            Error::TransportParameterValueMissing { var } => {
                write!(f, "transport parameter should have value but does not: {var}")
            }
            Error::TransportParameterValueInvalid { var, val } => {
                write!(f, "transport parameter value invalid: {val} (var: {var})")
            }
            Error::TransportChannelMalformed { value } => {
                write!(f, "transport channel malformed: {value}")
            }
            Error::TransportPortMalformed { value } => {
                write!(f, "transport port malformed: {value}")
            }
            Error::RangeUnitNotSupported { value } => {
                write!(f, "range unit not supported: {value}")
            }
            Error::RangeMalformed { value } => write!(f, "range malformed: {value}"),
            Error::RangeTimeNotSupported { value } => {
                write!(f, "range time parameter not supported: {value}")
            }
            Error::RangeNptTimeMalformed { value } => {
                write!(f, "range npt time malformed: {value}")
            }
            Error::Io(err) => write!(f, "{err}"),
        }
    }
}

impl convert::From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl error::Error for Error {}
