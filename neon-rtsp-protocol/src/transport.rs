use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::{Error, Method};

/// Transport descriptor as carried by the `Transport` header of `SETUP`
/// requests and responses: `RTP/AVP[/TCP|/UDP]` followed by `;`-separated
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transport {
    lower: Option<Lower>,
    parameters: Vec<Parameter>,
}

impl Transport {
    const PROFILE: &'static str = "RTP/AVP";

    #[must_use]
    pub const fn new() -> Self {
        Self {
            lower: None,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_lower_protocol(mut self, lower: Lower) -> Self {
        self.lower = Some(lower);
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub const fn lower_protocol(&self) -> Option<&Lower> {
        self.lower.as_ref()
    }

    pub fn parameters_iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Lower transport in effect: UDP unless TCP was asked for.
    pub fn is_tcp(&self) -> bool {
        matches!(self.lower, Some(Lower::Tcp))
    }

    pub fn is_multicast(&self) -> bool {
        self.parameters_iter()
            .any(|parameter| *parameter == Parameter::Multicast)
    }

    pub fn destination(&self) -> Option<&IpAddr> {
        self.find(|parameter| match parameter {
            Parameter::Destination(ip_addr) => Some(ip_addr),
            _ => None,
        })
    }

    pub fn client_port(&self) -> Option<&Port> {
        self.find(|parameter| match parameter {
            Parameter::ClientPort(port) => Some(port),
            _ => None,
        })
    }

    pub fn server_port(&self) -> Option<&Port> {
        self.find(|parameter| match parameter {
            Parameter::ServerPort(port) => Some(port),
            _ => None,
        })
    }

    pub fn interleaved_channel(&self) -> Option<&Channel> {
        self.find(|parameter| match parameter {
            Parameter::Interleaved(channel) => Some(channel),
            _ => None,
        })
    }

    pub fn mode(&self) -> Option<Method> {
        self.find(|parameter| match parameter {
            Parameter::Mode(method) => Some(method),
            _ => None,
        })
        .copied()
    }

    fn find<'t, T>(&'t self, f: impl FnMut(&'t Parameter) -> Option<&'t T>) -> Option<&'t T> {
        self.parameters.iter().find_map(f)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", Self::PROFILE)?;
        if let Some(lower) = self.lower.as_ref() {
            write!(f, "/{lower}")?;
        }
        for parameter in &self.parameters {
            write!(f, ";{parameter}")?;
        }
        Ok(())
    }
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(';');
        // `split` always yields at least one item.
        let spec = parts.next().unwrap_or_default().trim();

        let mut protocol = spec.split('/');
        let profile_ok = matches!(
            (protocol.next(), protocol.next()),
            (Some(proto), Some(profile))
                if proto.eq_ignore_ascii_case("RTP") && profile.eq_ignore_ascii_case("AVP")
        );
        if !profile_ok {
            return Err(Error::TransportProtocolProfileMissing {
                value: s.to_string(),
            });
        }

        let lower = protocol.next().map(str::parse).transpose()?;
        if protocol.next().is_some() {
            return Err(Error::TransportProtocolProfileMissing {
                value: s.to_string(),
            });
        }

        let parameters = parts
            .map(str::trim)
            // Tolerate a trailing `;`.
            .filter(|parameter| !parameter.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { lower, parameters })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lower {
    Tcp,
    Udp,
}

impl fmt::Display for Lower {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

impl FromStr for Lower {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("TCP") {
            Ok(Self::Tcp)
        } else if s.eq_ignore_ascii_case("UDP") {
            Ok(Self::Udp)
        } else {
            Err(Error::TransportLowerUnknown {
                value: s.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Unicast,
    Multicast,
    Destination(IpAddr),
    Source(IpAddr),
    Interleaved(Channel),
    Append,
    Ttl(u8),
    Layers(usize),
    Port(Port),
    ClientPort(Port),
    ServerPort(Port),
    Ssrc(String),
    Mode(Method),
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unicast => write!(f, "unicast"),
            Self::Multicast => write!(f, "multicast"),
            Self::Destination(host) => write!(f, "destination={host}"),
            Self::Source(host) => write!(f, "source={host}"),
            Self::Interleaved(channel) => write!(f, "interleaved={channel}"),
            Self::Append => write!(f, "append"),
            Self::Ttl(ttl) => write!(f, "ttl={ttl}"),
            Self::Layers(layers) => write!(f, "layers={layers}"),
            Self::Port(port) => write!(f, "port={port}"),
            Self::ClientPort(port) => write!(f, "client_port={port}"),
            Self::ServerPort(port) => write!(f, "server_port={port}"),
            Self::Ssrc(ssrc) => write!(f, "ssrc={ssrc}"),
            Self::Mode(method) => write!(f, "mode=\"{method}\""),
        }
    }
}

fn parse_value<T: FromStr>(var: &str, val: Option<&str>) -> Result<T, Error> {
    let val = val.ok_or_else(|| Error::TransportParameterValueMissing {
        var: var.to_string(),
    })?;
    val.parse::<T>()
        .map_err(|_| Error::TransportParameterValueInvalid {
            var: var.to_string(),
            val: val.to_string(),
        })
}

impl FromStr for Parameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (var, val) = match s.split_once('=') {
            Some((var, val)) => (var.trim(), Some(val.trim())),
            None => (s.trim(), None),
        };

        if var.is_empty() {
            return Err(Error::TransportParameterInvalid {
                parameter: s.to_string(),
            });
        }

        match var.to_ascii_lowercase().as_str() {
            "unicast" => Ok(Self::Unicast),
            "multicast" => Ok(Self::Multicast),
            "append" => Ok(Self::Append),
            "destination" => Ok(Self::Destination(parse_value(var, val)?)),
            "source" => Ok(Self::Source(parse_value(var, val)?)),
            "interleaved" => Ok(Self::Interleaved(parse_value(var, val)?)),
            "ttl" => Ok(Self::Ttl(parse_value(var, val)?)),
            "layers" => Ok(Self::Layers(parse_value(var, val)?)),
            "port" => Ok(Self::Port(parse_value(var, val)?)),
            "client_port" => Ok(Self::ClientPort(parse_value(var, val)?)),
            "server_port" => Ok(Self::ServerPort(parse_value(var, val)?)),
            "ssrc" => Ok(Self::Ssrc(parse_value(var, val)?)),
            "mode" => {
                let val = val.map(|val| val.trim_matches('"'));
                Ok(Self::Mode(parse_value(var, val)?))
            }
            _ => Err(Error::TransportParameterUnknown {
                var: var.to_string(),
            }),
        }
    }
}

/// Interleaved channel or channel pair (`N` or `N-M`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Single(u8),
    Range(u8, u8),
}

/// Port or port pair (`N` or `N-M`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Single(u16),
    Range(u16, u16),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Single(channel) => write!(f, "{channel}"),
            Self::Range(first, second) => write!(f, "{first}-{second}"),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Single(port) => write!(f, "{port}"),
            Self::Range(first, second) => write!(f, "{first}-{second}"),
        }
    }
}

fn parse_pair<T: FromStr>(s: &str) -> Option<(T, Option<T>)> {
    match s.split_once('-') {
        Some((first, second)) => Some((first.parse().ok()?, Some(second.parse().ok()?))),
        None => Some((s.parse().ok()?, None)),
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_pair(s) {
            Some((first, Some(second))) => Ok(Self::Range(first, second)),
            Some((first, None)) => Ok(Self::Single(first)),
            None => Err(Error::TransportChannelMalformed {
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Port {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_pair(s) {
            Some((first, Some(second))) => Ok(Self::Range(first, second)),
            Some((first, None)) => Ok(Self::Single(first)),
            None => Err(Error::TransportPortMalformed {
                value: s.to_string(),
            }),
        }
    }
}
