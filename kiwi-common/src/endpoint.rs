//! # Endpoint Descriptor
//!
//! Purpose: Identify the remote store as a validated `(host, port)` pair.
//!
//! ## Design Principles
//! 1. **Single Gate**: Every construction path (explicit, parsed from
//!    `"host:port"`, or deserialized from a configuration section) funnels
//!    through [`Endpoint::new`].
//! 2. **Immutable Value**: Fields are private; an endpoint never changes after
//!    construction and can be shared freely between concurrent calls.
//! 3. **Deployment Range**: Ports must be in `(5000, 65535]`, the store's
//!    deployment convention, not the generic TCP range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArgResult, InvalidArgument};

/// Host used when no configuration is supplied.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port used when no configuration is supplied.
pub const DEFAULT_PORT: u16 = 5555;

/// Ports at or below this value are rejected.
pub const PORT_FLOOR: u32 = 5000;

/// Highest accepted port.
pub const PORT_CEILING: u32 = 65535;

/// Validated network address of the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EndpointSection", into = "EndpointSection")]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint, rejecting an empty host or an out-of-range port.
    ///
    /// # Examples
    /// ```rust
    /// use kiwi_common::{Endpoint, InvalidArgument};
    ///
    /// let endpoint = Endpoint::new("10.0.0.7", 6000).expect("valid endpoint");
    /// assert_eq!(endpoint.to_string(), "10.0.0.7:6000");
    ///
    /// assert_eq!(
    ///     Endpoint::new("10.0.0.7", 80),
    ///     Err(InvalidArgument::PortOutOfRange { port: 80 })
    /// );
    /// ```
    pub fn new(host: impl Into<String>, port: u32) -> ArgResult<Self> {
        let host: String = host.into();
        let host = host.trim();
        if host.is_empty() {
            return Err(InvalidArgument::EmptyHost);
        }
        if port <= PORT_FLOOR || port > PORT_CEILING {
            return Err(InvalidArgument::PortOutOfRange { port });
        }

        Ok(Endpoint {
            host: host.to_string(),
            port: port as u16,
        })
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 literals need brackets to keep the port separator unambiguous.
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = InvalidArgument;

    /// Parses `"host:port"` (or `"[v6]:port"`) into a validated endpoint.
    fn from_str(text: &str) -> ArgResult<Self> {
        let malformed = || InvalidArgument::MalformedAddress(text.to_string());
        let text = text.trim();

        let (host, port) = if let Some(rest) = text.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(malformed)?;
            let port = tail.strip_prefix(':').ok_or_else(malformed)?;
            (host, port)
        } else {
            text.rsplit_once(':').ok_or_else(malformed)?
        };

        let port: u32 = port.parse().map_err(|_| malformed())?;
        Endpoint::new(host, port)
    }
}

/// Raw configuration shape; only reachable through `TryFrom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EndpointSection {
    #[serde(rename = "Host", default = "default_host")]
    host: String,
    #[serde(rename = "Port", default = "default_port")]
    port: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u32 {
    u32::from(DEFAULT_PORT)
}

impl TryFrom<EndpointSection> for Endpoint {
    type Error = InvalidArgument;

    fn try_from(section: EndpointSection) -> ArgResult<Self> {
        Endpoint::new(section.host, section.port)
    }
}

impl From<Endpoint> for EndpointSection {
    fn from(endpoint: Endpoint) -> Self {
        EndpointSection {
            host: endpoint.host,
            port: u32::from(endpoint.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_loopback_5555() {
        let endpoint = Endpoint::default();
        assert_eq!(endpoint.host(), "127.0.0.1");
        assert_eq!(endpoint.port(), 5555);
        assert_eq!(endpoint.to_string(), "127.0.0.1:5555");
    }

    #[test]
    fn rejects_ports_outside_deployment_range() {
        for port in [0, 80, 5000, 65536, 70000] {
            assert_eq!(
                Endpoint::new("localhost", port),
                Err(InvalidArgument::PortOutOfRange { port })
            );
        }
        assert!(Endpoint::new("localhost", 5001).is_ok());
        assert!(Endpoint::new("localhost", 65535).is_ok());
    }

    #[test]
    fn rejects_empty_host() {
        assert_eq!(Endpoint::new("", 5555), Err(InvalidArgument::EmptyHost));
        assert_eq!(Endpoint::new("   ", 5555), Err(InvalidArgument::EmptyHost));
    }

    #[test]
    fn parses_host_port_text() {
        let endpoint: Endpoint = "store.internal:6001".parse().unwrap();
        assert_eq!(endpoint.host(), "store.internal");
        assert_eq!(endpoint.port(), 6001);

        let v6: Endpoint = "[::1]:5555".parse().unwrap();
        assert_eq!(v6.host(), "::1");
        assert_eq!(v6.to_string(), "[::1]:5555");
    }

    #[test]
    fn parsed_text_is_still_validated() {
        assert_eq!(
            "localhost:80".parse::<Endpoint>(),
            Err(InvalidArgument::PortOutOfRange { port: 80 })
        );
        assert_eq!(":5555".parse::<Endpoint>(), Err(InvalidArgument::EmptyHost));
        assert!(matches!(
            "localhost".parse::<Endpoint>(),
            Err(InvalidArgument::MalformedAddress(_))
        ));
        assert!(matches!(
            "localhost:http".parse::<Endpoint>(),
            Err(InvalidArgument::MalformedAddress(_))
        ));
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let endpoint: Endpoint =
            serde_json::from_str(r#"{"Host": "10.1.1.1", "Port": 7000}"#).unwrap();
        assert_eq!(endpoint, Endpoint::new("10.1.1.1", 7000).unwrap());

        let defaults: Endpoint = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, Endpoint::default());

        let err = serde_json::from_str::<Endpoint>(r#"{"Port": 70000}"#).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
