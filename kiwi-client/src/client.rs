//! # Async Client API
//!
//! Purpose: Expose the store operations (`get`, `set`, `remove`, `ping`,
//! `list`, `stats`) as async calls over the line protocol.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `StoreClient` hides encoding and transport details.
//! 2. **Stateless Calls**: Every operation is an independent exchange on its
//!    own connection; the client holds only read-only configuration.
//! 3. **Opaque Replies**: Reply text is returned as-is after trimming. Only
//!    `get` (empty means missing) and `list` (newline-delimited) interpret it.
//! 4. **No Hidden Retries**: Every failure reaches the caller unchanged.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

use kiwi_common::{Command, Endpoint, InvalidArgument};

use crate::transport::Transport;

/// Result type for the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Stage of a round trip, used to tag timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Write,
    Read,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Connect => "connect",
            Phase::Write => "write",
            Phase::Read => "read",
        })
    }
}

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Key, value, or address rejected before any network activity.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    /// Client configuration is unusable (e.g. a zero timeout).
    #[error("invalid client configuration: {0}")]
    InvalidConfig(&'static str),
    /// The connection could not be established (refused, unreachable, DNS).
    #[error("could not connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// A stage did not finish within its bound.
    #[error("{phase} timed out after {limit:?}")]
    Timeout { phase: Phase, limit: Duration },
    /// Network failure on an established connection.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The reply exceeded the configured size cap.
    #[error("response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },
    /// The reply was not valid UTF-8.
    #[error("response is not valid UTF-8")]
    InvalidUtf8,
}

impl ClientError {
    /// True for deadline expiry in any phase.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    /// True when no connection could be opened.
    pub fn is_connect(&self) -> bool {
        matches!(self, ClientError::Connect { .. })
    }
}

/// Default bound for each of connect, write, and read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cap on a single reply.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Store address, validated on construction.
    pub endpoint: Endpoint,
    /// Bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Bound on writing the request line.
    pub write_timeout: Duration,
    /// Bound on reading the whole reply.
    pub read_timeout: Duration,
    /// Replies larger than this fail with `ResponseTooLarge`.
    pub max_response_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: Endpoint::default(),
            connect_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl ClientConfig {
    /// Default configuration aimed at `endpoint`.
    pub fn for_endpoint(endpoint: Endpoint) -> Self {
        ClientConfig {
            endpoint,
            ..ClientConfig::default()
        }
    }

    /// Applies the same bound to connect, write, and read.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.write_timeout = timeout;
        self.read_timeout = timeout;
        self
    }

    fn validate(&self) -> ClientResult<()> {
        if self.connect_timeout.is_zero() {
            return Err(ClientError::InvalidConfig("connect timeout must be non-zero"));
        }
        if self.write_timeout.is_zero() {
            return Err(ClientError::InvalidConfig("write timeout must be non-zero"));
        }
        if self.read_timeout.is_zero() {
            return Err(ClientError::InvalidConfig("read timeout must be non-zero"));
        }
        if self.max_response_bytes == 0 {
            return Err(ClientError::InvalidConfig("max response bytes must be non-zero"));
        }
        Ok(())
    }
}

/// Async client for the store.
///
/// Cloning is cheap and clones are fully independent; concurrent calls each
/// open their own connection, so no locking is involved.
///
/// # Missing keys versus empty values
///
/// The protocol carries no status code. `get` reports `None` when the store
/// answers with nothing, which is indistinguishable from a key whose stored
/// value is blank. `set` refuses empty values so this client never creates
/// such keys, but other writers might.
///
/// The reference KiwiStore server does not send an empty reply for a missing
/// key: it answers `NOT FOUND`, and `get` returns that text as
/// `Some("NOT FOUND")`. The client never interprets reply text beyond the
/// empty check, so callers talking to that server must compare against the
/// marker themselves.
#[derive(Debug, Clone)]
pub struct StoreClient {
    transport: Transport,
}

impl StoreClient {
    /// Creates a client with a custom configuration. No connection is opened.
    pub fn with_config(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(StoreClient {
            transport: Transport::new(config),
        })
    }

    /// Creates a client for `endpoint` with default timeouts.
    pub fn new(endpoint: Endpoint) -> Self {
        StoreClient {
            transport: Transport::new(ClientConfig::for_endpoint(endpoint)),
        }
    }

    /// Creates a client from `"host:port"` text, validated like any endpoint.
    pub fn for_address(addr: &str) -> ClientResult<Self> {
        let endpoint: Endpoint = addr.parse()?;
        Ok(StoreClient::new(endpoint))
    }

    /// Store address this client talks to.
    pub fn endpoint(&self) -> &Endpoint {
        self.transport.endpoint()
    }

    /// Fetches a value by key.
    ///
    /// Returns `Ok(None)` when the store replies with an empty payload.
    pub async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let reply = self.transport.round_trip(&Command::get(key)?).await?;
        if reply.is_empty() {
            Ok(None)
        } else {
            Ok(Some(reply))
        }
    }

    /// Stores `value` under `key`. Returns the store's acknowledgment text.
    pub async fn set(&self, key: &str, value: &str) -> ClientResult<String> {
        self.transport.round_trip(&Command::set(key, value)?).await
    }

    /// Removes a key. Returns the store's confirmation text verbatim.
    pub async fn remove(&self, key: &str) -> ClientResult<String> {
        self.transport.round_trip(&Command::remove(key)?).await
    }

    /// Health check. Returns the raw reply (e.g. `PONG`).
    pub async fn ping(&self) -> ClientResult<String> {
        self.transport.round_trip(&Command::ping()).await
    }

    /// Lists stored keys, one entry per non-empty reply line.
    pub async fn list(&self) -> ClientResult<Vec<String>> {
        let reply = self.list_raw().await?;
        Ok(split_keys(&reply))
    }

    /// Returns the unsplit `LIST` reply.
    pub async fn list_raw(&self) -> ClientResult<String> {
        self.transport.round_trip(&Command::list()).await
    }

    /// Fetches the store's human-readable statistics line.
    pub async fn stats(&self) -> ClientResult<String> {
        self.transport.round_trip(&Command::stats()).await
    }
}

/// Splits a `LIST` reply into keys, discarding blank lines.
pub fn split_keys(reply: &str) -> Vec<String> {
    reply
        .split('\n')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
