//! # KiwiStore Async Client
//!
//! Purpose: Speak the KiwiStore line protocol (`GET`, `SET`, `REMOVE`,
//! `PING`, `LIST`, `STATS`) to a remote store over TCP.
//!
//! ## Design Principles
//! 1. **One Connection per Call**: No pooling, pipelining, or retries.
//! 2. **Validated Inputs**: Endpoints, keys, and values are checked before
//!    any network activity.
//! 3. **Bounded I/O**: Connect, write, and read each carry a timeout.
//! 4. **Explicit Framing**: Replies are read until the store closes the
//!    connection, never from a single fixed-size read.

mod client;
mod config;
mod transport;

pub use client::{
    split_keys, ClientConfig, ClientError, ClientResult, Phase, StoreClient,
    DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_TIMEOUT,
};
pub use config::{ConfigError, ConfigResult, DEFAULT_SECTION};
pub use kiwi_common::{Endpoint, InvalidArgument};
