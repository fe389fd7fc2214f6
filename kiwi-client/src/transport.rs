//! # Transport
//!
//! Purpose: Perform exactly one request/response round trip per call over a
//! fresh TCP connection.
//!
//! ## Design Principles
//! 1. **Connection per Call**: No pooling, no reuse. The stream is owned by
//!    the call future, so dropping the future (cancellation) closes it.
//! 2. **Explicit Framing**: The store sends no length prefix or terminator of
//!    its own. After the request is written the write half is shut down; the
//!    store answers and closes, and the reply is read until end-of-stream.
//! 3. **Bounded Everything**: Connect, write, and read each run under their
//!    own deadline, and the reply size is capped.

use std::future::Future;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

use kiwi_common::{Command, Endpoint};

use crate::client::{ClientConfig, ClientError, ClientResult, Phase};

/// Bytes reserved ahead of each read.
const READ_CHUNK: usize = 4 * 1024;

/// Single-shot connection factory bound to one endpoint.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    endpoint: Endpoint,
    connect_timeout: Duration,
    write_timeout: Duration,
    read_timeout: Duration,
    max_response_bytes: usize,
}

impl Transport {
    pub(crate) fn new(config: ClientConfig) -> Self {
        Transport {
            endpoint: config.endpoint,
            connect_timeout: config.connect_timeout,
            write_timeout: config.write_timeout,
            read_timeout: config.read_timeout,
            max_response_bytes: config.max_response_bytes,
        }
    }

    pub(crate) fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Sends `command` and returns the trimmed reply text.
    ///
    /// The connection is closed on every exit path, including errors and
    /// cancellation, because the stream never outlives this future.
    pub(crate) async fn round_trip(&self, command: &Command<'_>) -> ClientResult<String> {
        let started = Instant::now();
        let mut stream = self.connect().await?;

        let mut request = Vec::with_capacity(command.encoded_len());
        command.encode(&mut request);
        trace!(endpoint = %self.endpoint, request = %command, "sending request");

        with_deadline(Phase::Write, self.write_timeout, write_request(&mut stream, &request))
            .await?;

        let reply = with_deadline(
            Phase::Read,
            self.read_timeout,
            read_until_close(&mut stream, self.max_response_bytes),
        )
        .await?;
        drop(stream);

        debug!(
            endpoint = %self.endpoint,
            verb = %command.verb(),
            request_bytes = request.len(),
            response_bytes = reply.len(),
            elapsed = ?started.elapsed(),
            "round trip complete"
        );

        decode_reply(&reply)
    }

    async fn connect(&self) -> ClientResult<TcpStream> {
        let stream = with_deadline(Phase::Connect, self.connect_timeout, self.open()).await?;

        // Requests are a single small line; do not let Nagle hold them back.
        stream.set_nodelay(true)?;
        debug!(endpoint = %self.endpoint, "connected");
        Ok(stream)
    }

    async fn open(&self) -> ClientResult<TcpStream> {
        let target = (self.endpoint.host(), self.endpoint.port());
        TcpStream::connect(target).await.map_err(|source| {
            warn!(endpoint = %self.endpoint, error = %source, "connect failed");
            ClientError::Connect {
                endpoint: self.endpoint.to_string(),
                source,
            }
        })
    }
}

/// Runs `operation` under `limit`, mapping expiry to a phase-tagged timeout.
async fn with_deadline<T, F>(phase: Phase, limit: Duration, operation: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%phase, ?limit, "deadline exceeded");
            Err(ClientError::Timeout { phase, limit })
        }
    }
}

/// Writes the full request and half-closes the write side.
async fn write_request<W>(stream: &mut W, request: &[u8]) -> ClientResult<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(request).await?;
    stream.flush().await?;
    stream.shutdown().await?;
    Ok(())
}

/// Reads until the peer closes, failing once more than `limit` bytes arrive.
pub(crate) async fn read_until_close<R>(stream: &mut R, limit: usize) -> ClientResult<BytesMut>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(READ_CHUNK);
    loop {
        buffer.reserve(READ_CHUNK);
        let read = stream.read_buf(&mut buffer).await?;
        if read == 0 {
            return Ok(buffer);
        }
        if buffer.len() > limit {
            return Err(ClientError::ResponseTooLarge { limit });
        }
    }
}

/// Decodes UTF-8 and strips surrounding whitespace.
pub(crate) fn decode_reply(reply: &[u8]) -> ClientResult<String> {
    let text = std::str::from_utf8(reply).map_err(|_| ClientError::InvalidUtf8)?;
    Ok(text.trim().to_string())
}
