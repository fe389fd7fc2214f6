//! # Workload Runner
//!
//! Purpose: Drive `clients` concurrent tasks, each issuing `commands` requests
//! back to back, and collect one [`Sample`] per request.
//!
//! ## Design Principles
//! 1. **Real Client Path**: Load runs go through [`StoreClient`], so every
//!    command is validated and framed exactly as applications do it.
//! 2. **Raw Fuzz Path**: Fuzz lines are deliberately unrepresentable through
//!    the client; they are written straight to a socket with the same
//!    write/half-close/read-to-EOF exchange and a per-request deadline.
//! 3. **Independent Tasks**: Tasks share nothing mutable; samples are merged
//!    after every task has joined.

use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use kiwi_client::{ClientError, Endpoint, StoreClient};

use crate::metrics::{Metrics, Outcome, Sample, TestKind};
use crate::workload;

/// Replies longer than this are cut off in fuzz runs.
const FUZZ_REPLY_LIMIT: u64 = 64 * 1024;

/// Replies starting with this prefix mean the store refused the command.
const ERROR_PREFIX: &str = "ERROR";

/// Shape of a run.
#[derive(Debug, Clone, Copy)]
pub struct RunPlan {
    pub clients: usize,
    pub commands_per_client: usize,
}

/// Issues valid `SET` commands through `client`.
pub async fn run_load(client: &StoreClient, plan: RunPlan) -> Metrics {
    let client = client.clone();
    let samples = drive(plan, move |task, step| {
        let client = client.clone();
        async move {
            let (key, value) = workload::store_entry(task, step);
            trace!(task, step, key, "SET");
            classify_client(client.set(key, value).await)
        }
    })
    .await;
    Metrics::from_samples(TestKind::Load, &samples)
}

/// Sends malformed raw lines to `endpoint`, bounding each exchange by `limit`.
pub async fn run_fuzz(endpoint: &Endpoint, limit: Duration, plan: RunPlan) -> Metrics {
    let endpoint = endpoint.clone();
    let samples = drive(plan, move |task, step| {
        let endpoint = endpoint.clone();
        async move {
            let line = workload::fuzz_line(task, step);
            trace!(task, step, line, "fuzz");
            classify_raw(send_raw(&endpoint, line, limit).await)
        }
    })
    .await;
    Metrics::from_samples(TestKind::Fuzz, &samples)
}

async fn drive<F, Fut>(plan: RunPlan, issue: F) -> Vec<Sample>
where
    F: Fn(usize, usize) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let mut handles = Vec::with_capacity(plan.clients);
    for task in 0..plan.clients {
        let issue = issue.clone();
        handles.push(tokio::spawn(async move {
            let mut samples = Vec::with_capacity(plan.commands_per_client);
            for step in 0..plan.commands_per_client {
                let started = Instant::now();
                let outcome = issue(task, step).await;
                samples.push(Sample {
                    outcome,
                    latency: started.elapsed(),
                });
            }
            samples
        }));
    }

    let mut samples = Vec::with_capacity(plan.clients * plan.commands_per_client);
    for handle in handles {
        match handle.await {
            Ok(task_samples) => samples.extend(task_samples),
            Err(err) => debug!(error = %err, "bench task aborted"),
        }
    }
    samples
}

fn classify_client(result: Result<String, ClientError>) -> Outcome {
    match result {
        Ok(reply) if reply.starts_with(ERROR_PREFIX) => Outcome::Rejected,
        Ok(_) => Outcome::Success,
        Err(ClientError::InvalidArgument(_)) => Outcome::Rejected,
        Err(err) => {
            debug!(error = %err, "request failed");
            Outcome::Error
        }
    }
}

fn classify_raw(result: io::Result<String>) -> Outcome {
    match result {
        Ok(reply) if reply.starts_with(ERROR_PREFIX) => Outcome::Rejected,
        Ok(_) => Outcome::Success,
        Err(err) => {
            debug!(error = %err, "fuzz exchange failed");
            Outcome::Error
        }
    }
}

/// One raw exchange: write `line`, half-close, read until the store closes.
async fn send_raw(endpoint: &Endpoint, line: &str, limit: Duration) -> io::Result<String> {
    let exchange = async {
        let mut stream = TcpStream::connect((endpoint.host(), endpoint.port())).await?;
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        stream.shutdown().await?;

        let mut reply = Vec::new();
        (&mut stream).take(FUZZ_REPLY_LIMIT).read_to_end(&mut reply).await?;
        Ok::<_, io::Error>(String::from_utf8_lossy(&reply).trim().to_string())
    };

    tokio::time::timeout(limit, exchange)
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "fuzz exchange timed out"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Accepts forever; `SET`/`PING` get `OK`, anything else an error line.
    async fn spawn_store() -> Endpoint {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    if stream.read_to_end(&mut request).await.is_err() {
                        return;
                    }
                    let request = String::from_utf8_lossy(&request);
                    let verb = request.split_whitespace().next().unwrap_or("").to_uppercase();
                    let reply = match verb.as_str() {
                        "SET" | "PING" => "OK\n".to_string(),
                        other => format!("ERROR: Unknown command '{}'\n", other),
                    };
                    let _ = stream.write_all(reply.as_bytes()).await;
                });
            }
        });
        Endpoint::new(addr.ip().to_string(), u32::from(addr.port())).unwrap()
    }

    fn plan() -> RunPlan {
        RunPlan {
            clients: 4,
            commands_per_client: 5,
        }
    }

    #[tokio::test]
    async fn load_run_counts_every_set_as_success() {
        let client = StoreClient::new(spawn_store().await);
        let metrics = run_load(&client, plan()).await;

        assert_eq!(metrics.test_type, TestKind::Load);
        assert_eq!(metrics.total_commands, 20);
        assert_eq!(metrics.successful_commands, 20);
        assert_eq!(metrics.failed_commands, 0);
    }

    #[tokio::test]
    async fn fuzz_run_counts_rejections_as_failures() {
        let endpoint = spawn_store().await;
        let metrics = run_fuzz(&endpoint, Duration::from_secs(2), plan()).await;

        assert_eq!(metrics.total_commands, 20);
        assert_eq!(metrics.successful_commands, 0);
        assert_eq!(metrics.failed_commands, 20);
        assert_eq!(metrics.transport_errors, 0);
    }

    #[tokio::test]
    async fn unreachable_store_counts_transport_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let endpoint = Endpoint::new(addr.ip().to_string(), u32::from(addr.port())).unwrap();

        let metrics = run_fuzz(&endpoint, Duration::from_secs(1), plan()).await;
        assert_eq!(metrics.failed_commands, 20);
        assert_eq!(metrics.transport_errors, 20);

        let metrics = run_load(&StoreClient::new(endpoint), plan()).await;
        assert_eq!(metrics.transport_errors, 20);
    }

    #[test]
    fn client_argument_errors_are_rejections() {
        let err = ClientError::InvalidArgument(kiwi_client::InvalidArgument::EmptyKey);
        assert_eq!(classify_client(Err(err)), Outcome::Rejected);
        assert_eq!(classify_client(Ok("ERROR: nope".into())), Outcome::Rejected);
        assert_eq!(classify_client(Ok("OK".into())), Outcome::Success);
    }
}
