//! Startup discovery of the managed database host.
//!
//! The address is looked up through the `aws` CLI and polled until the
//! instance reports one. Polling never gives up on its own; it stops on
//! success or when the supplied [`CancellationToken`] fires.

use crate::error::DirectoryError;
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub const DB_INSTANCE_IDENTIFIER: &str = "clarusway";
pub const AWS_REGION: &str = "us-east-1";

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const TOOL_MISSING_INTERVAL: Duration = Duration::from_secs(60);

/// Host of the managed database, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress(String);

impl ResolvedAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What one lookup invocation produced.
#[derive(Debug, Clone)]
pub struct LookupOutput {
    pub success: bool,
    pub stdout: String,
}

impl From<std::process::Output> for LookupOutput {
    fn from(out: std::process::Output) -> Self {
        Self {
            success: out.status.success(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        }
    }
}

/// Source of the instance address.
pub trait EndpointLookup: Send + Sync {
    fn lookup(&self) -> impl Future<Output = io::Result<LookupOutput>> + Send;
}

/// Runs `aws rds describe-db-instances` for one instance, text output.
#[derive(Debug, Clone)]
pub struct AwsCliLookup {
    program: String,
    instance: String,
    region: String,
}

impl Default for AwsCliLookup {
    fn default() -> Self {
        Self::new(DB_INSTANCE_IDENTIFIER, AWS_REGION)
    }
}

impl AwsCliLookup {
    pub fn new(instance: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            program: "aws".to_string(),
            instance: instance.into(),
            region: region.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn args(&self) -> [&str; 10] {
        [
            "rds",
            "describe-db-instances",
            "--db-instance-identifier",
            &self.instance,
            "--query",
            "DBInstances[0].Endpoint.Address",
            "--region",
            &self.region,
            "--output",
            "text",
        ]
    }
}

impl EndpointLookup for AwsCliLookup {
    async fn lookup(&self) -> io::Result<LookupOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args());
        run_lookup(cmd).await
    }
}

/// Run `cmd` to completion. Dropping the future kills the child, so a
/// cancelled attempt does not leave the process behind.
async fn run_lookup(mut cmd: Command) -> io::Result<LookupOutput> {
    let out = cmd.kill_on_drop(true).output().await?;
    Ok(out.into())
}

/// Classification of a single lookup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStatus {
    Ready(String),
    NotReady,
    ToolMissing,
    Unexpected(String),
}

impl LookupStatus {
    pub fn classify(result: io::Result<LookupOutput>) -> Self {
        match result {
            Ok(out) => {
                let endpoint = out.stdout.trim();
                if out.success
                    && !endpoint.is_empty()
                    && endpoint != "None"
                    && !endpoint.contains("Error")
                {
                    LookupStatus::Ready(endpoint.to_string())
                } else {
                    LookupStatus::NotReady
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => LookupStatus::ToolMissing,
            Err(e) => LookupStatus::Unexpected(e.to_string()),
        }
    }
}

/// Waits between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub poll_interval: Duration,
    pub tool_missing_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            tool_missing_interval: TOOL_MISSING_INTERVAL,
        }
    }
}

pub struct EndpointResolver<L> {
    lookup: L,
    policy: PollPolicy,
}

impl EndpointResolver<AwsCliLookup> {
    pub fn aws() -> Self {
        Self::new(AwsCliLookup::default(), PollPolicy::default())
    }
}

impl<L: EndpointLookup> EndpointResolver<L> {
    pub fn new(lookup: L, policy: PollPolicy) -> Self {
        Self { lookup, policy }
    }

    /// Poll until the instance reports an address.
    ///
    /// Returns [`DirectoryError::Cancelled`] if `token` fires first, whether
    /// during a lookup or a wait.
    pub async fn resolve(
        &self,
        token: &CancellationToken,
    ) -> Result<ResolvedAddress, DirectoryError> {
        if token.is_cancelled() {
            return Err(DirectoryError::Cancelled);
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            info!(
                attempt,
                instance = DB_INSTANCE_IDENTIFIER,
                "polling for database endpoint"
            );

            let result = tokio::select! {
                biased;
                () = token.cancelled() => return Err(DirectoryError::Cancelled),
                result = self.lookup.lookup() => result,
            };

            let wait = match LookupStatus::classify(result) {
                LookupStatus::Ready(address) => {
                    info!(attempt, endpoint = %address, "database endpoint resolved");
                    return Ok(ResolvedAddress(address));
                }
                LookupStatus::ToolMissing => {
                    let wait = self.policy.tool_missing_interval;
                    error!(
                        "aws CLI not found; ensure it is installed and in PATH. Retrying in {:?}",
                        wait
                    );
                    wait
                }
                LookupStatus::Unexpected(e) => {
                    let wait = self.policy.poll_interval;
                    warn!(
                        "unexpected error while polling endpoint: {}. Retrying in {:?}",
                        e, wait
                    );
                    wait
                }
                LookupStatus::NotReady => {
                    let wait = self.policy.poll_interval;
                    warn!(
                        "endpoint not yet resolved or database not available. Retrying in {:?}",
                        wait
                    );
                    wait
                }
            };

            tokio::select! {
                biased;
                () = token.cancelled() => return Err(DirectoryError::Cancelled),
                () = tokio::time::sleep(wait) => {}
            }
        }
    }
}
