//! Time budgets for external tool invocations.
//!
//! Every subprocess runs under a `TimeoutConfig`. An expired budget becomes
//! `RevscopeError::Timeout`, which callers treat as a recoverable failure.

use crate::error::{Result, RevscopeError};
use std::future::Future;
use std::thread;
use std::time::Duration;
use tokio::runtime::{Builder, Handle};
use tracing::{debug, warn};

/// Unpacker budget in seconds
pub const UNPACK_TIMEOUT_SECONDS: u64 = 60;

/// Decompiler budget in seconds
pub const DECOMPILE_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub budget: Duration,
    /// Name used in log events.
    pub operation: String,
}

impl TimeoutConfig {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self::from_duration(Duration::from_secs(seconds), operation)
    }

    pub fn from_duration(budget: Duration, operation: impl Into<String>) -> Self {
        Self {
            budget,
            operation: operation.into(),
        }
    }
}

/// Await `future`, giving up once the budget is spent.
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(operation = %config.operation, budget = ?config.budget, "Starting bounded operation");
    match tokio::time::timeout(config.budget, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation = %config.operation, budget = ?config.budget, "Operation timed out");
            Err(RevscopeError::Timeout {
                budget: config.budget,
            })
        }
    }
}

/// Drive `future` to completion from synchronous code on a private
/// current-thread runtime.
///
/// Callers already inside a tokio runtime cannot block on a second one in
/// place, so in that case the work moves to a scoped thread.
pub fn block_on_bounded<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send,
    T: Send,
{
    if Handle::try_current().is_err() {
        return run_isolated(config, future);
    }
    thread::scope(|scope| {
        scope
            .spawn(move || run_isolated(config, future))
            .join()
            .unwrap_or_else(|_| {
                Err(RevscopeError::ToolInvocation(
                    "bounded operation panicked".into(),
                ))
            })
    })
}

fn run_isolated<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(with_timeout(config, future))
}
