//! Detection of blocking calls on event threads
//!
//! Request futures run on tokio worker threads that must never block.
//! [`NonBlocking`] marks the current thread as an event thread for the
//! duration of each poll; code that is about to block calls [`check`] first
//! and gets a [`BlockingOperationError`] instead of stalling the worker.
//! Work that has to block goes through [`offload`], which runs it on the
//! blocking pool where checks pass.
//!
//! ```rust
//! use anime_service::blocking;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let leaked = blocking::non_blocking(async {
//!     blocking::sleep(Duration::from_millis(1))
//! })
//! .await;
//! assert!(leaked.is_err());
//!
//! let confined = blocking::non_blocking(async {
//!     blocking::offload(|| blocking::sleep(Duration::from_millis(1))).await
//! })
//! .await;
//! assert!(matches!(confined, Ok(Ok(()))));
//! # }
//! ```

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{extract::Request, middleware::Next, response::Response};
use thiserror::Error;

use crate::error::{Error, Result};

thread_local! {
    static POLL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// A blocking call was attempted while an event thread was polling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Blocking call `{operation}` detected on event thread {thread}")]
pub struct BlockingOperationError {
    /// What was about to block
    pub operation: &'static str,
    /// Name of the offending thread
    pub thread: String,
}

/// Future wrapper that marks its polling thread as an event thread
#[must_use = "futures do nothing unless polled"]
pub struct NonBlocking<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for NonBlocking<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _guard = EventThreadGuard::enter();
        self.inner.as_mut().poll(cx)
    }
}

struct EventThreadGuard;

impl EventThreadGuard {
    fn enter() -> Self {
        POLL_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for EventThreadGuard {
    fn drop(&mut self) {
        POLL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Wrap a future so blocking checks fail while it is being polled
pub fn non_blocking<F: Future>(future: F) -> NonBlocking<F> {
    NonBlocking {
        inner: Box::pin(future),
    }
}

/// Whether the current thread is polling a [`NonBlocking`] future
pub fn is_event_thread() -> bool {
    POLL_DEPTH.with(|depth| depth.get() > 0)
}

/// Fail if blocking here would stall an event thread
pub fn check(operation: &'static str) -> std::result::Result<(), BlockingOperationError> {
    if !is_event_thread() {
        return Ok(());
    }

    let thread = std::thread::current()
        .name()
        .unwrap_or("<unnamed>")
        .to_string();
    tracing::warn!(operation, thread = %thread, "blocking call on event thread");

    Err(BlockingOperationError { operation, thread })
}

/// Checked `thread::sleep`
pub fn sleep(duration: Duration) -> std::result::Result<(), BlockingOperationError> {
    check("thread::sleep")?;
    std::thread::sleep(duration);
    Ok(())
}

/// Run blocking work on the blocking pool
pub async fn offload<F, T>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))
}

/// Router middleware that polls the rest of the stack as an event thread
pub async fn detect_blocking(request: Request, next: Next) -> Response {
    non_blocking(next.run(request)).await
}
