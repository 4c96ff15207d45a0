// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot completion channel between a native SDK callback and the host.
//
// Every long-running host call gets its own `(Resolver, PendingRequest)`
// pair. The SDK side settles the resolver from whichever thread its callback
// runs on; the host side awaits (or blocks on) the pending request.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use airship_core::error::AirshipError;
use airship_core::types::RequestId;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

/// Host-visible promise rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub code: String,
    pub message: String,
}

impl Rejection {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<AirshipError> for Rejection {
    fn from(err: AirshipError) -> Self {
        Self::new(err.reject_code(), err.to_string())
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Outcome of a host promise.
pub type HostResult<T> = std::result::Result<T, Rejection>;

/// Create a linked resolver / pending-request pair.
pub fn request<T>() -> (Resolver<T>, PendingRequest<T>) {
    let id = RequestId::new();
    let (tx, rx) = oneshot::channel();
    (Resolver { id, tx }, PendingRequest { id, rx })
}

/// Completion half, handed to the native callback.
///
/// Dropping it unsettled rejects the request with `STATUS_EXECUTION_ERROR`.
pub struct Resolver<T> {
    id: RequestId,
    tx: oneshot::Sender<HostResult<T>>,
}

impl<T> Resolver<T> {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    pub fn reject(self, rejection: impl Into<Rejection>) {
        self.settle(Err(rejection.into()));
    }

    pub fn settle(self, outcome: HostResult<T>) {
        if self.tx.send(outcome).is_err() {
            debug!(request = %self.id, "request abandoned by host");
        }
    }
}

/// Awaitable half, held by the host.
pub struct PendingRequest<T> {
    id: RequestId,
    rx: oneshot::Receiver<HostResult<T>>,
}

impl<T> PendingRequest<T> {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Block the current thread until settled. Must not be called from
    /// inside an async runtime.
    pub fn blocking_wait(self) -> HostResult<T> {
        self.rx.blocking_recv().unwrap_or_else(|_| Err(abandoned()))
    }

    /// Settled value if the resolver has already completed.
    pub fn try_take(&mut self) -> Option<HostResult<T>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(abandoned())),
        }
    }
}

impl<T> Future for PendingRequest<T> {
    type Output = HostResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(abandoned())))
    }
}

fn abandoned() -> Rejection {
    Rejection::new(
        "STATUS_EXECUTION_ERROR",
        "native callback dropped without completing",
    )
}
