// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Waiting on in-flight requests.
//!
//! Every request runs as its own task on a tokio runtime. The task owns the
//! request and reports through a one-shot channel; a [`PendingOperation`]
//! only holds the receiving end. Dropping it, on completion or after a
//! timeout, never touches the task itself.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use azblob_core::Result;
use bytes::Bytes;
use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use crate::{Reply, ReplyCode};

/// Terminal state of an operation.
#[derive(Debug)]
pub enum Outcome {
    /// The service replied, with any status.
    Completed(Reply),
    /// No reply, the transport failed.
    TransportError(ReplyCode),
    /// No reply within the wait.
    Timeout,
}

impl Outcome {
    /// Result code of the outcome.
    pub fn code(&self) -> ReplyCode {
        match self {
            Outcome::Completed(reply) => reply.code(),
            Outcome::TransportError(code) => *code,
            Outcome::Timeout => ReplyCode::Timeout,
        }
    }

    /// The reply, if the service sent one.
    pub fn into_reply(self) -> Option<Reply> {
        match self {
            Outcome::Completed(reply) => Some(reply),
            _ => None,
        }
    }
}

/// Handle of an in-flight request.
///
/// Await it to get the [`Outcome`], or hand it to [`SyncBridge::wait`].
#[derive(Debug)]
#[must_use = "dropping a pending operation discards its outcome"]
pub struct PendingOperation {
    rx: oneshot::Receiver<Result<http::Response<Bytes>>>,
    abort: AbortHandle,
}

impl PendingOperation {
    /// Run `fut` as a task on `handle`.
    pub(crate) fn spawn<F>(handle: &Handle, fut: F) -> Self
    where
        F: Future<Output = Result<http::Response<Bytes>>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let task = handle.spawn(async move {
            // Nobody listens anymore after a timeout.
            if tx.send(fut.await).is_err() {
                debug!("operation completed after its waiter left");
            }
        });

        Self {
            rx,
            abort: task.abort_handle(),
        }
    }

    /// Whether the request task has finished.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }

    /// Stop the request task.
    ///
    /// The request may already be on the wire; only the local side stops.
    pub fn cancel(self) {
        self.abort.abort();
    }
}

impl Future for PendingOperation {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let outcome = match Pin::new(&mut self.rx).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(Ok(resp))) => Outcome::Completed(Reply::from(resp)),
            Poll::Ready(Ok(Err(err))) => {
                warn!("operation failed: {err}");
                Outcome::TransportError(ReplyCode::from_error(&err))
            }
            // The task was aborted before it reported.
            Poll::Ready(Err(_)) => Outcome::TransportError(ReplyCode::OperationCanceled),
        };
        Poll::Ready(outcome)
    }
}

/// What [`SyncBridge::wait`] does with an operation that timed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Leave the request running and discard its outcome.
    #[default]
    Abandon,
    /// Abort the request task.
    Cancel,
}

/// Blocks the calling thread until an operation finishes or a wait elapses.
///
/// The handle must belong to a multi-thread runtime, and `wait` must not be
/// called from inside an async context.
#[derive(Debug, Clone)]
pub struct SyncBridge {
    handle: Handle,
    policy: TimeoutPolicy,
}

impl SyncBridge {
    /// Create a bridge over the runtime of `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            policy: TimeoutPolicy::default(),
        }
    }

    /// Set the timeout policy.
    pub fn with_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The timeout policy in use.
    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Wait at most `timeout` for `pending`.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn wait(&self, mut pending: PendingOperation, timeout: Duration) -> Outcome {
        let waited = self
            .handle
            .block_on(async { tokio::time::timeout(timeout, &mut pending).await });
        match waited {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("operation timed out after {timeout:?}, policy {:?}", self.policy);
                if self.policy == TimeoutPolicy::Cancel {
                    pending.cancel();
                }
                Outcome::Timeout
            }
        }
    }
}
