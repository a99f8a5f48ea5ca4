//! Background refresh coordination.
//!
//! One worker task per cache owns refresh execution. It converts two event
//! sources — the interval timer and unknown-`kid` demands — into a
//! serialized, rate-limited stream of fetches, and signals completion to
//! each demanding caller.
//!
//! The request queue has capacity one with non-blocking offer semantics:
//! a timer tick that finds the slot occupied is dropped, and a demand that
//! finds it occupied fails fast instead of piling up. Within the rate-limit
//! window, demands are answered immediately without fetching and coalesced
//! into a single deferred refresh, which bounds the work an attacker can
//! trigger with forged key IDs.

use std::ops::ControlFlow;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, Sleep};

use crate::config::ErrorHandler;
use crate::fetch::Fetcher;

/// One queued demand for a refresh.
///
/// Scheduled (timer) requests carry no completion handle; demand requests
/// carry a one-shot handle that is signalled when the refresh completes or
/// is skipped. Dropping the handle also releases the waiter, which is how
/// shutdown avoids hanging callers.
pub(crate) struct RefreshRequest {
    done: Option<oneshot::Sender<()>>,
}

impl RefreshRequest {
    /// A timer-initiated request with no caller waiting on it.
    pub(crate) fn scheduled() -> Self {
        Self { done: None }
    }

    /// A caller-initiated request plus the handle the caller waits on.
    pub(crate) fn demand() -> (Self, oneshot::Receiver<()>) {
        let (done, completion) = oneshot::channel();
        (Self { done: Some(done) }, completion)
    }

    fn complete(self) {
        if let Some(done) = self.done {
            let _ = done.send(());
        }
    }
}

pub(crate) struct RefreshWorker {
    fetcher: Arc<Fetcher>,
    interval: Option<Duration>,
    rate_limit: Option<Duration>,
    error_handler: Option<ErrorHandler>,
    requests: mpsc::Receiver<RefreshRequest>,
    /// Sender side of `requests`, used by the timer to share the same
    /// single-slot queue as demand refreshes.
    feedback: mpsc::Sender<RefreshRequest>,
    shutdown: watch::Receiver<bool>,
    /// Completion time of the most recent refresh attempt. Owned by the
    /// worker; no other component reads it.
    last_refresh: Option<Instant>,
}

impl RefreshWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        fetcher: Arc<Fetcher>,
        interval: Option<Duration>,
        rate_limit: Option<Duration>,
        error_handler: Option<ErrorHandler>,
        requests: mpsc::Receiver<RefreshRequest>,
        feedback: mpsc::Sender<RefreshRequest>,
        shutdown: watch::Receiver<bool>,
        last_refresh: Option<Instant>,
    ) -> Self {
        Self {
            fetcher,
            interval,
            rate_limit,
            error_handler,
            requests,
            feedback,
            shutdown,
            last_refresh,
        }
    }

    /// Runs until the shutdown signal fires or the request channel closes.
    pub(crate) async fn run(mut self) {
        tracing::debug!("JWK Set refresh worker started");

        let mut ticker = self
            .interval
            .map(|period| tokio::time::interval_at(Instant::now() + period, period));
        // Armed while a rate-limited refresh is deferred; at most one is
        // pending at any time.
        let mut deferred: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                _ = async { ticker.as_mut().expect("branch guarded").tick().await },
                    if ticker.is_some() =>
                {
                    if self.feedback.try_send(RefreshRequest::scheduled()).is_err() {
                        tracing::trace!("refresh already queued, dropping timer tick");
                    }
                }
                _ = async { deferred.as_mut().expect("branch guarded").as_mut().await },
                    if deferred.is_some() =>
                {
                    deferred = None;
                    if self.refresh(None).await.is_break() {
                        break;
                    }
                }
                request = self.requests.recv() => {
                    let Some(request) = request else { break };
                    if self.handle_request(request, &mut deferred).await.is_break() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("JWK Set refresh worker stopped");
    }

    async fn handle_request(
        &mut self,
        request: RefreshRequest,
        deferred: &mut Option<Pin<Box<Sleep>>>,
    ) -> ControlFlow<()> {
        if let (Some(rate_limit), Some(last)) = (self.rate_limit, self.last_refresh) {
            let next_allowed = last + rate_limit;
            if Instant::now() < next_allowed {
                // Unblock the caller right away instead of stalling it behind
                // the limiter; it re-reads the store and reports the kid as
                // unknown. Further rate-limited requests coalesce into the
                // one deferred refresh.
                request.complete();
                if deferred.is_none() {
                    tracing::debug!("refresh rate limited, queueing one deferred refresh");
                    *deferred = Some(Box::pin(tokio::time::sleep_until(next_allowed)));
                }
                return ControlFlow::Continue(());
            }
        }
        self.refresh(Some(request)).await
    }

    async fn refresh(&mut self, request: Option<RefreshRequest>) -> ControlFlow<()> {
        let result = tokio::select! {
            _ = self.shutdown.changed() => {
                // Dropping the fetch future aborts the in-flight HTTP
                // request; dropping the completion handle releases the
                // caller.
                return ControlFlow::Break(());
            }
            result = self.fetcher.refresh() => result,
        };
        self.last_refresh = Some(Instant::now());
        if let Some(request) = request {
            request.complete();
        }
        if let Err(err) = result {
            match &self.error_handler {
                Some(handler) => handler(&err),
                None => tracing::warn!(error = %err, "background JWK Set refresh failed"),
            }
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demand_completion_signal() {
        let (request, completion) = RefreshRequest::demand();
        request.complete();
        assert!(completion.await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_demand_releases_waiter() {
        let (request, completion) = RefreshRequest::demand();
        drop(request);
        // The waiter observes a closed channel rather than hanging.
        assert!(completion.await.is_err());
    }

    #[test]
    fn test_scheduled_request_has_no_handle() {
        let request = RefreshRequest::scheduled();
        assert!(request.done.is_none());
    }
}
