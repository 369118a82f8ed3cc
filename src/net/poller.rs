//! Background fetch worker and in-flight bookkeeping.
//!
//! Timer ticks arrive on the GUI thread, which must never block on the
//! network. The [`Poller`] hands each fetch to a dedicated worker thread
//! and signals completion through a caller-supplied callback, typically a
//! posted window message. The [`PollGate`] lets the tick handler drop a
//! tick on the floor while a fetch is still in flight instead of queueing
//! a backlog.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::warn;

use super::fetcher::{FetchError, IpFetcher};

/// Result of one completed fetch attempt.
pub type FetchOutcome = Result<String, FetchError>;

/// Single-slot in-flight marker.
///
/// Lives on the GUI thread; both the tick handler and the completion
/// handler run there, so a plain bool is enough. The worker never sees it.
#[derive(Debug, Default)]
pub struct PollGate {
    in_flight: bool,
}

impl PollGate {
    /// Claim the slot for a new fetch. Returns false while one is
    /// already running, in which case the caller skips this cycle.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Release the slot once the outcome has been consumed.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }
}

/// Owns the worker thread that performs blocking fetches.
///
/// Dropping the poller closes the request channel, which ends the worker
/// loop. An in-flight request is allowed to run to completion and its
/// outcome is discarded.
pub struct Poller {
    requests: Sender<()>,
    outcomes: Receiver<FetchOutcome>,
}

impl Poller {
    /// Spawn the worker around a fetcher.
    ///
    /// `on_complete` runs on the worker thread after each outcome has
    /// been queued, so by the time the callback is observed the outcome
    /// is guaranteed to be readable via [`Poller::take_outcome`].
    pub fn spawn(fetcher: IpFetcher, on_complete: impl Fn() + Send + 'static) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<()>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<FetchOutcome>();

        thread::spawn(move || {
            while request_rx.recv().is_ok() {
                let outcome = fetcher.fetch();
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
                on_complete();
            }
        });

        Self {
            requests: request_tx,
            outcomes: outcome_rx,
        }
    }

    /// Queue one fetch on the worker.
    pub fn request_fetch(&self) {
        if self.requests.send(()).is_err() {
            // Worker is gone; nothing will ever complete.
            warn!("Fetch worker is no longer running");
        }
    }

    /// Non-blocking read of the next completed fetch, if any.
    pub fn take_outcome(&self) -> Option<FetchOutcome> {
        self.outcomes.try_recv().ok()
    }
}
