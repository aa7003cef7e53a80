//! Session - run two workers against one coordinator and join both

use std::thread::{self, ScopedJoinHandle};

use tracing::{debug, error, info};

use crate::coordinator::TurnCoordinator;
use crate::error::{SessionError, TurnError};
use crate::participant::Participant;
use crate::sequence::Sequence;
use crate::sink::Sink;
use crate::worker::{Worker, WorkerReport};

/// Outcome of a completed session
#[derive(Debug)]
pub struct RunReport<S> {
    pub a: WorkerReport,
    pub b: WorkerReport,
    /// Sink handed back after both workers joined
    pub sink: S,
}

impl<S> RunReport<S> {
    /// Total symbols written by both workers
    pub fn total(&self) -> usize {
        self.a.emitted + self.b.emitted
    }
}

/// A pair of workers with complementary identities
#[derive(Debug, Clone)]
pub struct Session {
    a: Worker,
    b: Worker,
    first: Participant,
}

impl Session {
    /// Pair two workers; the first turn goes to A
    pub fn new(a: Worker, b: Worker) -> Result<Self, TurnError> {
        for (slot, worker) in [(Participant::A, &a), (Participant::B, &b)] {
            if worker.id() != slot {
                return Err(TurnError::MismatchedWorker { slot, got: worker.id() });
            }
        }
        Ok(Self {
            a,
            b,
            first: Participant::A,
        })
    }

    /// Uppercase against lowercase alphabet: `AaBb…Zz`
    pub fn letters() -> Self {
        Self {
            a: Worker::new(Participant::A, Sequence::uppercase()),
            b: Worker::new(Participant::B, Sequence::lowercase()),
            first: Participant::A,
        }
    }

    /// Odd numbers against even numbers, counting from 1 to `max`
    pub fn odd_even(max: u64) -> Self {
        Self {
            a: Worker::new(Participant::A, Sequence::counter(1, 2, max)),
            b: Worker::new(Participant::B, Sequence::counter(2, 2, max)),
            first: Participant::A,
        }
    }

    /// Give the first turn to `first` instead of A
    pub fn starting_with(mut self, first: Participant) -> Self {
        self.first = first;
        self
    }

    /// Apply the same settings to both workers
    pub fn map_workers(mut self, f: impl Fn(Worker) -> Worker) -> Self {
        self.a = f(self.a);
        self.b = f(self.b);
        self
    }

    pub fn worker(&self, who: Participant) -> &Worker {
        match who {
            Participant::A => &self.a,
            Participant::B => &self.b,
        }
    }

    /// Run both workers to completion on their own threads
    pub fn run<S: Sink>(&self, sink: S) -> Result<RunReport<S>, SessionError> {
        info!(
            a = self.a.sequence().len(),
            b = self.b.sequence().len(),
            first = %self.first,
            "Session::run: starting"
        );
        let coordinator = TurnCoordinator::starting_with(self.first, sink);

        let (a, b) = thread::scope(|scope| -> Result<_, SessionError> {
            let first = spawn(scope, &self.a, &coordinator)?;
            let second = match spawn(scope, &self.b, &coordinator) {
                Ok(handle) => handle,
                Err(e) => {
                    // Let A run out alone before reporting
                    coordinator.abandon(Participant::B);
                    let _ = first.join();
                    return Err(e);
                }
            };

            let a = join(first, Participant::A);
            let b = join(second, Participant::B);
            Ok((a?, b?))
        })?;

        let mut sink = coordinator.into_sink()?;
        sink.finish().map_err(SessionError::Flush)?;

        info!(a = a.emitted, b = b.emitted, "Session::run: complete");
        Ok(RunReport { a, b, sink })
    }
}

fn spawn<'scope, 'env, S: Sink>(
    scope: &'scope thread::Scope<'scope, 'env>,
    worker: &'env Worker,
    coordinator: &'env TurnCoordinator<S>,
) -> Result<ScopedJoinHandle<'scope, Result<WorkerReport, TurnError>>, SessionError> {
    let participant = worker.id();
    debug!(%participant, "Session::spawn: starting worker thread");
    thread::Builder::new()
        .name(format!("worker-{}", participant))
        .spawn_scoped(scope, move || worker.run(coordinator))
        .map_err(|source| SessionError::Spawn { participant, source })
}

fn join(
    handle: ScopedJoinHandle<'_, Result<WorkerReport, TurnError>>,
    participant: Participant,
) -> Result<WorkerReport, SessionError> {
    match handle.join() {
        Ok(result) => result.map_err(|e| {
            error!(%participant, error = %e, "Session::join: worker failed");
            SessionError::from(e)
        }),
        Err(_) => {
            error!(%participant, "Session::join: worker panicked");
            Err(SessionError::WorkerPanicked(participant))
        }
    }
}
