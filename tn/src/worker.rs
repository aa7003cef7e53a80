//! Worker - one participant emitting its own sequence

use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::coordinator::TurnCoordinator;
use crate::error::TurnError;
use crate::participant::Participant;
use crate::sequence::Sequence;
use crate::sink::Sink;

/// What a worker did during one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub participant: Participant,
    /// Symbols written
    pub emitted: usize,
    /// Symbols written after the peer finished
    pub solo: usize,
}

/// A participant bound to the sequence it emits
#[derive(Debug, Clone)]
pub struct Worker {
    id: Participant,
    sequence: Sequence,
    delay: Option<Duration>,
    timeout: Option<Duration>,
}

impl Worker {
    pub fn new(id: Participant, sequence: Sequence) -> Self {
        Self {
            id,
            sequence,
            delay: None,
            timeout: None,
        }
    }

    /// Pause after each handoff, outside the lock
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay).filter(|d| !d.is_zero());
        self
    }

    /// Give up waiting for a turn after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn id(&self) -> Participant {
        self.id
    }

    pub fn peer(&self) -> Participant {
        self.id.peer()
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Emit every symbol in turn, then signal completion
    ///
    /// Completion is signalled on every exit path, including errors and
    /// panics, so the peer is never left waiting.
    pub fn run<S: Sink>(&self, coordinator: &TurnCoordinator<S>) -> Result<WorkerReport, TurnError> {
        info!(participant = %self.id, symbols = self.sequence.len(), "Worker::run: starting");
        let completion = Completion::new(coordinator, self.id);
        let mut report = WorkerReport {
            participant: self.id,
            emitted: 0,
            solo: 0,
        };

        for symbol in self.sequence.iter() {
            let mut turn = coordinator.acquire_turn_with(self.id, self.timeout)?;
            if turn.is_solo() {
                report.solo += 1;
            }
            turn.emit(&symbol)?;
            turn.release_to_peer();
            report.emitted += 1;

            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
        }

        completion.finish()?;
        info!(participant = %self.id, emitted = report.emitted, solo = report.solo, "Worker::run: finished");
        Ok(report)
    }
}

/// Marks the participant finished if the worker leaves early
struct Completion<'a, S: Sink> {
    coordinator: &'a TurnCoordinator<S>,
    who: Participant,
    done: bool,
}

impl<'a, S: Sink> Completion<'a, S> {
    fn new(coordinator: &'a TurnCoordinator<S>, who: Participant) -> Self {
        Self {
            coordinator,
            who,
            done: false,
        }
    }

    fn finish(mut self) -> Result<(), TurnError> {
        self.done = true;
        self.coordinator.finish(self.who)
    }
}

impl<S: Sink> Drop for Completion<'_, S> {
    fn drop(&mut self) {
        if !self.done {
            debug!(who = %self.who, "Completion::drop: worker exited early");
            self.coordinator.abandon(self.who);
        }
    }
}
