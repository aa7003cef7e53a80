//! Alternating-turn coordinator
//!
//! A single mutex guards the turn token, the per-participant completion flags
//! and the output sink. Workers wait on one condition variable until the token
//! names them (or their peer has finished), write while still holding the
//! lock, then flip the token and notify. Because the write and the handoff
//! happen under the same lock, the sink observes writes in exactly the order
//! the token dictates.
//!
//! ```text
//!   TurnA --(A emits, A releases)--> TurnB
//!   TurnB --(B emits, B releases)--> TurnA
//!   TurnA | TurnB --(both finished)--> Done
//! ```

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::TurnError;
use crate::participant::{Participant, Phase};
use crate::sink::Sink;

struct TurnState<S> {
    token: Participant,
    finished: [bool; 2],
    emitted: usize,
    sink: S,
}

impl<S> TurnState<S> {
    /// The token is ours, or the peer is gone and we own the sink alone
    fn may_proceed(&self, who: Participant) -> bool {
        self.token == who || self.finished[who.peer().index()]
    }

    fn ensure_active(&self, who: Participant) -> Result<(), TurnError> {
        if self.finished[who.index()] {
            return Err(TurnError::AlreadyFinished(who));
        }
        Ok(())
    }

    fn mark_finished(&mut self, who: Participant) -> Result<(), TurnError> {
        self.ensure_active(who)?;
        self.finished[who.index()] = true;
        self.token = who.peer();
        Ok(())
    }

    fn phase(&self) -> Phase {
        Phase::of(self.token, self.finished)
    }
}

/// Enforces strict alternation between participants A and B over a shared sink
pub struct TurnCoordinator<S> {
    state: Mutex<TurnState<S>>,
    turn_changed: Condvar,
}

impl<S: Sink> TurnCoordinator<S> {
    /// Create a coordinator that gives the first turn to A
    pub fn new(sink: S) -> Self {
        Self::starting_with(Participant::A, sink)
    }

    /// Create a coordinator that gives the first turn to `first`
    pub fn starting_with(first: Participant, sink: S) -> Self {
        debug!(%first, "TurnCoordinator::starting_with: called");
        Self {
            state: Mutex::new(TurnState {
                token: first,
                finished: [false; 2],
                emitted: 0,
                sink,
            }),
            turn_changed: Condvar::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, TurnState<S>>, TurnError> {
        self.state.lock().map_err(|_| TurnError::Poisoned)
    }

    /// Poison-tolerant view for observers and abort paths
    fn read(&self) -> MutexGuard<'_, TurnState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until it is `who`'s turn
    ///
    /// Returns immediately once the peer has finished: the remaining
    /// participant then runs alone. Fails with [`TurnError::AlreadyFinished`]
    /// if `who` already signalled completion.
    pub fn acquire_turn(&self, who: Participant) -> Result<TurnGuard<'_, S>, TurnError> {
        debug!(%who, "TurnCoordinator::acquire_turn: called");
        let state = self.lock()?;
        state.ensure_active(who)?;

        let state = self
            .turn_changed
            .wait_while(state, |s| !s.may_proceed(who) && !s.finished[who.index()])
            .map_err(|_| TurnError::Poisoned)?;
        state.ensure_active(who)?;

        debug!(%who, solo = state.finished[who.peer().index()], "TurnCoordinator::acquire_turn: acquired");
        Ok(TurnGuard {
            state,
            turn_changed: &self.turn_changed,
            who,
            emitted: false,
        })
    }

    /// Like [`acquire_turn`](Self::acquire_turn), giving up after `timeout`
    ///
    /// On expiry nothing has changed: the caller may retry once the peer
    /// makes progress again.
    pub fn acquire_turn_timeout(&self, who: Participant, timeout: Duration) -> Result<TurnGuard<'_, S>, TurnError> {
        debug!(%who, ?timeout, "TurnCoordinator::acquire_turn_timeout: called");
        let started = Instant::now();
        let state = self.lock()?;
        state.ensure_active(who)?;

        let (state, result) = self
            .turn_changed
            .wait_timeout_while(state, timeout, |s| !s.may_proceed(who) && !s.finished[who.index()])
            .map_err(|_| TurnError::Poisoned)?;

        if result.timed_out() {
            let waited = started.elapsed();
            warn!(%who, peer = %who.peer(), ?waited, "TurnCoordinator::acquire_turn_timeout: peer unresponsive");
            return Err(TurnError::PeerStalled {
                waiting: who,
                peer: who.peer(),
                waited,
            });
        }
        state.ensure_active(who)?;

        debug!(%who, "TurnCoordinator::acquire_turn_timeout: acquired");
        Ok(TurnGuard {
            state,
            turn_changed: &self.turn_changed,
            who,
            emitted: false,
        })
    }

    /// Acquire with an optional deadline
    pub fn acquire_turn_with(&self, who: Participant, timeout: Option<Duration>) -> Result<TurnGuard<'_, S>, TurnError> {
        match timeout {
            Some(timeout) => self.acquire_turn_timeout(who, timeout),
            None => self.acquire_turn(who),
        }
    }

    /// Signal that `who` has nothing left to emit
    ///
    /// Hands the token to the peer so it never waits on a participant that
    /// will not come back. Does not require holding the turn.
    pub fn finish(&self, who: Participant) -> Result<(), TurnError> {
        let mut state = self.lock()?;
        state.mark_finished(who)?;
        self.turn_changed.notify_all();
        log_finished(who, state.phase(), state.emitted);
        Ok(())
    }

    /// Mark `who` finished on an error or unwind path, ignoring poison
    pub(crate) fn abandon(&self, who: Participant) {
        let mut state = self.read();
        if !state.finished[who.index()] {
            warn!(%who, "TurnCoordinator::abandon: participant stopped early");
            state.finished[who.index()] = true;
            state.token = who.peer();
        }
        self.turn_changed.notify_all();
    }

    /// Current state machine phase
    pub fn phase(&self) -> Phase {
        self.read().phase()
    }

    /// Participant currently holding the token
    pub fn turn(&self) -> Participant {
        self.read().token
    }

    pub fn is_finished(&self, who: Participant) -> bool {
        self.read().finished[who.index()]
    }

    /// Total symbols written so far
    pub fn emitted(&self) -> usize {
        self.read().emitted
    }

    pub fn is_poisoned(&self) -> bool {
        self.state.is_poisoned()
    }

    /// Recover the sink once every worker is done with the coordinator
    pub fn into_sink(self) -> Result<S, TurnError> {
        self.state
            .into_inner()
            .map(|state| state.sink)
            .map_err(|_| TurnError::Poisoned)
    }
}

fn log_finished(who: Participant, phase: Phase, emitted: usize) {
    if phase == Phase::Done {
        info!(%who, emitted, "Both participants finished");
    } else {
        debug!(%who, ?phase, "Participant finished");
    }
}

/// Proof that a participant holds the turn
///
/// The coordinator's lock stays held for the guard's lifetime, so the sink can
/// only be written through it. Dropping the guard without releasing keeps the
/// token with the holder.
pub struct TurnGuard<'a, S> {
    state: MutexGuard<'a, TurnState<S>>,
    turn_changed: &'a Condvar,
    who: Participant,
    emitted: bool,
}

impl<S: Sink> TurnGuard<'_, S> {
    /// Participant holding this turn
    pub fn participant(&self) -> Participant {
        self.who
    }

    /// True when the peer has finished and no alternation is enforced
    pub fn is_solo(&self) -> bool {
        self.state.finished[self.who.peer().index()]
    }

    /// Write one symbol to the sink
    ///
    /// A turn carries exactly one emission; a second call fails with
    /// [`TurnError::AlreadyEmitted`] and writes nothing.
    pub fn emit(&mut self, symbol: &str) -> Result<(), TurnError> {
        let who = self.who;
        if self.emitted {
            warn!(%who, symbol, "TurnGuard::emit: second emission in one turn rejected");
            return Err(TurnError::AlreadyEmitted(who));
        }
        self.state
            .sink
            .write_symbol(who, symbol)
            .map_err(|source| TurnError::Sink { participant: who, source })?;
        self.state.emitted += 1;
        self.emitted = true;
        debug!(%who, symbol, "TurnGuard::emit: written");
        Ok(())
    }

    /// Hand the token to `next` and wake waiters
    pub fn release(mut self, next: Participant) {
        debug!(who = %self.who, %next, "TurnGuard::release: called");
        self.state.token = next;
        self.turn_changed.notify_all();
    }

    /// Hand the token to the peer
    pub fn release_to_peer(self) {
        let next = self.who.peer();
        self.release(next);
    }

    /// Signal completion while holding the turn
    pub fn finish(mut self) -> Result<(), TurnError> {
        self.state.mark_finished(self.who)?;
        self.turn_changed.notify_all();
        log_finished(self.who, self.state.phase(), self.state.emitted);
        Ok(())
    }
}
