//! Error types for turn coordination

use std::time::Duration;
use thiserror::Error;

use crate::participant::Participant;

/// Errors raised by the turn coordinator and the workers driving it
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Invalid participant id '{0}' (expected A/B or 0/1)")]
    InvalidParticipant(String),

    #[error("Participant {0} has already finished")]
    AlreadyFinished(Participant),

    #[error("Participant {0} already emitted during this turn")]
    AlreadyEmitted(Participant),

    #[error("Worker in slot {slot} is participant {got}")]
    MismatchedWorker { slot: Participant, got: Participant },

    #[error("Participant {waiting} waited {waited:?} for a turn; peer {peer} is unresponsive")]
    PeerStalled {
        waiting: Participant,
        peer: Participant,
        waited: Duration,
    },

    #[error("Sink write failed for participant {participant}")]
    Sink {
        participant: Participant,
        #[source]
        source: std::io::Error,
    },

    #[error("Turn lock poisoned by a panicking worker")]
    Poisoned,
}

impl TurnError {
    /// Check if the coordinator is still consistent and the caller may retry
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TurnError::PeerStalled { .. })
    }

    /// Check if this error means the caller broke the coordinator's contract
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            TurnError::InvalidParticipant(_)
                | TurnError::AlreadyFinished(_)
                | TurnError::AlreadyEmitted(_)
                | TurnError::MismatchedWorker { .. }
        )
    }
}

/// Errors raised while building a symbol sequence
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Range {start}-{end} is reversed")]
    ReversedRange { start: char, end: char },
}

/// Errors raised while running a pair of workers
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to spawn worker thread for participant {participant}")]
    Spawn {
        participant: Participant,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker thread for participant {0} panicked")]
    WorkerPanicked(Participant),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("Failed to flush sink: {0}")]
    Flush(#[source] std::io::Error),
}
