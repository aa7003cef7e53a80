//! Participant identity and the coordinator's observable phase

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TurnError;

/// One of the two parties taking turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Participant {
    A,
    B,
}

impl Participant {
    /// Both participants, in turn order
    pub const ALL: [Participant; 2] = [Participant::A, Participant::B];

    /// The other participant
    pub fn peer(self) -> Participant {
        match self {
            Participant::A => Participant::B,
            Participant::B => Participant::A,
        }
    }

    /// Slot index (A = 0, B = 1)
    pub fn index(self) -> usize {
        match self {
            Participant::A => 0,
            Participant::B => 1,
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::A => write!(f, "A"),
            Participant::B => write!(f, "B"),
        }
    }
}

impl TryFrom<usize> for Participant {
    type Error = TurnError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Participant::A),
            1 => Ok(Participant::B),
            other => Err(TurnError::InvalidParticipant(other.to_string())),
        }
    }
}

impl TryFrom<u8> for Participant {
    type Error = TurnError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Participant::try_from(value as usize)
    }
}

impl FromStr for Participant {
    type Err = TurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" | "0" => Ok(Participant::A),
            "B" | "1" => Ok(Participant::B),
            _ => Err(TurnError::InvalidParticipant(s.to_string())),
        }
    }
}

/// Coordinator state machine: whose turn it is, or terminal once both are done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    TurnA,
    TurnB,
    Done,
}

impl Phase {
    pub(crate) fn of(token: Participant, finished: [bool; 2]) -> Phase {
        if finished.iter().all(|done| *done) {
            return Phase::Done;
        }
        match token {
            Participant::A => Phase::TurnA,
            Participant::B => Phase::TurnB,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_is_involution() {
        for p in Participant::ALL {
            assert_ne!(p.peer(), p);
            assert_eq!(p.peer().peer(), p);
        }
    }

    #[test]
    fn test_try_from_raw_ids() {
        assert_eq!(Participant::try_from(0u8).unwrap(), Participant::A);
        assert_eq!(Participant::try_from(1usize).unwrap(), Participant::B);

        let err = Participant::try_from(2u8).unwrap_err();
        assert!(matches!(err, TurnError::InvalidParticipant(ref id) if id == "2"));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("a".parse::<Participant>().unwrap(), Participant::A);
        assert_eq!(" B ".parse::<Participant>().unwrap(), Participant::B);
        assert_eq!("1".parse::<Participant>().unwrap(), Participant::B);
        assert!("C".parse::<Participant>().is_err());
    }

    #[test]
    fn test_phase_of() {
        assert_eq!(Phase::of(Participant::A, [false, false]), Phase::TurnA);
        assert_eq!(Phase::of(Participant::B, [true, false]), Phase::TurnB);
        assert_eq!(Phase::of(Participant::A, [true, true]), Phase::Done);
    }
}
