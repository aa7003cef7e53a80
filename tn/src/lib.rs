//! Turnstile - strict turn-taking between two worker threads
//!
//! Two workers share one output sink. A [`TurnCoordinator`] owns the turn
//! token and the sink behind a single lock, so symbols reach the sink strictly
//! alternating A, B, A, B, ... for as long as both workers have something
//! left to write. When one worker runs out it signals completion and the
//! other carries on alone instead of waiting forever.
//!
//! # Example
//!
//! ```
//! use turnstile::{MemorySink, Participant, Sequence, Session, Worker};
//!
//! let session = Session::new(
//!     Worker::new(Participant::A, Sequence::from_chars("AB")),
//!     Worker::new(Participant::B, Sequence::from_chars("xy")),
//! )?;
//! let report = session.run(MemorySink::new())?;
//! assert_eq!(report.sink.joined(), "AxBy");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
mod coordinator;
mod error;
mod participant;
mod sequence;
mod session;
mod sink;
mod worker;

pub use coordinator::{TurnCoordinator, TurnGuard};
pub use error::{SequenceError, SessionError, TurnError};
pub use participant::{Participant, Phase};
pub use sequence::Sequence;
pub use session::{RunReport, Session};
pub use sink::{ConsoleSink, FileSink, Layout, MemorySink, Sink, TeeSink, WriterSink};
pub use worker::{Worker, WorkerReport};

/// Default upper bound for the odd/even counter
pub const DEFAULT_ODD_EVEN_MAX: u64 = 100;
