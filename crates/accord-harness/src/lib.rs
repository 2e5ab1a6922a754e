//! Deterministic test harness for the accord handshake driver.
//!
//! Scripted implementations of the engine and transport contracts for
//! deterministic, reproducible driver testing, plus a small real engine for
//! end-to-end simulation and a manual polling helper for poll-level
//! assertions.
//!
//! Scripted collaborators never panic on contract violations; they record
//! them instead, so a misbehaving driver produces a readable assertion
//! failure rather than an unwind inside a poll.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod greeting;
pub mod poll;
pub mod script;
pub mod stream;

pub use greeting::{GreetingEngine, GreetingError};
pub use poll::poll_once;
pub use script::{ScriptedEngine, ScriptedFault, ScriptedStep};
pub use stream::ScriptedTransport;
