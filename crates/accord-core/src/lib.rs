//! Accord handshake orchestration core
//!
//! Drives a secure-channel negotiation to completion over an abstract duplex
//! byte transport, using a pluggable security-negotiation engine supplied by
//! the caller.
//!
//! # Architecture
//!
//! The negotiation engine is a deterministic state machine that is isolated
//! from I/O: it consumes and produces protocol bytes one step at a time and
//! reports what it needs next. The driver in this crate interprets those
//! steps, performing the actual transport reads and writes and feeding the
//! results back into the engine.
//!
//! This separation keeps negotiation correctness independent of execution
//! concerns and allows the same engine to be reused across production
//! runtimes, deterministic unit tests, and simulation environments with
//! fault injection.
//!
//! # Components
//!
//! - [`engine`]: The [`engine::SecurityEngine`] contract and step/role types
//! - [`transport`]: The duplex byte transport contract
//! - [`driver`]: The resumable handshake driver and its completion guard
//! - [`error`]: Handshake error taxonomy

pub mod driver;
pub mod engine;
pub mod error;
pub mod transport;

pub use driver::{Handshake, READ_BUFFER_CAPACITY, handshake};
pub use engine::{Role, SecurityEngine, Step};
pub use error::HandshakeError;
pub use transport::Transport;
