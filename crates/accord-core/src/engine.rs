//! Security-negotiation engine contract.
//!
//! The engine is the stateful half of the handshake: it owns the security
//! protocol's byte-level semantics (certificates, cipher negotiation, key
//! derivation) and exposes them as a synchronous, non-blocking state machine.
//! The driver owns the other half: it translates each reported step into
//! transport I/O.
//!
//! Engines never perform I/O themselves. Every external effect is supplied
//! explicitly by the driver, which makes engines trivially testable and
//! reusable across runtimes.

use bytes::Bytes;

/// Which side of the negotiation this endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Initiates the negotiation.
    Client,
    /// Responds to a negotiation initiated by a peer.
    Server,
}

/// What the engine needs next, reported by [`SecurityEngine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The engine cannot progress without more bytes from the peer.
    ///
    /// The driver must read from the transport and hand the received bytes to
    /// [`SecurityEngine::supply`].
    NeedsData,

    /// The engine has produced bytes that must reach the peer.
    ///
    /// The driver must retrieve them with [`SecurityEngine::take`] and write
    /// them to the transport in full.
    DataAvailable,

    /// Negotiation failed. Terminal.
    ///
    /// [`SecurityEngine::last_error`] carries the recorded failure.
    Error,

    /// Negotiation completed successfully. Terminal.
    Done,
}

impl Step {
    /// Whether this step ends the negotiation.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Done)
    }
}

/// A pluggable, stateful security-negotiation engine.
///
/// The driver calls [`initiate`](Self::initiate) exactly once, then loops on
/// [`step`](Self::step), satisfying `NeedsData` with
/// [`supply`](Self::supply) and `DataAvailable` with [`take`](Self::take),
/// until a terminal step is reported.
///
/// # Contract
///
/// - `initiate` is called once, before any stepping.
/// - `supply` is called only immediately after a `NeedsData` step, with
///   exactly the bytes read from the transport.
/// - `take` is called only immediately after a `DataAvailable` step.
/// - `last_error` is consulted only after a terminal step, at most once; it
///   may move the recorded error out of the engine.
/// - Stepping after a terminal state is outside the contract.
///
/// The driver borrows the engine for the duration of the handshake and
/// assumes exclusive use of it; the caller must not drive the engine from
/// elsewhere while a handshake is in flight.
pub trait SecurityEngine {
    /// Negotiation failure type recorded by the engine.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Begin negotiation as the given role.
    fn initiate(&mut self, role: Role);

    /// Advance one logical step and report what is needed next.
    ///
    /// Non-blocking: never waits for I/O.
    fn step(&mut self) -> Step;

    /// Feed newly received bytes into the engine.
    ///
    /// `bytes` holds exactly what the transport read; it may be shorter than
    /// the read buffer and may contain a partial protocol message.
    fn supply(&mut self, bytes: &[u8]);

    /// Return the next chunk of bytes to transmit.
    fn take(&mut self) -> Bytes;

    /// The recorded negotiation failure, `None` on success.
    ///
    /// Valid only after [`step`](Self::step) returned a terminal state. May
    /// move the error out; the driver calls this at most once.
    fn last_error(&mut self) -> Option<Self::Error>;
}
