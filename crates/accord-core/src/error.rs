//! Handshake error taxonomy.

use std::io;

use thiserror::Error;

/// Terminal failure of a handshake operation.
///
/// Generic over the engine's own error type, so callers keep the engine's
/// full diagnostic rather than a flattened code.
#[derive(Debug, Error)]
pub enum HandshakeError<E>
where
    E: std::error::Error,
{
    /// The transport failed at a suspension point.
    ///
    /// Short-circuits the negotiation immediately; the engine is not
    /// consulted again after a transport failure.
    #[error("transport failed during handshake: {0}")]
    Transport(#[from] io::Error),

    /// The engine reached its error state.
    ///
    /// Carries the engine's recorded failure as the operation's final
    /// result.
    #[error("security negotiation failed: {0}")]
    Negotiation(E),
}

impl<E> HandshakeError<E>
where
    E: std::error::Error,
{
    /// Whether this failure originated in the transport rather than the
    /// negotiation itself.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
