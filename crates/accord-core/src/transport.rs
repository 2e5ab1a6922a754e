//! Duplex byte transport contract.
//!
//! The handshake driver works over any asynchronous duplex byte stream. The
//! stream abstraction is tokio's own: [`AsyncRead`] + [`AsyncWrite`], so real
//! sockets, TLS-below layers, and simulated streams all plug in directly.
//!
//! # Ownership and exclusivity
//!
//! The driver never owns the transport: it borrows it mutably for the
//! duration of the handshake. The caller must keep the transport alive for
//! the whole asynchronous operation and must not drive it from elsewhere
//! while the handshake is in flight. Because the driver holds the only
//! mutable borrow and awaits one operation at a time, at most one read and
//! at most one write is ever outstanding, and never both simultaneously.
//!
//! # I/O primitives consumed
//!
//! - read-some ([`tokio::io::AsyncReadExt::read`]): may complete with fewer
//!   bytes than the buffer holds. A zero-byte completion on a non-empty
//!   buffer means the peer closed the stream mid-negotiation; the driver
//!   surfaces it as an [`std::io::ErrorKind::UnexpectedEof`] transport error.
//! - write-all ([`tokio::io::AsyncWriteExt::write_all`]): writes every byte
//!   or fails.

use tokio::io::{AsyncRead, AsyncWrite};

/// An asynchronous duplex byte stream usable by the handshake driver.
///
/// Blanket-implemented for every `AsyncRead + AsyncWrite + Unpin + Send`
/// type; implement those traits rather than this one.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> Transport for S {}
