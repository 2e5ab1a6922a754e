//! Resumable handshake driver.
//!
//! Drives a [`SecurityEngine`] to a terminal state, translating each reported
//! step into transport I/O. The driver is a single logical flow of control
//! per handshake: it suspends only at the two I/O operations (read-some,
//! write-all) and at the optional forced repost, and it resumes at the exact
//! point where it suspended with all local state intact.
//!
//! # Completion contract
//!
//! The returned [`Handshake`] future never resolves on its very first poll,
//! even when the engine finishes without any real I/O (resumed sessions,
//! immediate rejections). A resolution reached on the first entry is held
//! back for one trip through the scheduler before being delivered, on both
//! the success and the error path. Callers therefore always regain control
//! from the initiating call before observing the outcome.
//!
//! # Ordering
//!
//! Reads and writes issued against one transport are strictly sequential: at
//! most one operation of either kind in flight, never a read and a write
//! simultaneously. This falls out of the control flow rather than a lock;
//! the driver holds the only mutable borrow of the transport and awaits one
//! operation at a time.

use std::{
    future::Future,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, trace};

use crate::{
    engine::{Role, SecurityEngine, Step},
    error::HandshakeError,
    transport::Transport,
};

/// Capacity of the scratch input buffer allocated for each read round.
///
/// Generously sized so a single read can satisfy any one negotiation step.
/// The buffer lives only for the round that needs it; a pooled buffer would
/// be a compatible substitution.
pub const READ_BUFFER_CAPACITY: usize = 64 * 1024;

/// Start a handshake over `transport` using `engine` in the given `role`.
///
/// Borrows both collaborators for the duration of the operation; the caller
/// must keep them alive until the returned future resolves and must not
/// drive either from elsewhere in the meantime.
///
/// The future resolves with `Ok(())` when the engine reports completion, or
/// with the first transport or negotiation failure. It never resolves on its
/// first poll (see the module docs).
///
/// # Errors
///
/// - [`HandshakeError::Transport`] if a read or write fails, including
///   [`io::ErrorKind::UnexpectedEof`] when the peer closes the stream
///   mid-negotiation.
/// - [`HandshakeError::Negotiation`] if the engine reaches its error state.
pub fn handshake<'a, S, E>(
    transport: &'a mut S,
    engine: &'a mut E,
    role: Role,
) -> Handshake<'a, E::Error>
where
    S: Transport,
    E: SecurityEngine + Send,
{
    Handshake { inner: Box::pin(drive(transport, engine, role)), entries: 0, deferred: None }
}

/// In-flight handshake operation.
///
/// Created by [`handshake`]. Wraps the negotiation loop and enforces the
/// completion contract: an entry counter distinguishes the first poll from
/// resumptions, and a resolution reached on the first entry is deferred by
/// one forced repost through the scheduler before it is delivered.
pub struct Handshake<'a, E>
where
    E: std::error::Error,
{
    inner: Pin<Box<dyn Future<Output = Result<(), HandshakeError<E>>> + Send + 'a>>,
    entries: u32,
    deferred: Option<Result<(), HandshakeError<E>>>,
}

// No field is structurally pinned: the loop future is already behind its own
// `Pin<Box<_>>`, and the counter and stashed outcome are plain data. Stated
// explicitly so the future stays pollable through `Pin::new` for every
// engine error type.
impl<E> Unpin for Handshake<'_, E> where E: std::error::Error {}

impl<E> Future for Handshake<'_, E>
where
    E: std::error::Error,
{
    type Output = Result<(), HandshakeError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        // Resuming from the forced repost: deliver the held-back outcome.
        if let Some(outcome) = this.deferred.take() {
            return Poll::Ready(outcome);
        }

        this.entries += 1;

        match this.inner.as_mut().poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(outcome) => {
                if this.entries == 1 {
                    // Resolved without ever returning to the scheduler: hold
                    // the outcome back for one repost so the initiating call
                    // regains control first. Applies to success and failure
                    // alike.
                    trace!("handshake resolved on first entry, forcing repost");
                    this.deferred = Some(outcome);
                    cx.waker().wake_by_ref();
                    Poll::Pending
                } else {
                    Poll::Ready(outcome)
                }
            },
        }
    }
}

/// The negotiation loop proper.
async fn drive<S, E>(
    transport: &mut S,
    engine: &mut E,
    role: Role,
) -> Result<(), HandshakeError<E::Error>>
where
    S: Transport,
    E: SecurityEngine + Send,
{
    debug!(?role, "handshake started");
    engine.initiate(role);

    loop {
        match engine.step() {
            Step::NeedsData => {
                // Scratch buffer lives only for this round.
                let mut input = vec![0u8; READ_BUFFER_CAPACITY];
                let read = transport.read(&mut input).await?;
                if read == 0 {
                    debug!("peer closed stream mid-negotiation");
                    return Err(HandshakeError::Transport(io::ErrorKind::UnexpectedEof.into()));
                }
                trace!(bytes = read, "handshake bytes received");
                engine.supply(&input[..read]);
            },
            Step::DataAvailable => {
                let output = engine.take();
                transport.write_all(&output).await?;
                trace!(bytes = output.len(), "handshake bytes sent");
            },
            Step::Error => {
                let error = engine.last_error();
                debug_assert!(error.is_some(), "engine reported Error with nothing recorded");
                debug!("handshake failed in negotiation");
                return match error {
                    Some(error) => Err(HandshakeError::Negotiation(error)),
                    // An empty recorded error is success by definition.
                    None => Ok(()),
                };
            },
            Step::Done => {
                let residual = engine.last_error();
                debug_assert!(residual.is_none(), "engine reported Done with an error recorded");
                debug!("handshake complete");
                return match residual {
                    None => Ok(()),
                    Some(error) => Err(HandshakeError::Negotiation(error)),
                };
            },
        }
    }
}
