//! Manual polling helper.
//!
//! Poll-level properties (such as "never resolves on the first poll") cannot
//! be observed through `.await`, which hides the individual polls. This
//! helper polls a future exactly once against a no-op waker so tests can see
//! each entry.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll, Waker},
};

/// Poll `future` exactly once with a no-op waker.
///
/// Because the waker does nothing, the caller decides when the next poll
/// happens; futures that wake themselves (such as a forced repost) are simply
/// ready to be polled again.
pub fn poll_once<F>(future: &mut F) -> Poll<F::Output>
where
    F: Future + Unpin,
{
    let mut cx = Context::from_waker(Waker::noop());
    Pin::new(future).poll(&mut cx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_future_resolves_in_one_poll() {
        let mut future = std::future::ready(7);
        assert_eq!(poll_once(&mut future), Poll::Ready(7));
    }

    #[test]
    fn pending_future_stays_pending() {
        let mut future = std::future::pending::<()>();
        assert_eq!(poll_once(&mut future), Poll::Pending);
    }
}
