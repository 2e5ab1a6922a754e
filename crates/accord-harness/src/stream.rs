//! Scripted duplex transport.
//!
//! [`ScriptedTransport`] implements tokio's `AsyncRead`/`AsyncWrite` with
//! fully scripted behavior: each read completes with declared bytes or a
//! declared failure (end-of-stream once the script is exhausted), writes are
//! captured and can be failed by index, and every operation can be made to
//! suspend once before completing so tests exercise genuine asynchronous
//! resumption as well as synchronous completion.
//!
//! The transport also checks the single-outstanding-operation discipline: if
//! a read is polled while a write is suspended (or vice versa) it records a
//! violation for the test to assert on.

use std::{
    collections::VecDeque,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Outcome of one scripted read operation.
#[derive(Debug)]
enum ReadOutcome {
    Data(Vec<u8>),
    Fault(io::ErrorKind),
}

/// Which operation is currently suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Read,
    Write,
}

/// A duplex stream that replays a declared I/O script.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    reads: VecDeque<ReadOutcome>,
    write_fault: Option<(usize, io::ErrorKind)>,
    suspend_ops: bool,
    armed_read: bool,
    armed_write: bool,
    suspended: Option<OpKind>,
    reads_issued: usize,
    writes_issued: usize,
    written: Vec<u8>,
    violations: Vec<String>,
}

impl ScriptedTransport {
    /// Create a transport with an empty script: reads report end-of-stream,
    /// writes succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a read that completes with `bytes`.
    #[must_use]
    pub fn with_read(mut self, bytes: &[u8]) -> Self {
        self.reads.push_back(ReadOutcome::Data(bytes.to_vec()));
        self
    }

    /// Append a read that fails with `kind`.
    #[must_use]
    pub fn with_read_error(mut self, kind: io::ErrorKind) -> Self {
        self.reads.push_back(ReadOutcome::Fault(kind));
        self
    }

    /// Fail the `index`-th write (zero-based) with `kind`.
    #[must_use]
    pub fn fail_write(mut self, index: usize, kind: io::ErrorKind) -> Self {
        self.write_fault = Some((index, kind));
        self
    }

    /// Make every operation return `Pending` once before completing,
    /// modeling a transport that never completes synchronously.
    #[must_use]
    pub fn suspend_each_op(mut self) -> Self {
        self.suspend_ops = true;
        self
    }

    /// Number of read operations that have completed (including failures and
    /// end-of-stream).
    #[must_use]
    pub fn reads_issued(&self) -> usize {
        self.reads_issued
    }

    /// Number of write operations that have completed (including failures).
    #[must_use]
    pub fn writes_issued(&self) -> usize {
        self.writes_issued
    }

    /// Every byte successfully written, concatenated in order.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Ordering violations observed so far. Tests assert this is empty.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl AsyncRead for ScriptedTransport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if this.suspended == Some(OpKind::Write) {
            this.violations.push("read polled while a write was outstanding".into());
        }

        if this.suspend_ops && !this.armed_read {
            this.armed_read = true;
            this.suspended = Some(OpKind::Read);
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        this.armed_read = false;
        if this.suspended == Some(OpKind::Read) {
            this.suspended = None;
        }

        this.reads_issued += 1;
        match this.reads.pop_front() {
            Some(ReadOutcome::Data(bytes)) => {
                let take = bytes.len().min(buf.remaining());
                buf.put_slice(&bytes[..take]);
                Poll::Ready(Ok(()))
            },
            Some(ReadOutcome::Fault(kind)) => Poll::Ready(Err(kind.into())),
            // Script exhausted: the peer has closed the stream.
            None => Poll::Ready(Ok(())),
        }
    }
}

impl AsyncWrite for ScriptedTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();

        if this.suspended == Some(OpKind::Read) {
            this.violations.push("write polled while a read was outstanding".into());
        }

        if this.suspend_ops && !this.armed_write {
            this.armed_write = true;
            this.suspended = Some(OpKind::Write);
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        this.armed_write = false;
        if this.suspended == Some(OpKind::Write) {
            this.suspended = None;
        }

        let index = this.writes_issued;
        this.writes_issued += 1;
        if let Some((fault_index, kind)) = this.write_fault
            && fault_index == index
        {
            return Poll::Ready(Err(kind.into()));
        }

        this.written.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
