//! A minimal real negotiation engine.
//!
//! [`GreetingEngine`] implements the smallest possible negotiation with
//! actual semantics: the client transmits a fixed greeting line, the server
//! verifies it and answers with a welcome line, and the client verifies the
//! answer. Both sides tolerate arbitrary fragmentation of the incoming line,
//! so the engine can be driven over a real network where reads complete
//! short.
//!
//! This exists so both driver roles can be exercised end-to-end over a
//! simulated network, not just against scripts.

use accord_core::{Role, SecurityEngine, Step};
use bytes::Bytes;
use thiserror::Error;

/// Line the client sends to open the negotiation.
pub const HELLO: &[u8] = b"ACCORD HELLO\n";

/// Line the server answers with on success.
pub const WELCOME: &[u8] = b"ACCORD WELCOME\n";

/// Greeting negotiation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GreetingError {
    /// The peer sent something other than the expected line.
    #[error("peer sent an unexpected greeting")]
    UnexpectedGreeting,
    /// The engine was stepped before [`SecurityEngine::initiate`].
    #[error("engine stepped before initiation")]
    NotInitiated,
}

#[derive(Debug)]
enum Phase {
    /// Before `initiate`.
    Idle,
    /// An outbound line is queued for the driver to take.
    Sending(&'static [u8]),
    /// Waiting for the peer's line; partial input accumulates.
    Receiving(&'static [u8]),
    Complete,
    Failed,
}

/// A [`SecurityEngine`] speaking the fixed greeting exchange.
#[derive(Debug)]
pub struct GreetingEngine {
    role: Option<Role>,
    phase: Phase,
    inbound: Vec<u8>,
    fault: Option<GreetingError>,
}

impl GreetingEngine {
    /// Create an engine awaiting initiation.
    #[must_use]
    pub fn new() -> Self {
        Self { role: None, phase: Phase::Idle, inbound: Vec::new(), fault: None }
    }

    /// Whether the negotiation completed successfully.
    #[must_use]
    pub fn is_established(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    fn fail(&mut self, error: GreetingError) {
        self.phase = Phase::Failed;
        self.fault = Some(error);
    }

    /// Evaluate the accumulated inbound bytes against the expected line.
    fn evaluate(&mut self, expected: &'static [u8]) {
        if self.inbound.len() < expected.len() {
            if expected.starts_with(&self.inbound) {
                // Still a prefix: keep receiving.
                return;
            }
            self.fail(GreetingError::UnexpectedGreeting);
            return;
        }
        if self.inbound != expected {
            self.fail(GreetingError::UnexpectedGreeting);
            return;
        }
        self.inbound.clear();
        self.phase = match self.role {
            // Server verified the hello; answer with the welcome.
            Some(Role::Server) => Phase::Sending(WELCOME),
            // Client verified the welcome; negotiation is complete.
            Some(Role::Client) => Phase::Complete,
            None => {
                self.fail(GreetingError::NotInitiated);
                return;
            },
        };
    }
}

impl Default for GreetingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityEngine for GreetingEngine {
    type Error = GreetingError;

    fn initiate(&mut self, role: Role) {
        self.role = Some(role);
        self.phase = match role {
            Role::Client => Phase::Sending(HELLO),
            Role::Server => Phase::Receiving(HELLO),
        };
    }

    fn step(&mut self) -> Step {
        match self.phase {
            Phase::Idle => {
                self.fail(GreetingError::NotInitiated);
                Step::Error
            },
            Phase::Sending(_) => Step::DataAvailable,
            Phase::Receiving(_) => Step::NeedsData,
            Phase::Complete => Step::Done,
            Phase::Failed => Step::Error,
        }
    }

    fn supply(&mut self, bytes: &[u8]) {
        if let Phase::Receiving(expected) = self.phase {
            self.inbound.extend_from_slice(bytes);
            self.evaluate(expected);
        }
    }

    fn take(&mut self) -> Bytes {
        if let Phase::Sending(line) = self.phase {
            self.phase = match self.role {
                // Client sent the hello; await the welcome.
                Some(Role::Client) => Phase::Receiving(WELCOME),
                // Server sent the welcome; negotiation is complete.
                _ => Phase::Complete,
            };
            return Bytes::from_static(line);
        }
        Bytes::new()
    }

    fn last_error(&mut self) -> Option<Self::Error> {
        self.fault.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shuttle bytes between a client and server engine without a transport.
    fn run_in_memory(client: &mut GreetingEngine, server: &mut GreetingEngine) {
        client.initiate(Role::Client);
        server.initiate(Role::Server);

        for _ in 0..8 {
            match client.step() {
                Step::DataAvailable => {
                    let bytes = client.take();
                    server.supply(&bytes);
                },
                Step::NeedsData => match server.step() {
                    Step::DataAvailable => {
                        let bytes = server.take();
                        client.supply(&bytes);
                    },
                    Step::NeedsData | Step::Done | Step::Error => {},
                },
                Step::Done | Step::Error => return,
            }
        }
    }

    #[test]
    fn both_roles_establish() {
        let mut client = GreetingEngine::new();
        let mut server = GreetingEngine::new();

        run_in_memory(&mut client, &mut server);

        assert!(client.is_established());
        assert!(server.is_established());
        assert_eq!(client.last_error(), None);
        assert_eq!(server.last_error(), None);
    }

    #[test]
    fn tolerates_fragmented_input() {
        let mut server = GreetingEngine::new();
        server.initiate(Role::Server);

        assert_eq!(server.step(), Step::NeedsData);
        server.supply(b"ACCORD ");
        assert_eq!(server.step(), Step::NeedsData);
        server.supply(b"HELLO\n");
        assert_eq!(server.step(), Step::DataAvailable);
        assert_eq!(server.take(), Bytes::from_static(WELCOME));
        assert_eq!(server.step(), Step::Done);
    }

    #[test]
    fn rejects_wrong_greeting() {
        let mut server = GreetingEngine::new();
        server.initiate(Role::Server);

        assert_eq!(server.step(), Step::NeedsData);
        server.supply(b"GET / HTTP/1.1\r\n");
        assert_eq!(server.step(), Step::Error);
        assert_eq!(server.last_error(), Some(GreetingError::UnexpectedGreeting));
    }
}
