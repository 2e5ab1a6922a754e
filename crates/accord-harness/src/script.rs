//! Scripted security engine.
//!
//! [`ScriptedEngine`] replays a declared sequence of negotiation steps and
//! records every call made against it. Tests describe the negotiation they
//! want (reads, writes, terminal outcome) and afterwards assert on what the
//! driver actually did.
//!
//! Contract violations (supplying without a `NeedsData` step, taking without
//! a `DataAvailable` step, stepping past the end of the script, double
//! initiation) are accumulated in a violation list rather than panicking, so
//! tests fail with a readable report.

use std::collections::VecDeque;

use accord_core::{Role, SecurityEngine, Step};
use bytes::Bytes;
use thiserror::Error;

/// Scripted negotiation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("negotiation rejected: {reason}")]
pub struct ScriptedFault {
    reason: String,
}

impl ScriptedFault {
    /// Create a fault with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// One entry in an engine script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedStep {
    /// Report `NeedsData`; the driver must read and supply the bytes.
    NeedData,
    /// Report `DataAvailable` with these bytes; the driver must take and
    /// write them.
    SendData(Vec<u8>),
    /// Report `Error` with this recorded fault. Terminal.
    Fail(ScriptedFault),
    /// Report `Done`. Terminal.
    Finish,
}

/// What the engine is waiting for between a step and its satisfying call.
#[derive(Debug)]
enum PendingExchange {
    Supply,
    Take(Vec<u8>),
}

/// A [`SecurityEngine`] that replays a declared step sequence.
#[derive(Debug)]
pub struct ScriptedEngine {
    script: VecDeque<ScriptedStep>,
    pending: Option<PendingExchange>,
    initiated: Option<Role>,
    terminal: bool,
    fault: Option<ScriptedFault>,
    steps_taken: usize,
    supplied: Vec<Vec<u8>>,
    takes: usize,
    violations: Vec<String>,
}

impl ScriptedEngine {
    /// Create an engine that will replay `script` in order.
    #[must_use]
    pub fn new(script: Vec<ScriptedStep>) -> Self {
        Self {
            script: script.into(),
            pending: None,
            initiated: None,
            terminal: false,
            fault: None,
            steps_taken: 0,
            supplied: Vec::new(),
            takes: 0,
            violations: Vec::new(),
        }
    }

    /// The role this engine was initiated with, if any.
    #[must_use]
    pub fn initiated(&self) -> Option<Role> {
        self.initiated
    }

    /// Number of steps the driver has queried.
    #[must_use]
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Every byte chunk the driver supplied, in order.
    #[must_use]
    pub fn supplied(&self) -> &[Vec<u8>] {
        &self.supplied
    }

    /// Number of output chunks the driver took.
    #[must_use]
    pub fn takes(&self) -> usize {
        self.takes
    }

    /// Contract violations observed so far. Tests assert this is empty.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Whether the engine reached a terminal step.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

impl SecurityEngine for ScriptedEngine {
    type Error = ScriptedFault;

    fn initiate(&mut self, role: Role) {
        if self.initiated.is_some() {
            self.violations.push("initiate called twice".into());
            return;
        }
        self.initiated = Some(role);
    }

    fn step(&mut self) -> Step {
        if self.initiated.is_none() {
            self.violations.push("step called before initiate".into());
        }
        if self.terminal {
            self.violations.push("step called after a terminal step".into());
            return Step::Done;
        }
        if self.pending.is_some() {
            self.violations.push("step called with an unsatisfied supply/take".into());
        }
        self.steps_taken += 1;

        match self.script.pop_front() {
            Some(ScriptedStep::NeedData) => {
                self.pending = Some(PendingExchange::Supply);
                Step::NeedsData
            },
            Some(ScriptedStep::SendData(bytes)) => {
                self.pending = Some(PendingExchange::Take(bytes));
                Step::DataAvailable
            },
            Some(ScriptedStep::Fail(fault)) => {
                self.fault = Some(fault);
                self.terminal = true;
                Step::Error
            },
            Some(ScriptedStep::Finish) => {
                self.terminal = true;
                Step::Done
            },
            None => {
                self.violations.push("step called past the end of the script".into());
                self.terminal = true;
                Step::Done
            },
        }
    }

    fn supply(&mut self, bytes: &[u8]) {
        match self.pending.take() {
            Some(PendingExchange::Supply) => self.supplied.push(bytes.to_vec()),
            other => {
                self.violations.push("supply called without a NeedsData step".into());
                self.pending = other;
            },
        }
    }

    fn take(&mut self) -> Bytes {
        match self.pending.take() {
            Some(PendingExchange::Take(bytes)) => {
                self.takes += 1;
                Bytes::from(bytes)
            },
            other => {
                self.violations.push("take called without a DataAvailable step".into());
                self.pending = other;
                Bytes::new()
            },
        }
    }

    fn last_error(&mut self) -> Option<Self::Error> {
        self.fault.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_script_in_order() {
        let mut engine = ScriptedEngine::new(vec![
            ScriptedStep::NeedData,
            ScriptedStep::SendData(b"out".to_vec()),
            ScriptedStep::Finish,
        ]);

        engine.initiate(Role::Client);
        assert_eq!(engine.step(), Step::NeedsData);
        engine.supply(b"in");
        assert_eq!(engine.step(), Step::DataAvailable);
        assert_eq!(engine.take(), Bytes::from_static(b"out"));
        assert_eq!(engine.step(), Step::Done);

        assert!(engine.is_terminal());
        assert_eq!(engine.last_error(), None);
        assert!(engine.violations().is_empty(), "{:?}", engine.violations());
    }

    #[test]
    fn records_fault_on_fail_step() {
        let mut engine =
            ScriptedEngine::new(vec![ScriptedStep::Fail(ScriptedFault::new("bad cert"))]);

        engine.initiate(Role::Server);
        assert_eq!(engine.step(), Step::Error);
        assert_eq!(engine.last_error(), Some(ScriptedFault::new("bad cert")));
    }

    #[test]
    fn out_of_order_calls_are_violations() {
        let mut engine = ScriptedEngine::new(vec![ScriptedStep::NeedData, ScriptedStep::Finish]);

        engine.initiate(Role::Client);
        engine.initiate(Role::Client);
        engine.supply(b"junk");
        assert_eq!(engine.step(), Step::NeedsData);
        let _ = engine.take();

        assert_eq!(engine.violations().len(), 3);
    }
}
