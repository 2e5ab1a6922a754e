//! Property-based tests for the driver's I/O discipline.
//!
//! For any scripted negotiation, the driver must perform exactly the
//! scripted reads and writes, in order, resolve with the scripted outcome,
//! and never violate either collaborator's contract. Holds for transports
//! that complete synchronously and for transports that suspend every
//! operation.

use accord_core::{HandshakeError, Role, handshake};
use accord_harness::{ScriptedEngine, ScriptedFault, ScriptedStep, ScriptedTransport};
use proptest::{
    collection,
    prelude::{Strategy, any, prop_assert, prop_assert_eq, prop_oneof, proptest},
};

/// One I/O round of a scripted negotiation.
#[derive(Debug, Clone)]
enum Round {
    /// Engine needs data; the transport will deliver these bytes.
    Read(Vec<u8>),
    /// Engine has these bytes ready to transmit.
    Write(Vec<u8>),
}

fn round() -> impl Strategy<Value = Round> {
    prop_oneof![
        collection::vec(any::<u8>(), 1..64).prop_map(Round::Read),
        collection::vec(any::<u8>(), 1..64).prop_map(Round::Write),
    ]
}

proptest! {
    #[test]
    fn driver_performs_exactly_the_scripted_io(
        rounds in collection::vec(round(), 0..12),
        succeed in any::<bool>(),
        suspend in any::<bool>(),
    ) {
        let mut script = Vec::new();
        let mut transport = ScriptedTransport::new();
        let mut expected_reads = 0;
        let mut expected_writes = 0;
        let mut expected_written = Vec::new();

        for round in &rounds {
            match round {
                Round::Read(bytes) => {
                    script.push(ScriptedStep::NeedData);
                    transport = transport.with_read(bytes);
                    expected_reads += 1;
                },
                Round::Write(bytes) => {
                    script.push(ScriptedStep::SendData(bytes.clone()));
                    expected_writes += 1;
                    expected_written.extend_from_slice(bytes);
                },
            }
        }
        script.push(if succeed {
            ScriptedStep::Finish
        } else {
            ScriptedStep::Fail(ScriptedFault::new("scripted failure"))
        });
        if suspend {
            transport = transport.suspend_each_op();
        }
        let mut engine = ScriptedEngine::new(script);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("current-thread runtime");
        let result = runtime.block_on(handshake(&mut transport, &mut engine, Role::Client));

        match (succeed, result) {
            (true, Ok(())) => {},
            (false, Err(HandshakeError::Negotiation(_))) => {},
            (_, other) => prop_assert!(false, "unexpected outcome: {other:?}"),
        }
        prop_assert_eq!(transport.reads_issued(), expected_reads);
        prop_assert_eq!(transport.writes_issued(), expected_writes);
        prop_assert_eq!(transport.written(), expected_written.as_slice());
        // One step per round plus the terminal step, and nothing after it.
        prop_assert_eq!(engine.steps_taken(), rounds.len() + 1);
        prop_assert!(engine.violations().is_empty(), "{:?}", engine.violations());
        prop_assert!(transport.violations().is_empty(), "{:?}", transport.violations());
    }
}
