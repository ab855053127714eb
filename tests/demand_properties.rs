//! Property tests for demand gating.

use hybris_provider::testing::{ManualClock, RecordingTransport, ScriptedSource, SourceCallKind};
use hybris_provider::{
    CallContext, ClientId, EventSink, LocationSample, ProviderConfig, SessionController,
    Timestamp,
};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Add(u8),
    Remove(u8),
    Vanish(u8),
    Query,
    Fix,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..4).prop_map(Op::Add),
        4 => (0u8..4).prop_map(Op::Remove),
        1 => (0u8..4).prop_map(Op::Vanish),
        2 => Just(Op::Query),
        2 => Just(Op::Fix),
    ]
}

fn client(id: u8) -> ClientId {
    ClientId::new(format!(":1.{}", id))
}

fn new_controller(
    source: &ScriptedSource,
) -> SessionController<ScriptedSource, RecordingTransport, ManualClock> {
    let (tx, _rx) = crossbeam_channel::unbounded();
    SessionController::new(
        source.clone(),
        RecordingTransport::new(),
        ProviderConfig::default(),
        // Every fix is stamped at 0 and the clock sits far ahead, so queries
        // are always deferred.
        ManualClock::new(Timestamp(1_000_000)),
        EventSink::new(tx),
    )
}

proptest! {
    /// Start and stop alternate, and only happen on zero crossings.
    #[test]
    fn prop_start_stop_only_on_zero_crossings(ops in prop::collection::vec(op(), 0..64)) {
        let source = ScriptedSource::new();
        let mut controller = new_controller(&source);
        let mut call = 0u64;

        for op in ops {
            let before = controller.demand();
            let starts = source.count(SourceCallKind::Start);
            let stops = source.count(SourceCallKind::Stop);

            match op {
                Op::Add(id) => controller
                    .add_reference(&CallContext::from_sender(client(id)))
                    .unwrap(),
                Op::Remove(id) => controller
                    .remove_reference(&CallContext::from_sender(client(id)))
                    .unwrap(),
                Op::Vanish(id) => controller.client_vanished(&client(id)),
                Op::Query => {
                    call += 1;
                    controller.get_position(call);
                }
                Op::Fix => controller.on_fix(LocationSample::at(Timestamp(0))),
            }

            let after = controller.demand();
            prop_assert_eq!(after, controller.client_count() + controller.pending_queries());

            let started = source.count(SourceCallKind::Start) - starts;
            let stopped = source.count(SourceCallKind::Stop) - stops;
            prop_assert_eq!(started, usize::from(before == 0 && after > 0));
            prop_assert_eq!(stopped, usize::from(before > 0 && after == 0));
            prop_assert_eq!(controller.is_idle(), after == 0);
        }
    }

    /// Balanced subscribe/unsubscribe sequences end with no demand and one
    /// net stop per start.
    #[test]
    fn prop_balanced_references_release_hardware(
        counts in prop::collection::vec(1usize..4, 1..5),
        seed in any::<u64>(),
    ) {
        let source = ScriptedSource::new();
        let mut controller = new_controller(&source);

        let mut adds = Vec::new();
        for (id, count) in counts.iter().enumerate() {
            for _ in 0..*count {
                adds.push(id as u8);
            }
        }
        // Unsubscribe in a shuffled order.
        let mut removes = adds.clone();
        let len = removes.len();
        for i in 0..len {
            let j = (seed.rotate_left(i as u32) as usize) % len;
            removes.swap(i, j);
        }

        for id in &adds {
            controller.add_reference(&CallContext::from_sender(client(*id))).unwrap();
        }
        for id in &removes {
            controller.remove_reference(&CallContext::from_sender(client(*id))).unwrap();
        }

        prop_assert_eq!(controller.demand(), 0);
        prop_assert_eq!(source.count(SourceCallKind::Start), 1);
        prop_assert_eq!(source.count(SourceCallKind::Stop), 1);
        prop_assert!(controller.is_idle());
    }
}
