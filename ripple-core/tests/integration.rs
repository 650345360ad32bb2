//! Integration Tests for Reactive System
//!
//! These tests verify that signals, effects, and derived signals work
//! together, including the timing of deferred re-runs.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ripple_core::reactive::{
    derived, effect, flush, get, pending_microtasks, signal, stats, Effect, Signal,
};
use ripple_core::ReactiveError;

/// The reference demo: a value, its double, and an effect logging both.
#[test]
fn logging_effect_never_sees_stale_derived() {
    let value = signal(5);
    let source = value.clone();
    let double = derived(move || get(&source) * 2);

    let log = Rc::new(RefCell::new(Vec::new()));
    let (v, d, sink) = (value.clone(), double.clone(), log.clone());
    effect(move || sink.borrow_mut().push((get(&v), get(&d))));

    assert_eq!(*log.borrow(), vec![(5, 10)]);

    value.set(value.get_untracked() + 1);
    assert_eq!(log.borrow().len(), 1);

    flush().unwrap();
    assert_eq!(*log.borrow(), vec![(5, 10), (6, 12)]);
}

/// Several ticks of the demo's interval, then the final squaring update.
#[test]
fn demo_timeline() {
    let value = signal(5);
    let source = value.clone();
    let double = derived(move || get(&source) * 2);

    let log = Rc::new(RefCell::new(Vec::new()));
    let (v, d, sink) = (value.clone(), double.clone(), log.clone());
    effect(move || sink.borrow_mut().push((get(&v), get(&d))));

    for _ in 0..3 {
        value.set(get(&value) + 1);
        flush().unwrap();
    }
    value.update(|x| x * x);
    flush().unwrap();

    assert_eq!(
        *log.borrow(),
        vec![(5, 10), (6, 12), (7, 14), (8, 16), (64, 128)]
    );
}

#[test]
fn update_squares_and_notifies_once() {
    let value = signal(7);
    let waves = Rc::new(Cell::new(0));
    let waves_clone = waves.clone();
    value.subscribe(move || waves_clone.set(waves_clone.get() + 1));

    value.update(|x: &i32| x.pow(2));

    assert_eq!(value.get_untracked(), 49);
    assert_eq!(waves.get(), 1);
}

#[test]
fn same_value_writes_rerun_effects() {
    let value = signal(1);
    let source = value.clone();
    let effect = Effect::new(move || {
        source.get();
    });

    value.set(1);
    flush().unwrap();
    value.set(1);
    flush().unwrap();

    assert_eq!(effect.run_count(), 3);
}

#[test]
fn writes_to_several_dependencies_coalesce() {
    let a = signal(0);
    let b = signal(0);

    let (ra, rb) = (a.clone(), b.clone());
    let effect = Effect::new(move || {
        ra.get();
        rb.get();
    });

    a.set(1);
    b.set(1);
    a.set(2);
    assert_eq!(pending_microtasks(), 1);

    flush().unwrap();
    assert_eq!(effect.run_count(), 2);
}

#[test]
fn effects_rerun_in_notification_order() {
    let value = signal(0);
    let order = Rc::new(RefCell::new(Vec::new()));

    for label in ["a", "b", "c"] {
        let (source, order) = (value.clone(), order.clone());
        effect(move || {
            source.get();
            order.borrow_mut().push(label);
        });
    }
    order.borrow_mut().clear();

    value.set(1);
    flush().unwrap();
    assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
}

/// A dependent created before the derived can observe a stale value: the
/// ordering guarantee comes from registration order only.
#[test]
fn registration_order_decides_freshness() {
    let value = signal(1);
    let double_slot: Rc<RefCell<Option<ripple_core::reactive::ReadSignal<i32>>>> =
        Rc::new(RefCell::new(None));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let (v, slot, sink) = (value.clone(), double_slot.clone(), seen.clone());
    effect(move || {
        let current = get(&v);
        let double = slot.borrow().as_ref().map(|d| d.get_untracked());
        sink.borrow_mut().push((current, double));
    });

    let source = value.clone();
    *double_slot.borrow_mut() = Some(derived(move || get(&source) * 2));

    value.set(2);
    flush().unwrap();

    // The early effect ran before the derived's recompute.
    assert_eq!(*seen.borrow(), vec![(1, None), (2, Some(2))]);
    assert_eq!(double_slot.borrow().as_ref().unwrap().get_untracked(), 4);
}

#[test]
fn effect_writing_other_signal_cascades_in_same_flush() {
    let input = signal(1);
    let output = signal(0);
    let observed = Rc::new(Cell::new(0));

    let (i, o) = (input.clone(), output.clone());
    effect(move || o.set(i.get() + 100));

    let (o, sink) = (output.clone(), observed.clone());
    effect(move || sink.set(o.get()));

    input.set(2);
    flush().unwrap();
    assert_eq!(observed.get(), 102);
}

#[test]
fn failing_effect_does_not_block_others() {
    let value = signal(0);
    let healthy_runs = Rc::new(Cell::new(0));

    let source = value.clone();
    effect(move || {
        if source.get() > 0 {
            panic!("effect failed");
        }
    });

    let (source, runs) = (value.clone(), healthy_runs.clone());
    effect(move || {
        source.get();
        runs.set(runs.get() + 1);
    });

    value.set(1);
    let err = flush().unwrap_err();
    assert!(matches!(err, ReactiveError::TaskPanicked { failed: 1, .. }));
    assert_eq!(healthy_runs.get(), 2);
    assert_eq!(stats().microtasks_failed, 1);
}

#[test]
fn self_triggering_effect_is_bounded_by_turn_limit() {
    use ripple_core::reactive::configure;
    use ripple_core::RuntimeConfig;

    configure(RuntimeConfig::default().with_turn_limit(10));

    let counter = signal(0);
    let c = counter.clone();
    let effect = Effect::new(move || {
        let next = c.get() + 1;
        c.set(next);
    });

    // The first run wrote to its own dependency after subscribing.
    assert!(effect.is_pending());

    let err = flush().unwrap_err();
    assert!(matches!(
        err,
        ReactiveError::TurnLimitExceeded { limit: 10, pending: 1 }
    ));
    assert_eq!(counter.get_untracked(), 11);
}

#[test]
fn stats_track_engine_activity() {
    let value: Signal<u8> = signal(0);
    let source = value.clone();
    effect(move || {
        source.get();
    });

    value.set(1);
    value.set(2);
    flush().unwrap();

    let stats = stats();
    assert_eq!(stats.signals_created, 1);
    assert_eq!(stats.effects_created, 1);
    assert_eq!(stats.notifications, 2);
    assert_eq!(stats.microtasks_queued, 1);
    assert_eq!(stats.microtasks_run, 1);
    assert_eq!(stats.pending_microtasks, 0);
}
