#![forbid(unsafe_code)]

//! Property-based invariant tests for `Property` and `combine`.
//!
//! 1. Every emission reaches the live observers in registration order.
//! 2. A new observer is replayed the current value, and only that.
//! 3. Activation and deactivation hooks fire on the 0→1 and 1→0 observer
//!    transitions only.
//! 4. `maybe_emit` notifies exactly when the value changes.
//! 5. A combined source fires once per constituent event while subscribed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use nucleon_stream::{Lifecycle, Property, Source, Subscription, combine};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Op {
    Subscribe,
    Unsubscribe(usize),
    Emit(i32),
    MaybeEmit(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Subscribe),
        2 => any::<usize>().prop_map(Op::Unsubscribe),
        3 => (-3i32..3).prop_map(Op::Emit),
        3 => (-3i32..3).prop_map(Op::MaybeEmit),
    ]
}

#[derive(Default)]
struct Hooks {
    activations: Cell<u32>,
    deactivations: Cell<u32>,
}

impl Lifecycle for Hooks {
    fn on_activation(&self) {
        self.activations.set(self.activations.get() + 1);
    }

    fn on_deactivation(&self) {
        self.deactivations.set(self.deactivations.get() + 1);
    }
}

type Log = Rc<RefCell<Vec<(usize, i32)>>>;

fn observe(p: &Property<i32>, tag: usize, log: &Log) -> Subscription {
    let sink = Rc::clone(log);
    p.subscribe(move |v| sink.borrow_mut().push((tag, *v)))
}

// ═════════════════════════════════════════════════════════════════════════
// 1–4. Observer order, replay and lifecycle against a model
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn property_matches_observer_model(ops in prop::collection::vec(op(), 0..40)) {
        let hooks = Rc::new(Hooks::default());
        let weak: Weak<dyn Lifecycle> = Rc::downgrade(&hooks) as Weak<dyn Lifecycle>;
        let p: Property<i32> = Property::with_lifecycle(weak);
        let log: Log = Rc::new(RefCell::new(Vec::new()));

        let mut live: Vec<(usize, Subscription)> = Vec::new();
        let mut next_tag = 0;
        let mut current: Option<i32> = None;
        let mut activations = 0;
        let mut deactivations = 0;

        for op in ops {
            log.borrow_mut().clear();
            let expected: Vec<(usize, i32)> = match op {
                Op::Subscribe => {
                    if live.is_empty() {
                        activations += 1;
                    }
                    let tag = next_tag;
                    next_tag += 1;
                    live.push((tag, observe(&p, tag, &log)));
                    current.map(|v| vec![(tag, v)]).unwrap_or_default()
                }
                Op::Unsubscribe(i) => {
                    if !live.is_empty() {
                        let (_, sub) = live.remove(i % live.len());
                        sub.unsubscribe();
                        if live.is_empty() {
                            deactivations += 1;
                        }
                    }
                    Vec::new()
                }
                Op::Emit(v) => {
                    p.emit(v);
                    current = Some(v);
                    live.iter().map(|(tag, _)| (*tag, v)).collect()
                }
                Op::MaybeEmit(v) => {
                    let changed = current != Some(v);
                    prop_assert_eq!(p.maybe_emit(v), changed);
                    if changed {
                        current = Some(v);
                        live.iter().map(|(tag, _)| (*tag, v)).collect()
                    } else {
                        Vec::new()
                    }
                }
            };

            prop_assert_eq!(&*log.borrow(), &expected);
            prop_assert_eq!(p.current(), current);
            prop_assert_eq!(p.observer_count(), live.len());
            prop_assert_eq!(hooks.activations.get(), activations);
            prop_assert_eq!(hooks.deactivations.get(), deactivations);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Combined sources
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn combined_source_fires_per_constituent_event(
        emits in prop::collection::vec((0usize..3, -3i32..3), 0..30),
    ) {
        let sources: Vec<Rc<Property<i32>>> =
            (0..3).map(|i| Rc::new(Property::with_value(i))).collect();
        let combined = combine(sources.iter().cloned());

        let fired = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&fired);
        let sub = combined.on_any(Rc::new(move || counter.set(counter.get() + 1)));
        prop_assert_eq!(fired.get(), sources.len(), "each source replays once");

        for (i, v) in &emits {
            sources[*i].emit(*v);
        }
        prop_assert_eq!(fired.get(), sources.len() + emits.len());

        drop(sub);
        for source in &sources {
            prop_assert_eq!(source.observer_count(), 0);
        }
        sources[0].emit(99);
        prop_assert_eq!(fired.get(), sources.len() + emits.len());
    }
}
