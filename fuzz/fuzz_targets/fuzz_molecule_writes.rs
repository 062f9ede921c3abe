#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nucleon_core::Value;
use nucleon_runtime::{Atom, Molecule, Observable, Settable, Template, holding};

#[derive(Arbitrary, Debug)]
enum Op {
    SetLeaf { leaf: u8, value: i16 },
    RemoveLeaf { leaf: u8 },
    WriteArray(Vec<i16>),
    WriteObject(Vec<(u8, i16)>),
    WriteScalar(i16),
    Batch(Vec<(u8, i16)>),
}

const LEAVES: usize = 3;

fuzz_target!(|ops: Vec<Op>| {
    let leaves: Vec<Atom<Value>> = (0..LEAVES).map(|i| Atom::new(Value::from(i))).collect();
    let molecule = Molecule::new(Template::sequence(
        leaves
            .iter()
            .map(Template::from)
            .chain([Template::from(Value::from("fixed"))]),
    ));

    let emissions = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&emissions);
    let _sub = molecule.subscribe(move |_| counter.set(counter.get() + 1));

    for op in ops.iter().take(64) {
        let before: Vec<Option<Value>> = leaves.iter().map(Atom::get).collect();
        let emitted_before = emissions.get();
        match op {
            Op::SetLeaf { leaf, value } => {
                leaves[usize::from(*leaf) % LEAVES].set(Value::from(*value));
            }
            Op::RemoveLeaf { leaf } => leaves[usize::from(*leaf) % LEAVES].remove(),
            Op::WriteArray(values) => {
                let next = Value::array(
                    values
                        .iter()
                        .map(|v| Value::from(*v))
                        .chain([Value::from("fixed")]),
                );
                let result = molecule.set(next);
                if values.len() != LEAVES {
                    assert!(result.is_err());
                }
            }
            Op::WriteObject(entries) => {
                let next = Value::object(entries.iter().map(|(k, v)| (k.to_string(), *v)));
                assert!(molecule.set(next).is_err());
                let after: Vec<Option<Value>> = leaves.iter().map(Atom::get).collect();
                assert_eq!(before, after, "rejected write must not touch leaves");
            }
            Op::WriteScalar(v) => {
                assert!(molecule.set(Value::from(*v)).is_err());
            }
            Op::Batch(writes) => {
                holding(|| {
                    for (leaf, value) in writes.iter().take(16) {
                        leaves[usize::from(*leaf) % LEAVES].set(Value::from(*value));
                    }
                });
            }
        }
        assert!(
            emissions.get() - emitted_before <= 1,
            "one operation settles as at most one molecule notification"
        );
    }
});
