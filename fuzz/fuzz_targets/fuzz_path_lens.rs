#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nucleon_core::{Identical, Value};
use nucleon_lens::{Lens, Path, Segment};

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Null,
    Bool(bool),
    Number(i16),
    Text(String),
    Array(Vec<FuzzValue>),
    Object(Vec<(u8, FuzzValue)>),
}

impl FuzzValue {
    fn build(&self, depth: usize) -> Value {
        if depth > 6 {
            return Value::Null;
        }
        match self {
            FuzzValue::Null => Value::Null,
            FuzzValue::Bool(b) => Value::Bool(*b),
            FuzzValue::Number(n) => Value::from(*n),
            FuzzValue::Text(s) => Value::from(s.as_str()),
            FuzzValue::Array(items) => {
                Value::array(items.iter().take(8).map(|v| v.build(depth + 1)))
            }
            FuzzValue::Object(entries) => Value::object(
                entries
                    .iter()
                    .take(8)
                    .map(|(k, v)| (key(*k), v.build(depth + 1))),
            ),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum FuzzSegment {
    Key(u8),
    Index(u8),
}

fn key(k: u8) -> String {
    format!("k{}", k % 4)
}

#[derive(Arbitrary, Debug)]
struct Input {
    whole: FuzzValue,
    path: Vec<FuzzSegment>,
    part: Option<FuzzValue>,
}

fuzz_target!(|input: Input| {
    let whole = input.whole.build(0);
    let path: Path = input
        .path
        .iter()
        .take(6)
        .map(|s| match s {
            FuzzSegment::Key(k) => Segment::Key(key(*k)),
            FuzzSegment::Index(i) => Segment::Index(usize::from(*i % 8)),
        })
        .collect();
    let part = input.part.as_ref().map(|p| p.build(0));

    let written = path.set(part.clone(), Some(whole.clone()));
    if let Some(part) = &part {
        let read = path.get(written.as_ref()).expect("focus exists after write");
        assert!(read.identical(part));
    }

    // Writing back what was read never changes the whole.
    let focus = path.get(Some(&whole));
    let unchanged = path.set(focus, Some(whole.clone()));
    assert!(unchanged.identical(&Some(whole)));
});
