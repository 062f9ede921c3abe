#![forbid(unsafe_code)]

//! Property-based invariant tests for value identity.
//!
//! 1. NaN is identical to NaN for every NaN payload.
//! 2. `+0.0` and `-0.0` are never identical.
//! 3. For all other floats, identity agrees with `==`.
//! 4. Identity is reflexive and symmetric on `Value`.
//! 5. Cloned containers stay identical; rebuilt containers do not.

use nucleon_core::{Identical, Value, identical};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<f64>().prop_map(Value::Number),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            proptest::collection::vec(("[a-c]", inner), 0..4).prop_map(Value::object),
        ]
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Numeric identity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn nan_payloads_are_identical(bits in any::<u64>()) {
        let nan = f64::from_bits(bits | 0x7ff0_0000_0000_0001);
        prop_assume!(nan.is_nan());
        prop_assert!(identical(&nan, &f64::NAN));
    }

    #[test]
    fn non_zero_floats_follow_equality(a in any::<f64>(), b in any::<f64>()) {
        prop_assume!(!a.is_nan() && !b.is_nan());
        prop_assume!(a != 0.0 || b != 0.0);
        prop_assert_eq!(identical(&a, &b), a == b);
    }

    #[test]
    fn integers_follow_equality(a in any::<i64>(), b in any::<i64>()) {
        prop_assert_eq!(identical(&a, &b), a == b);
    }
}

#[test]
fn signed_zero_is_never_identical() {
    assert!(!identical(&0.0f64, &-0.0f64));
    assert!(!identical(&-0.0f64, &0.0f64));
    assert!(!Value::from(0.0).identical(&Value::from(-0.0)));
}

// ═════════════════════════════════════════════════════════════════════════
// 4–5. Value identity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn value_identity_is_reflexive(v in tree()) {
        prop_assert!(v.identical(&v));
        prop_assert!(v.identical(&v.clone()));
    }

    #[test]
    fn value_identity_is_symmetric(a in tree(), b in tree()) {
        prop_assert_eq!(a.identical(&b), b.identical(&a));
    }

    #[test]
    fn rebuilt_containers_are_not_identical(items in proptest::collection::vec(scalar(), 0..5)) {
        let a = Value::from(items.clone());
        let b = Value::from(items);
        prop_assert!(!a.identical(&b));
        prop_assert!(a.same_shape(&b));
    }
}
