#![forbid(unsafe_code)]

//! Value identity: the equality predicate that decides whether a write changed anything.
//!
//! Every change notification in Nucleon is gated by [`Identical`]. It is not
//! deep equality:
//!
//! - Floats compare by bit pattern after folding NaNs, so `NaN` is identical
//!   to `NaN` while `+0.0` is *not* identical to `-0.0`.
//! - Shared pointers (`Rc`, `Arc`) compare by address.
//! - Everything else falls back to `==`.
//!
//! # Invariants
//!
//! 1. `identical` is reflexive for every value, including NaN.
//! 2. `identical` is symmetric.
//! 3. For types without floats or pointers, `identical` agrees with `==`.

use std::rc::Rc;
use std::sync::Arc;

/// Total identity predicate used to suppress redundant notifications.
pub trait Identical {
    fn identical(&self, other: &Self) -> bool;
}

/// Free-function form of [`Identical::identical`].
#[inline]
#[must_use]
pub fn identical<T: Identical + ?Sized>(a: &T, b: &T) -> bool {
    a.identical(b)
}

/// Identity for types whose `==` already is identity.
macro_rules! impl_identical_eq {
    ($($t:ty),* $(,)?) => {
        $(
            impl Identical for $t {
                #[inline]
                fn identical(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_identical_eq!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, str, String,
    (),
);

impl Identical for f64 {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        if self.is_nan() {
            other.is_nan()
        } else {
            self.to_bits() == other.to_bits()
        }
    }
}

impl Identical for f32 {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        if self.is_nan() {
            other.is_nan()
        } else {
            self.to_bits() == other.to_bits()
        }
    }
}

impl<T: ?Sized> Identical for Rc<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identical for Arc<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Identical + ?Sized> Identical for Box<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        (**self).identical(other)
    }
}

impl<T: Identical + ?Sized> Identical for &T {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        (**self).identical(*other)
    }
}

impl<T: Identical> Identical for Option<T> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.identical(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Identical> Identical for [T] {
    fn identical(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.identical(b))
    }
}

impl<T: Identical> Identical for Vec<T> {
    fn identical(&self, other: &Self) -> bool {
        self.as_slice().identical(other.as_slice())
    }
}

impl<T0: Identical, T1: Identical> Identical for (T0, T1) {
    fn identical(&self, other: &Self) -> bool {
        self.0.identical(&other.0) && self.1.identical(&other.1)
    }
}

impl<T0: Identical, T1: Identical, T2: Identical> Identical for (T0, T1, T2) {
    fn identical(&self, other: &Self) -> bool {
        self.0.identical(&other.0) && self.1.identical(&other.1) && self.2.identical(&other.2)
    }
}
