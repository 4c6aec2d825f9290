//! Arithmetic capabilities a value type offers to the standard kinds.
//!
//! A pipeline is generic over any `Clone + Send + Sync` value. The standard
//! constructors on [`Modifier`](super::Modifier) ask for just the capability
//! they need: `addition` wants [`Additive`], `multiplication` wants
//! [`Scalable`], `conversion` wants [`Channeled`]. `override_with`,
//! `callback` and `custom` work with any value.

use std::fmt::Debug;

/// Values that can be summed.
pub trait Additive {
    /// `self + rhs`. Must be total: overflow saturates or wraps, never panics.
    fn plus(&self, rhs: &Self) -> Self;
}

/// Values that can be scaled by a float factor.
pub trait Scalable {
    /// `truncate(self * factor)`, rounding toward zero.
    fn scaled(&self, factor: f32) -> Self;
}

/// Composite values made of named integer channels.
pub trait Channeled {
    /// Channel name type.
    type Channel: Copy + Eq + Debug + Send + Sync + 'static;

    /// Read one channel.
    fn channel(&self, channel: Self::Channel) -> i32;

    /// Copy of `self` with one channel replaced.
    fn with_channel(&self, channel: Self::Channel, value: i32) -> Self;
}

impl Additive for i32 {
    fn plus(&self, rhs: &Self) -> Self {
        self.saturating_add(*rhs)
    }
}

impl Additive for i64 {
    fn plus(&self, rhs: &Self) -> Self {
        self.saturating_add(*rhs)
    }
}

/// Largest magnitude an `f32` holds exactly. Below it the `f32` product is
/// the correctly rounded `value * factor`, so `0.7` scales 10 to 7.
const F32_EXACT: u32 = 1 << 24;

// Float-to-int `as` casts truncate toward zero and saturate; NaN maps to 0.
impl Scalable for i32 {
    fn scaled(&self, factor: f32) -> Self {
        if self.unsigned_abs() <= F32_EXACT {
            (*self as f32 * factor) as i32
        } else {
            (f64::from(*self) * f64::from(factor)) as i32
        }
    }
}

/// Magnitudes above 2^53 lose precision on the `f64` path; only a factor
/// of exactly `1.0` is guaranteed to leave them untouched.
impl Scalable for i64 {
    fn scaled(&self, factor: f32) -> Self {
        if factor == 1.0 {
            *self
        } else if self.unsigned_abs() <= u64::from(F32_EXACT) {
            (*self as f32 * factor) as i64
        } else {
            (*self as f64 * f64::from(factor)) as i64
        }
    }
}
