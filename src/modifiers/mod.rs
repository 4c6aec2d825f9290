//! Modifiers: single rules that transform a value.
//!
//! A modifier carries a phase, a priority, an owner, a condition, an
//! apply function `(original, current) -> current'` and an optional
//! callback fired once the whole run settles.
//!
//! ## Standard Kinds
//!
//! | Kind | Apply | Default phase |
//! |---|---|---|
//! | [`Modifier::addition`] | `current + amount` | Addition |
//! | [`Modifier::multiplication`] | `truncate(current * m)` | Multiplication |
//! | [`Modifier::conversion`] | move `from` into `to`, scaled | Conversion |
//! | [`Modifier::override_with`] | fixed value | Override |
//! | [`Modifier::callback`] | unchanged | PostProcess |
//! | [`Modifier::custom`] | game rule body | caller's choice |
//!
//! The engine supplies the plumbing; what a custom rule actually does
//! ("add burn to the first enemy") belongs to the game.

mod condition;
mod modifier;
mod value;

pub use condition::Condition;
pub use modifier::{Modifier, ModifierKind};
pub use value::{Additive, Channeled, Scalable};
