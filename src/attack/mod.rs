//! Attack payloads.
//!
//! [`AttackData`] is the value type of the player-attack pipeline. It shows
//! that modifiers work on composite values as well as scalars: the same
//! addition and multiplication kinds apply channel-wise, and conversion
//! moves damage from one channel to another.
//!
//! ```
//! use rust_modifiers::attack::{AttackChannel, AttackData};
//! use rust_modifiers::core::OwnerId;
//! use rust_modifiers::modifiers::Modifier;
//! use rust_modifiers::pipeline::Pipeline;
//!
//! let attack = Pipeline::<AttackData>::new("player-attack");
//! let relic = OwnerId::from_raw(3);
//!
//! // "Half of your front-line damage splashes to every enemy"
//! attack.add_modifier(Modifier::conversion(relic, AttackChannel::Normal, AttackChannel::All, 0.5));
//!
//! let result = attack.process(AttackData::single(AttackChannel::Normal, 9));
//! assert_eq!(result.to_channels(), vec![(AttackChannel::All, 4)]);
//! ```

mod data;

pub use data::{AttackChannel, AttackData};
