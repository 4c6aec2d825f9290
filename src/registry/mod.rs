//! The registry of named pipelines and owner-scoped lifecycle.
//!
//! A [`Registry`] is built once at host start-up and passed to whatever
//! needs to register or process values. It holds one [`Pipeline`] per
//! [`PipelineId`], each with its own value type:
//!
//! | Pipeline | Value |
//! |---|---|
//! | `coin-gain` | `i32` |
//! | `coin-consume` | `i32` |
//! | `player-attack` | [`AttackData`] |
//! | `player-damage` | `i32` |
//! | `player-heal` | `i32` |
//! | `rest-effect` | `i32` |
//!
//! ## Owners
//!
//! Effects register under an owner and are torn down with a single
//! [`Registry::remove_all_for`], which sweeps every pipeline so nothing an
//! owner registered can outlive it.
//!
//! ```
//! use rust_modifiers::modifiers::Modifier;
//! use rust_modifiers::registry::{PipelineId, Registry};
//!
//! let registry = Registry::new();
//! let relic = registry.acquire_owner();
//!
//! registry.register_modifier(PipelineId::CoinGain, Modifier::addition(relic, 3)).unwrap();
//! registry.register_modifier(PipelineId::PlayerHeal, Modifier::<i32>::multiplication(relic, 2.0)).unwrap();
//! assert_eq!(registry.process(PipelineId::CoinGain, 10), Ok(13));
//!
//! registry.release_owner(relic);
//! assert_eq!(registry.process(PipelineId::CoinGain, 10), Ok(10));
//! assert_eq!(registry.process(PipelineId::PlayerHeal, 4), Ok(4));
//! ```
//!
//! [`Pipeline`]: crate::pipeline::Pipeline
//! [`AttackData`]: crate::attack::AttackData

mod lifecycle;
mod store;

pub use lifecycle::OwnerScope;
pub use store::Registry;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Name of a pipeline in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PipelineId {
    /// Coins the player is about to receive.
    CoinGain,
    /// Coins the player is about to spend.
    CoinConsume,
    /// The player's outgoing attack.
    PlayerAttack,
    /// Damage the player is about to take.
    PlayerDamage,
    /// Healing the player is about to receive.
    PlayerHeal,
    /// Value of resting at a rest site.
    RestEffect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_names() {
        assert_eq!(PipelineId::CoinGain.to_string(), "coin-gain");
        assert_eq!(PipelineId::PlayerAttack.as_ref(), "player-attack");
        assert_eq!("rest-effect".parse::<PipelineId>().unwrap(), PipelineId::RestEffect);
        assert!("coin_gain".parse::<PipelineId>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&PipelineId::PlayerHeal).unwrap();
        assert_eq!(json, "\"player-heal\"");
    }
}
