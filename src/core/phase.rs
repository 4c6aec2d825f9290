//! Modifier phases.
//!
//! Phases are coarse buckets that dominate priority: every Addition
//! modifier runs before any Multiplication modifier, whatever their
//! priorities. The set is closed; a new phase is a code change.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Fixed-order application bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Runs before any arithmetic (clamping inputs, early observation).
    PreProcess,
    /// Flat bonuses.
    #[default]
    Addition,
    /// Scaling.
    Multiplication,
    /// Moving quantity between channels of a composite value.
    Conversion,
    /// Replacing the value outright.
    Override,
    /// Observation and late adjustment, after the value is settled.
    PostProcess,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_phase_order() {
        let phases: Vec<_> = Phase::iter().collect();
        let mut sorted = phases.clone();
        sorted.sort();
        assert_eq!(phases, sorted);

        assert!(Phase::Addition < Phase::Multiplication);
        assert!(Phase::Multiplication < Phase::Conversion);
        assert!(Phase::Conversion < Phase::Override);
        assert!(Phase::Override < Phase::PostProcess);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::PostProcess.to_string(), "post_process");
        assert_eq!("multiplication".parse::<Phase>().unwrap(), Phase::Multiplication);
    }
}
