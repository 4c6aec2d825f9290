//! AttackData integration tests.
//!
//! Channel algebra on its own, and the player-attack pipeline carrying a
//! composite value through addition, multiplication and conversion.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use rust_modifiers::attack::{AttackChannel, AttackData};
use rust_modifiers::core::{OwnerId, Phase};
use rust_modifiers::modifiers::{Condition, Modifier};
use rust_modifiers::pipeline::Pipeline;
use rust_modifiers::registry::{PipelineId, Registry};
use strum::IntoEnumIterator;

const RELIC_A: OwnerId = OwnerId::from_raw(1);
const RELIC_B: OwnerId = OwnerId::from_raw(2);

fn arb_channel() -> impl Strategy<Value = AttackChannel> {
    prop::sample::select(AttackChannel::iter().collect::<Vec<_>>())
}

fn arb_attack() -> impl Strategy<Value = AttackData> {
    prop::collection::vec((arb_channel(), any::<i32>()), 0..8).prop_map(|pairs| {
        pairs
            .into_iter()
            .fold(AttackData::new(), |acc, (channel, value)| acc.with(channel, value))
    })
}

// =============================================================================
// Channel algebra
// =============================================================================

proptest! {
    /// Converting to channel pairs and back reproduces the value, and the
    /// pairs only name non-zero channels.
    #[test]
    fn prop_channel_round_trip(data in arb_attack()) {
        let pairs = data.to_channels();
        prop_assert!(pairs.iter().all(|&(_, v)| v != 0));
        prop_assert_eq!(AttackData::from_channels(pairs), data);
    }

    /// Multiplying by one changes nothing.
    #[test]
    fn prop_multiply_identity(data in arb_attack()) {
        prop_assert_eq!(data.multiply(1.0), data);
    }

    /// Addition and subtraction undo each other.
    #[test]
    fn prop_add_sub_inverse(a in arb_attack(), b in arb_attack()) {
        prop_assert_eq!((a + b) - b, a);
    }

    /// Total is the sum of the non-zero channels.
    #[test]
    fn prop_total_matches_channels(data in arb_attack()) {
        let sum: i64 = data.channels().map(|(_, v)| i64::from(v)).sum();
        prop_assert_eq!(data.total_attack(), sum);
        prop_assert_eq!(data.is_empty(), data.channels().next().is_none());
    }

    /// Scaling keeps each channel's sign and never grows it for factors in [0, 1].
    #[test]
    fn prop_multiply_shrinks(data in arb_attack(), factor in 0.0f32..=1.0) {
        let scaled = data.multiply(factor);
        for channel in AttackChannel::iter() {
            let (before, after) = (data.get(channel), scaled.get(channel));
            prop_assert!(after.unsigned_abs() <= before.unsigned_abs());
            prop_assert!(after == 0 || after.signum() == before.signum());
        }
    }
}

/// Decimal factors truncate the product as written, not one unit below it.
#[test]
fn test_multiply_decimal_factors() {
    let data = AttackData::new()
        .with(AttackChannel::Normal, 10)
        .with(AttackChannel::All, -10)
        .with(AttackChannel::Last, 7);

    let reduced = data.multiply(0.7);
    assert_eq!(reduced.get(AttackChannel::Normal), 7);
    assert_eq!(reduced.get(AttackChannel::All), -7);
    assert_eq!(reduced.get(AttackChannel::Last), 4);

    assert_eq!(data.multiply(0.3).get(AttackChannel::Normal), 3);
    assert_eq!(data.multiply(1.1).get(AttackChannel::Last), 7);
}

/// A damage-reduction multiplier through the scalar pipeline, and the
/// same factor on a conversion.
#[test]
fn test_decimal_multiplier_in_pipelines() {
    let damage = Pipeline::<i32>::new("player-damage");
    damage.add_modifier(Modifier::multiplication(RELIC_A, 0.7));
    assert_eq!(damage.process(10), 7);
    assert_eq!(damage.process(-10), -7);

    let attack = Pipeline::<AttackData>::new("player-attack");
    attack.add_modifier(Modifier::conversion(
        RELIC_A,
        AttackChannel::Normal,
        AttackChannel::All,
        0.7,
    ));
    let result = attack.process(AttackData::single(AttackChannel::Normal, 10));
    assert_eq!(result, AttackData::single(AttackChannel::All, 7));
}

// =============================================================================
// Attack pipeline
// =============================================================================

/// Channel-wise addition and multiplication, in phase order.
#[test]
fn test_attack_add_then_multiply() {
    let p = Pipeline::<AttackData>::new("player-attack");
    p.add_modifier(Modifier::multiplication(RELIC_B, 2.0));
    p.add_modifier(Modifier::addition(
        RELIC_A,
        AttackData::new().with(AttackChannel::Normal, 1).with(AttackChannel::All, 2),
    ));

    let result = p.process(AttackData::single(AttackChannel::Normal, 3));
    assert_eq!(
        result.to_channels(),
        vec![(AttackChannel::Normal, 8), (AttackChannel::All, 4)]
    );
    assert_eq!(result.total_attack(), 12);
}

/// Conversion drains the source channel into the target, scaled.
#[test]
fn test_conversion() {
    let p = Pipeline::<AttackData>::new("player-attack");
    p.add_modifier(Modifier::conversion(
        RELIC_A,
        AttackChannel::Normal,
        AttackChannel::Random,
        1.5,
    ));

    let base = AttackData::new()
        .with(AttackChannel::Normal, 5)
        .with(AttackChannel::Random, 1);
    let result = p.process(base);

    assert_eq!(result.get(AttackChannel::Normal), 0);
    assert_eq!(result.get(AttackChannel::Random), 8);
}

/// A conversion with nothing to convert is skipped, so its callback stays quiet.
#[test]
fn test_empty_conversion_skipped() {
    let p = Pipeline::<AttackData>::new("player-attack");
    let fired = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&fired);

    p.add_modifier(
        Modifier::<AttackData>::conversion(RELIC_A, AttackChannel::Last, AttackChannel::All, 1.0)
            .on_applied(move |_, _| {
                sink.fetch_add(1, Ordering::Relaxed);
            }),
    );

    let base = AttackData::single(AttackChannel::Normal, 4);
    let trace = p.process_traced(base);

    assert_eq!(trace.result, base);
    assert_eq!(trace.applied().count(), 0);
    assert_eq!(fired.load(Ordering::Relaxed), 0);

    p.process(AttackData::single(AttackChannel::Last, 2));
    assert_eq!(fired.load(Ordering::Relaxed), 1);
}

/// The author's condition and the conversion's own requirement both apply.
#[test]
fn test_conversion_with_condition() {
    let p = Pipeline::<AttackData>::new("player-attack");
    p.add_modifier(
        Modifier::conversion(RELIC_A, AttackChannel::Normal, AttackChannel::All, 1.0)
            .when(Condition::current(|a: &AttackData| a.total_attack() >= 10)),
    );

    let small = AttackData::single(AttackChannel::Normal, 4);
    assert_eq!(p.process(small), small);

    let big = AttackData::single(AttackChannel::Normal, 12);
    assert_eq!(p.process(big), AttackData::single(AttackChannel::All, 12));
}

/// Override zeroes the attack; a later conversion finds nothing to move.
#[test]
fn test_override_then_conversion_in_post_process() {
    let p = Pipeline::<AttackData>::new("player-attack");
    p.add_modifier(Modifier::override_with(RELIC_A, AttackData::new()));
    p.add_modifier(
        Modifier::<AttackData>::conversion(RELIC_B, AttackChannel::Normal, AttackChannel::All, 1.0)
            .in_phase(Phase::PostProcess),
    );

    let trace = p.process_traced(AttackData::single(AttackChannel::Normal, 9));
    assert!(trace.result.is_empty());
    assert_eq!(trace.applied().count(), 1);
}

/// The registry's player-attack pipeline carries AttackData.
#[test]
fn test_registry_attack_pipeline() {
    let registry = Registry::new();
    let relic = registry.acquire_owner();

    registry
        .register_modifier(
            PipelineId::PlayerAttack,
            Modifier::<AttackData>::conversion(relic, AttackChannel::Normal, AttackChannel::Second, 1.0),
        )
        .unwrap();

    let result = registry
        .process(PipelineId::PlayerAttack, AttackData::single(AttackChannel::Normal, 6))
        .unwrap();
    assert_eq!(result.to_channels(), vec![(AttackChannel::Second, 6)]);

    assert!(registry
        .process(PipelineId::PlayerAttack, 6i32)
        .is_err());
}
