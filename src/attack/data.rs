//! Multi-channel attack payload.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::modifiers::{Additive, Channeled, Scalable};

/// Where a portion of an attack lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display, EnumCount, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttackChannel {
    /// The front enemy.
    Normal,
    /// Every enemy.
    All,
    /// One enemy picked at random.
    Random,
    /// The back enemy.
    Last,
    /// The second enemy from the front.
    Second,
    /// The third enemy from the front.
    Third,
}

impl AttackChannel {
    const fn slot(self) -> usize {
        self as usize
    }
}

/// Attack damage split across [`AttackChannel`]s.
///
/// A plain value: built fresh per attack resolution, threaded through the
/// player-attack pipeline and dropped once the hits are dealt. All
/// arithmetic is channel-wise and total (additions wrap, scaling
/// truncates and saturates).
///
/// ```
/// use rust_modifiers::attack::{AttackChannel, AttackData};
///
/// let attack = AttackData::new()
///     .with(AttackChannel::Normal, 7)
///     .with(AttackChannel::All, 2);
///
/// assert_eq!(attack.total_attack(), 9);
/// assert_eq!(attack.multiply(1.5).get(AttackChannel::Normal), 10);
///
/// let hits: Vec<_> = attack.channels().collect();
/// assert_eq!(hits, vec![(AttackChannel::Normal, 7), (AttackChannel::All, 2)]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackData {
    pub normal: i32,
    pub all: i32,
    pub random: i32,
    pub last: i32,
    pub second: i32,
    pub third: i32,
}

impl AttackData {
    /// All channels zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            normal: 0,
            all: 0,
            random: 0,
            last: 0,
            second: 0,
            third: 0,
        }
    }

    /// Single-channel attack.
    #[must_use]
    pub fn single(channel: AttackChannel, value: i32) -> Self {
        Self::new().with(channel, value)
    }

    /// Build from `(channel, value)` pairs. Repeated channels accumulate.
    pub fn from_channels(pairs: impl IntoIterator<Item = (AttackChannel, i32)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |acc, (channel, value)| acc.with_added(channel, value))
    }

    /// Non-zero channels as an owned list.
    #[must_use]
    pub fn to_channels(&self) -> Vec<(AttackChannel, i32)> {
        self.channels().collect()
    }

    fn slots(&self) -> [i32; 6] {
        [self.normal, self.all, self.random, self.last, self.second, self.third]
    }

    fn from_slots(slots: [i32; 6]) -> Self {
        let [normal, all, random, last, second, third] = slots;
        Self {
            normal,
            all,
            random,
            last,
            second,
            third,
        }
    }

    fn zip_with(self, rhs: Self, op: impl Fn(i32, i32) -> i32) -> Self {
        let (a, b) = (self.slots(), rhs.slots());
        Self::from_slots(std::array::from_fn(|i| op(a[i], b[i])))
    }

    fn slot_mut(&mut self, channel: AttackChannel) -> &mut i32 {
        match channel {
            AttackChannel::Normal => &mut self.normal,
            AttackChannel::All => &mut self.all,
            AttackChannel::Random => &mut self.random,
            AttackChannel::Last => &mut self.last,
            AttackChannel::Second => &mut self.second,
            AttackChannel::Third => &mut self.third,
        }
    }

    /// Read one channel.
    #[must_use]
    pub fn get(&self, channel: AttackChannel) -> i32 {
        self.slots()[channel.slot()]
    }

    /// Overwrite one channel.
    pub fn set(&mut self, channel: AttackChannel, value: i32) {
        *self.slot_mut(channel) = value;
    }

    /// Add to one channel.
    pub fn add_to(&mut self, channel: AttackChannel, delta: i32) {
        let slot = self.slot_mut(channel);
        *slot = slot.wrapping_add(delta);
    }

    /// Copy with one channel overwritten (builder pattern).
    #[must_use]
    pub fn with(mut self, channel: AttackChannel, value: i32) -> Self {
        self.set(channel, value);
        self
    }

    /// Copy with one channel increased (builder pattern).
    #[must_use]
    pub fn with_added(mut self, channel: AttackChannel, delta: i32) -> Self {
        self.add_to(channel, delta);
        self
    }

    /// Every channel scaled by `factor`, each truncated toward zero.
    #[must_use]
    pub fn multiply(&self, factor: f32) -> Self {
        Self::from_slots(self.slots().map(|v| v.scaled(factor)))
    }

    /// True when every channel is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|&v| v == 0)
    }

    /// Sum of all channels.
    #[must_use]
    pub fn total_attack(&self) -> i64 {
        self.slots().iter().map(|&v| i64::from(v)).sum()
    }

    /// Non-zero `(channel, value)` pairs in channel order.
    ///
    /// Computed on every call; nothing is cached.
    pub fn channels(&self) -> impl Iterator<Item = (AttackChannel, i32)> + '_ {
        AttackChannel::iter()
            .map(move |channel| (channel, self.get(channel)))
            .filter(|&(_, value)| value != 0)
    }
}

impl Add for AttackData {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, i32::wrapping_add)
    }
}

impl Sub for AttackData {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, i32::wrapping_sub)
    }
}

impl AddAssign for AttackData {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for AttackData {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Additive for AttackData {
    fn plus(&self, rhs: &Self) -> Self {
        *self + *rhs
    }
}

impl Scalable for AttackData {
    fn scaled(&self, factor: f32) -> Self {
        self.multiply(factor)
    }
}

impl Channeled for AttackData {
    type Channel = AttackChannel;

    fn channel(&self, channel: AttackChannel) -> i32 {
        self.get(channel)
    }

    fn with_channel(&self, channel: AttackChannel, value: i32) -> Self {
        self.with(channel, value)
    }
}

impl fmt::Display for AttackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Attack(")?;
        for (i, (channel, value)) in self.channels().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", channel, value)?;
        }
        f.write_str(")")
    }
}
