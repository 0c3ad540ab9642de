//! Keyframe channels.
//!
//! Each node owns one channel per transform component. A channel is an
//! ordered list of `(tick, value)` keys; sampling between keys blends
//! linearly and clamps to the first/last key outside the keyed range.

use bitflags::bitflags;
use glam::{Quat, Vec3};

use crate::motion::values::Interpolatable;
use crate::time::TimeValue;

bitflags! {
    /// Selects transform channels for bulk operations such as key deletion.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ChannelMask: u8 {
        const POSITION = 1 << 0;
        const ROTATION = 1 << 1;
        const SCALE    = 1 << 2;
        const ALL      = Self::POSITION.bits() | Self::ROTATION.bits() | Self::SCALE.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key<T> {
    pub time: TimeValue,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyChannel<T> {
    keys: Vec<Key<T>>,
}

impl<T> Default for KeyChannel<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T: Interpolatable> KeyChannel<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a key, replacing any existing key at the same tick.
    pub fn set_key(&mut self, time: TimeValue, value: T) {
        match self.keys.binary_search_by_key(&time, |k| k.time) {
            Ok(i) => self.keys[i].value = value,
            Err(i) => self.keys.insert(i, Key { time, value }),
        }
    }

    #[inline]
    #[must_use]
    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn key(&self, index: usize) -> Option<&Key<T>> {
        self.keys.get(index)
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Key<T>] {
        &self.keys
    }

    /// Returns the key stored exactly at `time`.
    #[must_use]
    pub fn key_at(&self, time: TimeValue) -> Option<T> {
        self.keys
            .binary_search_by_key(&time, |k| k.time)
            .ok()
            .map(|i| self.keys[i].value)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Evaluates the channel at `time`, or `None` when it holds no keys.
    #[must_use]
    pub fn sample(&self, time: TimeValue) -> Option<T> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;

        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }

        // partition_point: first key strictly after `time`
        let next = self.keys.partition_point(|k| k.time <= time);
        let k0 = &self.keys[next - 1];
        let k1 = &self.keys[next];
        if k0.time == time {
            return Some(k0.value);
        }

        let t = (time - k0.time) as f32 / (k1.time - k0.time) as f32;
        Some(T::interpolate_linear(k0.value, k1.value, t))
    }
}

/// The three keyed channels of a node's transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformChannels {
    pub position: KeyChannel<Vec3>,
    pub rotation: KeyChannel<Quat>,
    pub scale: KeyChannel<Vec3>,
}

impl TransformChannels {
    pub fn delete_keys(&mut self, mask: ChannelMask) {
        if mask.contains(ChannelMask::POSITION) {
            self.position.clear();
        }
        if mask.contains(ChannelMask::ROTATION) {
            self.rotation.clear();
        }
        if mask.contains(ChannelMask::SCALE) {
            self.scale.clear();
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty() && self.rotation.is_empty() && self.scale.is_empty()
    }
}
