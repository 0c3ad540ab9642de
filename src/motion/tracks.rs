use serde::{Deserialize, Serialize};

use crate::motion::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last key interval hit by a track so monotonic sampling
/// stays O(1).
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Discrete keys over authored frame numbers.
///
/// `times` are frame positions (fractional allowed). For
/// `CubicSpline`, `values` holds `[in_tangent, value, out_tangent]` per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTrack<T> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    #[serde(default)]
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Checks that key times ascend and the value count matches the mode.
    pub fn validate(&self) -> Result<(), String> {
        let expected = match self.interpolation {
            InterpolationMode::CubicSpline => self.times.len() * 3,
            _ => self.times.len(),
        };
        if self.values.len() != expected {
            return Err(format!(
                "{} keys need {expected} values, found {}",
                self.times.len(),
                self.values.len()
            ));
        }
        if self.times.windows(2).any(|w| w[1] < w[0]) {
            return Err("key times are not ascending".to_owned());
        }
        Ok(())
    }

    /// Number of keys.
    #[inline]
    #[must_use]
    pub fn num_frames(&self) -> usize {
        self.times.len()
    }

    /// Frame position of key `index`.
    #[inline]
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<f32> {
        self.times.get(index).copied()
    }

    /// Value of key `index`.
    #[must_use]
    pub fn evaluate(&self, index: usize) -> Option<T> {
        if index >= self.times.len() {
            return None;
        }
        self.value_at(index).copied()
    }

    /// Stateless sampling. `None` for a track without keys.
    #[must_use]
    pub fn sample(&self, frame: f32) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= frame);
        self.sample_at_key(next_idx.saturating_sub(1), frame)
    }

    /// Sampling with a cursor, for monotonic walks over the track.
    pub fn sample_with_cursor(&self, frame: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        if len == 0 {
            return None;
        }
        if len == 1 {
            return self.value_at(0).copied();
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        // Local scan around the cursor, forward or backward.
        let found = if frame >= t_curr {
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    res = Some(len - 1);
                    break;
                }
                if frame < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            (0..=MAX_SCAN_OFFSET.min(i))
                .map(|offset| i - offset)
                .find(|&idx| frame >= self.times[idx])
        };

        // Large jump: fall back to binary search.
        let index = found.unwrap_or_else(|| {
            self.times
                .partition_point(|&t| t <= frame)
                .saturating_sub(1)
        });
        cursor.last_index = index;

        self.sample_at_key(index, frame)
    }

    fn value_at(&self, index: usize) -> Option<&T> {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values.get(index * 3 + 1),
            _ => self.values.get(index),
        }
    }

    fn sample_at_key(&self, index: usize, frame: f32) -> Option<T> {
        let last = self.times.len().checked_sub(1)?;

        if frame <= self.times[0] {
            return self.value_at(0).copied();
        }
        if index >= last {
            return self.value_at(last).copied();
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        // Prevent division by zero
        let t = if dt > 1e-6 { (frame - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index).copied(),
            InterpolationMode::Linear => {
                let v0 = *self.value_at(index)?;
                let v1 = *self.value_at(next_idx)?;
                Some(T::interpolate_linear(v0, v1, t))
            }
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = next_idx * 3;

                let v0 = *self.values.get(i_prev + 1)?;
                let out_tangent0 = *self.values.get(i_prev + 2)?;
                let in_tangent1 = *self.values.get(i_next)?;
                let v1 = *self.values.get(i_next + 1)?;

                Some(T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt))
            }
        }
    }
}
