use crate::time::{self, Interval, TimeValue};

/// Output frames of one motion on the scene timeline.
///
/// Every output frame carries its tick time and the seconds elapsed since
/// the motion start, which is what tracks are sampled with.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSchedule {
    /// Tick range covered by keys, both ends inclusive.
    pub range: Interval,
    pub ticks: Vec<TimeValue>,
    pub secs: Vec<f32>,
    /// Rate the authored keys are laid out at.
    pub motion_rate: f32,
    pub ticks_per_frame: TimeValue,
}

impl FrameSchedule {
    /// Lays out `num_frames` authored frames at `motion_rate` onto a scene
    /// running at `scene_rate`, starting at tick `start`.
    ///
    /// The motion duration is rounded to the nearest whole scene frame.
    #[must_use]
    pub fn new(num_frames: u32, motion_rate: u32, scene_rate: u32, start: TimeValue) -> Self {
        let motion_rate = motion_rate.max(1) as f32;
        let tpf = time::ticks_per_frame(scene_rate);

        let mut num_ticks = time::sec_to_ticks(num_frames as f32 / motion_rate);
        let overlap = num_ticks % tpf;
        if overlap > tpf / 2 {
            num_ticks = num_ticks.saturating_add(tpf - overlap);
        } else {
            num_ticks -= overlap;
        }

        let range = Interval::new(start, start.saturating_add(num_ticks).saturating_sub(tpf));
        let (ticks, secs) = (range.start..=range.end)
            .step_by(tpf as usize)
            .map(|v| (v, time::ticks_to_sec(v - start)))
            .unzip();

        Self {
            range,
            ticks,
            secs,
            motion_rate,
            ticks_per_frame: tpf,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Range published to the scene. A single-frame motion is widened by one
    /// frame so the range never collapses.
    #[must_use]
    pub fn anim_range(&self) -> Interval {
        let mut range = self.range;
        if range.start == range.end {
            range.end = range.end.saturating_add(self.ticks_per_frame);
        }
        range
    }

    /// Tick where the next motion in a sequence starts.
    #[inline]
    #[must_use]
    pub fn next_start(&self) -> TimeValue {
        self.anim_range().end.saturating_add(self.ticks_per_frame)
    }
}
