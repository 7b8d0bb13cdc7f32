/// Linear gain ramp driven by the engine's sample clock.
///
/// `Static` holds a fixed level; `Ramp` interpolates between two levels over
/// a half-open span of frames and collapses back to `Static` once stepped
/// past its end.
#[derive(Clone, Debug)]
pub enum Volume {
    Static(f32),
    Ramp {
        from: f32,
        to: f32,
        start: usize,
        end: usize,
    },
}

impl Default for Volume {
    fn default() -> Self {
        Volume::Static(1.0)
    }
}

impl Volume {
    pub fn new(value: f32) -> Self {
        Volume::Static(value)
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Volume::Static(_))
    }

    pub fn is_static_and_mute(&self) -> bool {
        matches!(self, Volume::Static(x) if *x == 0.0)
    }

    pub fn value(&self, now: usize) -> f32 {
        match self {
            Volume::Static(value) => *value,
            Volume::Ramp {
                from,
                to,
                start,
                end,
            } => {
                // clamped rather than asserted: value() is called on the
                // render path, which must never panic
                let t = (now.saturating_sub(*start)) as f32 / (*end - *start) as f32;
                let t = t.min(1.0);
                from + (to - from) * t
            }
        }
    }

    /// Start a ramp from the current level towards `target` over `duration`
    /// frames. A zero duration switches immediately.
    pub fn to(&mut self, now: usize, duration: usize, target: f32) {
        if duration == 0 {
            *self = Volume::Static(target);
        } else {
            let from = self.value(now);
            *self = Volume::Ramp {
                from,
                to: target,
                start: now,
                end: now + duration,
            };
        }
    }

    /// Collapse a finished ramp. Must be called once per frame after the
    /// frame's value has been read.
    pub fn step(&mut self, now: usize) {
        if let Volume::Ramp { to, end, .. } = self {
            if now >= *end {
                *self = Volume::Static(*to);
            }
        }
    }
}
