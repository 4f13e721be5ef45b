use std::rc::Rc;

use crate::target::{with_target, SharedTarget, Target, WeakTarget};

use super::ActionError;

/// Stand-in for a zero duration so normalized time never divides by zero.
pub const MIN_DURATION: f32 = f32::EPSILON;

/// Duration, elapsed time and target binding shared by every action.
///
/// `advance` turns a raw frame delta into normalized time in `[0, 1]`. The
/// first call after `start` never advances: it pins `elapsed` to zero and
/// swallows whatever delta the driver passes, so a long frame that happens
/// to coincide with an action starting does not skip its opening.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    duration: f32,
    elapsed: f32,
    first_tick: bool,
    target: Option<WeakTarget>,
}

impl IntervalTimer {
    pub fn new(duration: f32) -> Result<Self, ActionError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(ActionError::InvalidDuration { duration });
        }
        Ok(Self::with_duration(duration))
    }

    /// Infallible constructor for durations derived from already validated
    /// actions.
    pub(crate) fn with_duration(duration: f32) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            MIN_DURATION
        };
        Self {
            duration,
            elapsed: 0.0,
            first_tick: true,
            target: None,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn is_bound(&self) -> bool {
        self.target().is_some()
    }

    pub fn start(&mut self, target: &SharedTarget) {
        self.target = Some(Rc::downgrade(target));
        self.elapsed = 0.0;
        self.first_tick = true;
    }

    pub fn unbind(&mut self) {
        self.target = None;
    }

    /// Drops the binding and rewinds so a cloned action starts detached.
    pub(crate) fn detach(&mut self) {
        self.target = None;
        self.elapsed = 0.0;
        self.first_tick = true;
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.first_tick {
            self.first_tick = false;
            self.elapsed = 0.0;
        } else {
            self.elapsed += sanitize_delta(dt);
            if self.duration <= MIN_DURATION {
                // Degenerate durations finish on the first real tick even when dt is zero.
                self.elapsed = self.elapsed.max(self.duration);
            }
        }
        self.progress()
    }

    /// Moves elapsed time to normalized `t`. Composites call this after
    /// updating a child so the child's `is_done` tracks the time it was given.
    pub(crate) fn seek(&mut self, t: f32) {
        self.elapsed = t.clamp(0.0, 1.0) * self.duration;
    }

    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration.max(MIN_DURATION)).clamp(0.0, 1.0)
    }

    pub fn target(&self) -> Option<SharedTarget> {
        self.target.as_ref().and_then(|weak| weak.upgrade())
    }

    pub(crate) fn with_target<R>(&self, apply: impl FnOnce(&mut dyn Target) -> R) -> Option<R> {
        with_target(self.target.as_ref(), apply)
    }
}

/// Maps a floored duration back to zero so composites built only from
/// zero-duration children stay degenerate themselves.
pub(crate) fn nominal(duration: f32) -> f32 {
    if duration <= MIN_DURATION {
        0.0
    } else {
        duration
    }
}

fn sanitize_delta(dt: f32) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, f32::MAX)
}
