use std::fmt;
use std::rc::Rc;

use crate::math::lerp;

use super::{Action, ActionError, BoxedAction, IntervalTimer};

/// Occupies time without touching the target.
#[derive(Debug, Clone)]
pub struct DelayTime {
    timer: IntervalTimer,
}

impl DelayTime {
    pub fn new(duration: f32) -> Result<Self, ActionError> {
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
        })
    }

    /// Idle tail Spawn appends to its shorter child.
    pub(crate) fn padding(duration: f32) -> Self {
        Self {
            timer: IntervalTimer::with_duration(duration),
        }
    }
}

impl Action for DelayTime {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn update(&mut self, _t: f32) {}

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        Some(self.clone_action())
    }
}

/// Zero-duration no-op that fills the second slot of a one-action sequence.
#[derive(Debug, Clone)]
pub struct ExtraAction {
    timer: IntervalTimer,
}

impl ExtraAction {
    pub fn new() -> Self {
        Self {
            timer: IntervalTimer::with_duration(0.0),
        }
    }
}

impl Default for ExtraAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for ExtraAction {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn update(&mut self, _t: f32) {}

    fn clone_action(&self) -> BoxedAction {
        Box::new(Self::new())
    }

    fn reverse(&self) -> Option<BoxedAction> {
        Some(Box::new(Self::new()))
    }
}

#[derive(Clone)]
pub struct FloatCallback(Rc<dyn Fn(f32)>);

impl FloatCallback {
    pub fn new(callback: impl Fn(f32) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    fn call(&self, value: f32) {
        (self.0)(value);
    }
}

impl fmt::Debug for FloatCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FloatCallback(..)")
    }
}

/// Interpolates a scalar from `from` to `to` and hands each value to a
/// callback instead of writing a target property.
#[derive(Debug, Clone)]
pub struct ActionFloat {
    timer: IntervalTimer,
    from: f32,
    to: f32,
    callback: FloatCallback,
}

impl ActionFloat {
    pub fn new(
        duration: f32,
        from: f32,
        to: f32,
        callback: impl Fn(f32) + 'static,
    ) -> Result<Self, ActionError> {
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            from,
            to,
            callback: FloatCallback::new(callback),
        })
    }

    pub fn from_value(&self) -> f32 {
        self.from
    }

    pub fn to_value(&self) -> f32 {
        self.to
    }
}

impl Action for ActionFloat {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn update(&mut self, t: f32) {
        if !self.timer.is_bound() {
            return;
        }
        self.callback.call(lerp(self.from, self.to, t));
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        Some(Box::new(Self {
            timer: IntervalTimer::with_duration(self.timer.duration()),
            from: self.to,
            to: self.from,
            callback: self.callback.clone(),
        }))
    }
}
