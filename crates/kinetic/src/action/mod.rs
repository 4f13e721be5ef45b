use std::fmt;

use thiserror::Error;

use crate::target::SharedTarget;

mod appearance;
mod instant;
mod motion;
#[cfg(test)]
pub(crate) mod probe;
mod repeat;
mod sequence;
mod spawn;
mod timer;
mod timing;
mod transform;

pub use appearance::{Blink, Fade, Tint};
pub use instant::{Instant, InstantEffect, TargetCallback};
pub use motion::{BezierConfig, Bezier, Jump, Move};
pub use repeat::{Repeat, RepeatForever};
pub use sequence::Sequence;
pub use spawn::Spawn;
pub use timer::{IntervalTimer, MIN_DURATION};
pub use timing::{ActionFloat, DelayTime, ExtraAction, FloatCallback};
pub use transform::{Rotate, Scale, Skew};

pub type BoxedAction = Box<dyn Action>;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ActionError {
    #[error("invalid duration {duration}: expected a finite, non-negative number of seconds")]
    InvalidDuration { duration: f32 },
    #[error("invalid jump count {jumps}: expected zero or more jumps")]
    NegativeJumpCount { jumps: i32 },
    #[error("invalid blink count {blinks}: expected at least one blink")]
    InvalidBlinkCount { blinks: u32 },
    #[error("{combinator} needs at least one action")]
    EmptyList { combinator: &'static str },
}

/// How a leaf family arrives at the delta it interpolates over.
///
/// `By` carries the delta itself; `To` carries a destination and the delta
/// is measured from the target's value when the action starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta<T> {
    By(T),
    To(T),
}

/// A mutation of a target expressed over normalized time.
///
/// Drivers call `start_with_target` once, then `step` every frame until
/// `is_done`, then `stop`. Combinators drive their children through
/// `update` directly with already normalized time.
pub trait Action: fmt::Debug {
    fn timer(&self) -> &IntervalTimer;
    fn timer_mut(&mut self) -> &mut IntervalTimer;

    /// Applies the action at normalized time `t` in `[0, 1]`.
    fn update(&mut self, t: f32);

    /// Detached deep copy, children included.
    fn clone_action(&self) -> BoxedAction;

    fn reverse(&self) -> Option<BoxedAction> {
        None
    }

    /// Instant actions apply their effect in `start_with_target` rather
    /// than through timed updates.
    fn is_instant(&self) -> bool {
        false
    }

    fn duration(&self) -> f32 {
        self.timer().duration()
    }

    fn elapsed(&self) -> f32 {
        self.timer().elapsed()
    }

    fn target(&self) -> Option<SharedTarget> {
        self.timer().target()
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer_mut().start(&target);
    }

    fn step(&mut self, dt: f32) {
        let t = self.timer_mut().advance(dt);
        self.update(t);
    }

    fn is_done(&self) -> bool {
        self.timer().is_done()
    }

    fn stop(&mut self) {
        self.timer_mut().unbind();
    }
}

/// Forwards normalized time to a child and keeps its clock in step, so the
/// child reports done once a composite has carried it to the end.
pub(crate) fn drive(child: &mut dyn Action, t: f32) {
    child.update(t);
    child.timer_mut().seek(t);
}

impl Clone for BoxedAction {
    fn clone(&self) -> Self {
        self.clone_action()
    }
}
