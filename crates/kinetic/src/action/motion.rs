//! Position families. Each one remembers where it last put the target and
//! folds any movement made by someone else since then into its start
//! point, so several of them running on one target add up.

use crate::math::{bezier_at, Vec2, Vec3};
use crate::target::{SharedTarget, Target};

use super::{Action, ActionError, BoxedAction, Delta, IntervalTimer};

/// Shifts `start` by whatever moved the target since `previous`, places
/// the target at `start + offset` and records that as the new `previous`.
fn place_stacked(target: &mut dyn Target, start: &mut Vec3, previous: &mut Vec3, offset: Vec3) {
    let current = target.position();
    *start += current - *previous;
    let next = *start + offset;
    target.set_position(next);
    *previous = next;
}

fn bound_position(timer: &IntervalTimer) -> Vec3 {
    timer.with_target(|target| target.position()).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct Move {
    timer: IntervalTimer,
    delta: Delta<Vec3>,
    planar: bool,
    position_delta: Vec3,
    start: Vec3,
    previous: Vec3,
}

impl Move {
    pub fn by(duration: f32, delta: Vec2) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(delta.extend(0.0)), true)
    }

    /// Moves to `destination` in the xy plane; `z` is left alone.
    pub fn to(duration: f32, destination: Vec2) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(destination.extend(0.0)), true)
    }

    pub fn by_3d(duration: f32, delta: Vec3) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(delta), false)
    }

    pub fn to_3d(duration: f32, destination: Vec3) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(destination), false)
    }

    fn build(duration: f32, delta: Delta<Vec3>, planar: bool) -> Result<Self, ActionError> {
        let position_delta = match delta {
            Delta::By(delta) => delta,
            Delta::To(_) => Vec3::ZERO,
        };
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            delta,
            planar,
            position_delta,
            start: Vec3::ZERO,
            previous: Vec3::ZERO,
        })
    }

    pub fn delta(&self) -> Delta<Vec3> {
        self.delta
    }
}

impl Action for Move {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        self.start = bound_position(&self.timer);
        self.previous = self.start;
        self.position_delta = match self.delta {
            Delta::By(delta) => delta,
            Delta::To(destination) => {
                let mut delta = destination - self.start;
                if self.planar {
                    delta.z = 0.0;
                }
                delta
            }
        };
    }

    fn update(&mut self, t: f32) {
        let offset = self.position_delta * t;
        self.timer.with_target(|target| {
            place_stacked(target, &mut self.start, &mut self.previous, offset);
        });
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        match self.delta {
            Delta::By(delta) => Some(Box::new(Self {
                timer: IntervalTimer::with_duration(self.timer.duration()),
                delta: Delta::By(-delta),
                planar: self.planar,
                position_delta: -delta,
                start: Vec3::ZERO,
                previous: Vec3::ZERO,
            })),
            Delta::To(_) => None,
        }
    }
}

/// Parabolic hops layered over a linear displacement.
#[derive(Debug, Clone)]
pub struct Jump {
    timer: IntervalTimer,
    delta: Delta<Vec2>,
    height: f32,
    jumps: u32,
    position_delta: Vec2,
    start: Vec3,
    previous: Vec3,
}

impl Jump {
    pub fn by(duration: f32, delta: Vec2, height: f32, jumps: i32) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(delta), height, jumps)
    }

    pub fn to(
        duration: f32,
        destination: Vec2,
        height: f32,
        jumps: i32,
    ) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(destination), height, jumps)
    }

    fn build(
        duration: f32,
        delta: Delta<Vec2>,
        height: f32,
        jumps: i32,
    ) -> Result<Self, ActionError> {
        let jumps = u32::try_from(jumps).map_err(|_| ActionError::NegativeJumpCount { jumps })?;
        let position_delta = match delta {
            Delta::By(delta) => delta,
            Delta::To(_) => Vec2::ZERO,
        };
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            delta,
            height,
            jumps,
            position_delta,
            start: Vec3::ZERO,
            previous: Vec3::ZERO,
        })
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn jumps(&self) -> u32 {
        self.jumps
    }
}

impl Action for Jump {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        self.start = bound_position(&self.timer);
        self.previous = self.start;
        self.position_delta = match self.delta {
            Delta::By(delta) => delta,
            Delta::To(destination) => destination - self.start.truncate(),
        };
    }

    fn update(&mut self, t: f32) {
        let frac = (t * self.jumps as f32) % 1.0;
        let arc = self.height * 4.0 * frac * (1.0 - frac);
        let offset = Vec3::new(
            self.position_delta.x * t,
            arc + self.position_delta.y * t,
            0.0,
        );
        self.timer.with_target(|target| {
            place_stacked(target, &mut self.start, &mut self.previous, offset);
        });
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        match self.delta {
            Delta::By(delta) => Some(Box::new(Self {
                timer: IntervalTimer::with_duration(self.timer.duration()),
                delta: Delta::By(-delta),
                height: self.height,
                jumps: self.jumps,
                position_delta: -delta,
                start: Vec3::ZERO,
                previous: Vec3::ZERO,
            })),
            Delta::To(_) => None,
        }
    }
}

/// End point and two control points of a cubic curve. Relative to the
/// start position for `Bezier::by`, absolute for `Bezier::to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierConfig {
    pub end: Vec2,
    pub control_1: Vec2,
    pub control_2: Vec2,
}

impl BezierConfig {
    fn offset_by(self, origin: Vec2) -> Self {
        Self {
            end: self.end - origin,
            control_1: self.control_1 - origin,
            control_2: self.control_2 - origin,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bezier {
    timer: IntervalTimer,
    config: Delta<BezierConfig>,
    relative: BezierConfig,
    start: Vec3,
    previous: Vec3,
}

impl Bezier {
    pub fn by(duration: f32, config: BezierConfig) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(config))
    }

    pub fn to(duration: f32, config: BezierConfig) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(config))
    }

    fn build(duration: f32, config: Delta<BezierConfig>) -> Result<Self, ActionError> {
        let relative = match config {
            Delta::By(config) | Delta::To(config) => config,
        };
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            config,
            relative,
            start: Vec3::ZERO,
            previous: Vec3::ZERO,
        })
    }
}

impl Action for Bezier {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        self.start = bound_position(&self.timer);
        self.previous = self.start;
        self.relative = match self.config {
            Delta::By(config) => config,
            Delta::To(config) => config.offset_by(self.start.truncate()),
        };
    }

    fn update(&mut self, t: f32) {
        let curve = self.relative;
        let x = bezier_at(0.0, curve.control_1.x, curve.control_2.x, curve.end.x, t);
        let y = bezier_at(0.0, curve.control_1.y, curve.control_2.y, curve.end.y, t);
        self.timer.with_target(|target| {
            place_stacked(
                target,
                &mut self.start,
                &mut self.previous,
                Vec3::new(x, y, 0.0),
            );
        });
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    /// Walks the same curve backwards: the end point is negated and the
    /// control points are re-expressed relative to the old end.
    fn reverse(&self) -> Option<BoxedAction> {
        let Delta::By(config) = self.config else {
            return None;
        };
        let reversed = BezierConfig {
            end: -config.end,
            control_1: config.control_2 - config.end,
            control_2: config.control_1 - config.end,
        };
        Some(Box::new(Self {
            timer: IntervalTimer::with_duration(self.timer.duration()),
            config: Delta::By(reversed),
            relative: reversed,
            start: Vec3::ZERO,
            previous: Vec3::ZERO,
        }))
    }
}
