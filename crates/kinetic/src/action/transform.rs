use crate::math::{shortest_arc, Vec2, Vec3};
use crate::target::SharedTarget;

use super::{Action, ActionError, BoxedAction, Delta, IntervalTimer};

/// Rotation in degrees. "To" variants take the shortest way round.
///
/// The 2D constructors only drive `z`; the other two axes are left for
/// whatever else is animating the target.
#[derive(Debug, Clone)]
pub struct Rotate {
    timer: IntervalTimer,
    delta: Delta<Vec3>,
    planar: bool,
    start: Vec3,
    angle_delta: Vec3,
}

impl Rotate {
    pub fn by(duration: f32, degrees: f32) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(Vec3::new(0.0, 0.0, degrees)), true)
    }

    pub fn to(duration: f32, degrees: f32) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(Vec3::new(0.0, 0.0, degrees)), true)
    }

    pub fn by_3d(duration: f32, degrees: Vec3) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(degrees), false)
    }

    pub fn to_3d(duration: f32, degrees: Vec3) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(degrees), false)
    }

    fn build(duration: f32, delta: Delta<Vec3>, planar: bool) -> Result<Self, ActionError> {
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            delta,
            planar,
            start: Vec3::ZERO,
            angle_delta: Vec3::ZERO,
        })
    }
}

impl Action for Rotate {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        let current = self
            .timer
            .with_target(|target| target.rotation())
            .unwrap_or_default();

        match self.delta {
            Delta::By(delta) => {
                self.start = current;
                self.angle_delta = delta;
            }
            Delta::To(destination) => {
                let (z, dz) = shortest_arc(current.z, destination.z, 360.0);
                if self.planar {
                    self.start = Vec3::new(current.x, current.y, z);
                    self.angle_delta = Vec3::new(0.0, 0.0, dz);
                } else {
                    let (x, dx) = shortest_arc(current.x, destination.x, 360.0);
                    let (y, dy) = shortest_arc(current.y, destination.y, 360.0);
                    self.start = Vec3::new(x, y, z);
                    self.angle_delta = Vec3::new(dx, dy, dz);
                }
            }
        }
    }

    fn update(&mut self, t: f32) {
        let rotation = self.start + self.angle_delta * t;
        let planar = self.planar;
        self.timer.with_target(|target| {
            if planar {
                let mut current = target.rotation();
                current.z = rotation.z;
                target.set_rotation(current);
            } else {
                target.set_rotation(rotation);
            }
        });
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        let Delta::By(delta) = self.delta else {
            return None;
        };
        Some(Box::new(Self {
            timer: IntervalTimer::with_duration(self.timer.duration()),
            delta: Delta::By(-delta),
            planar: self.planar,
            start: Vec3::ZERO,
            angle_delta: Vec3::ZERO,
        }))
    }
}

/// Scale. `By` multiplies the scale the target has when the action starts.
#[derive(Debug, Clone)]
pub struct Scale {
    timer: IntervalTimer,
    delta: Delta<Vec3>,
    planar: bool,
    start: Vec3,
    scale_delta: Vec3,
}

impl Scale {
    pub fn by(duration: f32, factor: f32) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(Vec3::splat(factor)), false)
    }

    pub fn to(duration: f32, scale: f32) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(Vec3::splat(scale)), false)
    }

    /// Scales x and y only.
    pub fn by_xy(duration: f32, factor: Vec2) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(factor.extend(1.0)), true)
    }

    pub fn to_xy(duration: f32, scale: Vec2) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(scale.extend(1.0)), true)
    }

    pub fn by_3d(duration: f32, factor: Vec3) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(factor), false)
    }

    pub fn to_3d(duration: f32, scale: Vec3) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(scale), false)
    }

    fn build(duration: f32, delta: Delta<Vec3>, planar: bool) -> Result<Self, ActionError> {
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            delta,
            planar,
            start: Vec3::ONE,
            scale_delta: Vec3::ZERO,
        })
    }
}

impl Action for Scale {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        self.start = self
            .timer
            .with_target(|target| target.scale())
            .unwrap_or(Vec3::ONE);
        let mut delta = match self.delta {
            Delta::By(factor) => self.start.scaled_by(factor) - self.start,
            Delta::To(destination) => destination - self.start,
        };
        if self.planar {
            delta.z = 0.0;
        }
        self.scale_delta = delta;
    }

    fn update(&mut self, t: f32) {
        let scale = self.start + self.scale_delta * t;
        let planar = self.planar;
        self.timer.with_target(|target| {
            if planar {
                let z = target.scale().z;
                target.set_scale(Vec3::new(scale.x, scale.y, z));
            } else {
                target.set_scale(scale);
            }
        });
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    /// Scales back by the reciprocal factor. A zero factor has no inverse.
    fn reverse(&self) -> Option<BoxedAction> {
        let Delta::By(factor) = self.delta else {
            return None;
        };
        if factor.x == 0.0 || factor.y == 0.0 || factor.z == 0.0 {
            return None;
        }
        let inverse = Vec3::new(1.0 / factor.x, 1.0 / factor.y, 1.0 / factor.z);
        Some(Box::new(Self {
            timer: IntervalTimer::with_duration(self.timer.duration()),
            delta: Delta::By(inverse),
            planar: self.planar,
            start: Vec3::ONE,
            scale_delta: Vec3::ZERO,
        }))
    }
}

/// Skew angles in degrees. The start value is folded into a half turn
/// before the delta is measured.
#[derive(Debug, Clone)]
pub struct Skew {
    timer: IntervalTimer,
    delta: Delta<Vec2>,
    start: Vec2,
    skew_delta: Vec2,
}

impl Skew {
    pub fn by(duration: f32, degrees: Vec2) -> Result<Self, ActionError> {
        Self::build(duration, Delta::By(degrees))
    }

    pub fn to(duration: f32, degrees: Vec2) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(degrees))
    }

    fn build(duration: f32, delta: Delta<Vec2>) -> Result<Self, ActionError> {
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            delta,
            start: Vec2::ZERO,
            skew_delta: Vec2::ZERO,
        })
    }
}

impl Action for Skew {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        let current = self
            .timer
            .with_target(|target| target.skew())
            .unwrap_or_default();

        match self.delta {
            Delta::By(delta) => {
                self.start = Vec2::new(current.x % 180.0, current.y % 180.0);
                self.skew_delta = delta;
            }
            Delta::To(destination) => {
                let (x, dx) = shortest_arc(current.x, destination.x, 180.0);
                let (y, dy) = shortest_arc(current.y, destination.y, 180.0);
                self.start = Vec2::new(x, y);
                self.skew_delta = Vec2::new(dx, dy);
            }
        }
    }

    fn update(&mut self, t: f32) {
        let skew = self.start + self.skew_delta * t;
        self.timer.with_target(|target| target.set_skew(skew));
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        let Delta::By(delta) = self.delta else {
            return None;
        };
        Some(Box::new(Self {
            timer: IntervalTimer::with_duration(self.timer.duration()),
            delta: Delta::By(-delta),
            start: Vec2::ZERO,
            skew_delta: Vec2::ZERO,
        }))
    }
}
