use std::fmt;
use std::rc::Rc;

use crate::math::{Vec2, Vec3};
use crate::target::{SharedTarget, Target};

use super::{Action, BoxedAction, IntervalTimer};

#[derive(Clone)]
pub struct TargetCallback(Rc<dyn Fn(&mut dyn Target)>);

impl TargetCallback {
    pub fn new(callback: impl Fn(&mut dyn Target) + 'static) -> Self {
        Self(Rc::new(callback))
    }
}

impl fmt::Debug for TargetCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TargetCallback(..)")
    }
}

#[derive(Debug, Clone)]
pub enum InstantEffect {
    Show,
    Hide,
    ToggleVisibility,
    /// Sets x and y, keeps z.
    Place(Vec2),
    Place3d(Vec3),
    Call(TargetCallback),
}

impl InstantEffect {
    fn apply(&self, target: &mut dyn Target) {
        match self {
            InstantEffect::Show => target.set_visible(true),
            InstantEffect::Hide => target.set_visible(false),
            InstantEffect::ToggleVisibility => {
                let visible = target.is_visible();
                target.set_visible(!visible);
            }
            InstantEffect::Place(position) => {
                let z = target.position().z;
                target.set_position(position.extend(z));
            }
            InstantEffect::Place3d(position) => target.set_position(*position),
            InstantEffect::Call(callback) => (callback.0)(target),
        }
    }
}

/// Zero-duration action whose effect lands in `start_with_target`.
/// `update` does nothing, so an instant inside a combinator fires once
/// every time the combinator starts it.
#[derive(Debug, Clone)]
pub struct Instant {
    timer: IntervalTimer,
    effect: InstantEffect,
}

impl Instant {
    pub fn new(effect: InstantEffect) -> Self {
        Self {
            timer: IntervalTimer::with_duration(0.0),
            effect,
        }
    }

    pub fn show() -> Self {
        Self::new(InstantEffect::Show)
    }

    pub fn hide() -> Self {
        Self::new(InstantEffect::Hide)
    }

    pub fn toggle_visibility() -> Self {
        Self::new(InstantEffect::ToggleVisibility)
    }

    pub fn place(position: Vec2) -> Self {
        Self::new(InstantEffect::Place(position))
    }

    pub fn place_3d(position: Vec3) -> Self {
        Self::new(InstantEffect::Place3d(position))
    }

    pub fn call(callback: impl Fn(&mut dyn Target) + 'static) -> Self {
        Self::new(InstantEffect::Call(TargetCallback::new(callback)))
    }

    pub fn effect(&self) -> &InstantEffect {
        &self.effect
    }
}

impl Action for Instant {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn is_instant(&self) -> bool {
        true
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        let effect = &self.effect;
        self.timer.with_target(|target| effect.apply(target));
    }

    fn update(&mut self, _t: f32) {}

    fn clone_action(&self) -> BoxedAction {
        Box::new(Self::new(self.effect.clone()))
    }

    fn reverse(&self) -> Option<BoxedAction> {
        let effect = match &self.effect {
            InstantEffect::Show => InstantEffect::Hide,
            InstantEffect::Hide => InstantEffect::Show,
            other => other.clone(),
        };
        Some(Box::new(Self::new(effect)))
    }
}
