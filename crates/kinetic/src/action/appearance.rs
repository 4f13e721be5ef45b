use crate::math::{channel_to_u8, lerp, Color3};
use crate::target::SharedTarget;

use super::{Action, ActionError, BoxedAction, Delta, IntervalTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeKind {
    To,
    In,
    Out,
}

/// Opacity ramp from whatever the target shows at start to `to_opacity`.
#[derive(Debug, Clone)]
pub struct Fade {
    timer: IntervalTimer,
    kind: FadeKind,
    to_opacity: u8,
    from_opacity: u8,
}

impl Fade {
    pub fn to(duration: f32, opacity: u8) -> Result<Self, ActionError> {
        Self::build(duration, FadeKind::To, opacity)
    }

    pub fn fade_in(duration: f32) -> Result<Self, ActionError> {
        Self::build(duration, FadeKind::In, u8::MAX)
    }

    pub fn fade_out(duration: f32) -> Result<Self, ActionError> {
        Self::build(duration, FadeKind::Out, 0)
    }

    fn build(duration: f32, kind: FadeKind, to_opacity: u8) -> Result<Self, ActionError> {
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            kind,
            to_opacity,
            from_opacity: u8::MAX,
        })
    }

    pub fn to_opacity(&self) -> u8 {
        self.to_opacity
    }
}

impl Action for Fade {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        if let Some(opacity) = self.timer.with_target(|target| target.opacity()) {
            self.from_opacity = opacity;
        }
    }

    fn update(&mut self, t: f32) {
        let opacity = channel_to_u8(lerp(
            f32::from(self.from_opacity),
            f32::from(self.to_opacity),
            t,
        ));
        self.timer.with_target(|target| target.set_opacity(opacity));
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        let duration = self.timer.duration();
        let kind = match self.kind {
            FadeKind::In => FadeKind::Out,
            FadeKind::Out => FadeKind::In,
            FadeKind::To => return None,
        };
        let to_opacity = if kind == FadeKind::In { u8::MAX } else { 0 };
        Some(Box::new(Self {
            timer: IntervalTimer::with_duration(duration),
            kind,
            to_opacity,
            from_opacity: u8::MAX,
        }))
    }
}

/// Colour ramp. `To` aims at an absolute colour; `By` adds signed
/// per-channel deltas. Channels saturate at 0 and 255.
#[derive(Debug, Clone)]
pub struct Tint {
    timer: IntervalTimer,
    delta: Delta<[f32; 3]>,
    from: [f32; 3],
    color_delta: [f32; 3],
}

impl Tint {
    pub fn to(duration: f32, color: Color3) -> Result<Self, ActionError> {
        Self::build(duration, Delta::To(color.channels()))
    }

    pub fn by(duration: f32, red: i16, green: i16, blue: i16) -> Result<Self, ActionError> {
        Self::build(
            duration,
            Delta::By([f32::from(red), f32::from(green), f32::from(blue)]),
        )
    }

    fn build(duration: f32, delta: Delta<[f32; 3]>) -> Result<Self, ActionError> {
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            delta,
            from: Color3::WHITE.channels(),
            color_delta: [0.0; 3],
        })
    }
}

impl Action for Tint {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        if let Some(color) = self.timer.with_target(|target| target.color()) {
            self.from = color.channels();
        }
        self.color_delta = match self.delta {
            Delta::By(delta) => delta,
            Delta::To(destination) => {
                let from = self.from;
                [
                    destination[0] - from[0],
                    destination[1] - from[1],
                    destination[2] - from[2],
                ]
            }
        };
    }

    fn update(&mut self, t: f32) {
        let from = self.from;
        let delta = self.color_delta;
        let color = Color3::from_channels([
            from[0] + delta[0] * t,
            from[1] + delta[1] * t,
            from[2] + delta[2] * t,
        ]);
        self.timer.with_target(|target| target.set_color(color));
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        let Delta::By([red, green, blue]) = self.delta else {
            return None;
        };
        Some(Box::new(Self {
            timer: IntervalTimer::with_duration(self.timer.duration()),
            delta: Delta::By([-red, -green, -blue]),
            from: Color3::WHITE.channels(),
            color_delta: [0.0; 3],
        }))
    }
}

/// Toggles visibility `times` times over its duration. Stopping puts the
/// visibility back to what it was when the blink started.
#[derive(Debug, Clone)]
pub struct Blink {
    timer: IntervalTimer,
    times: u32,
    original_visible: bool,
}

impl Blink {
    pub fn new(duration: f32, times: u32) -> Result<Self, ActionError> {
        if times == 0 {
            return Err(ActionError::InvalidBlinkCount { blinks: times });
        }
        Ok(Self {
            timer: IntervalTimer::new(duration)?,
            times,
            original_visible: true,
        })
    }

    pub fn times(&self) -> u32 {
        self.times
    }
}

impl Action for Blink {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        if let Some(visible) = self.timer.with_target(|target| target.is_visible()) {
            self.original_visible = visible;
        }
    }

    fn update(&mut self, t: f32) {
        if self.timer.is_done() {
            return;
        }
        let slice = 1.0 / self.times as f32;
        let visible = t % slice > slice / 2.0;
        self.timer.with_target(|target| target.set_visible(visible));
    }

    fn stop(&mut self) {
        let original = self.original_visible;
        self.timer.with_target(|target| target.set_visible(original));
        self.timer.unbind();
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        Some(self.clone_action())
    }
}
