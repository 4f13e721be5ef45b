pub mod action;
pub mod math;
pub mod target;

pub use action::{
    Action, ActionError, ActionFloat, Bezier, BezierConfig, Blink, BoxedAction, DelayTime, Delta,
    ExtraAction, Fade, FloatCallback, Instant, InstantEffect, IntervalTimer, Jump, Move, Repeat,
    RepeatForever, Rotate, Scale, Sequence, Skew, Spawn, TargetCallback, Tint, MIN_DURATION,
};
pub use math::{Color3, Vec2, Vec3};
pub use target::{Node, SharedTarget, Target};
