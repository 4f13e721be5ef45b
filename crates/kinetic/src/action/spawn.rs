use crate::target::SharedTarget;

use super::timer::nominal;
use super::{
    drive, Action, ActionError, BoxedAction, DelayTime, ExtraAction, IntervalTimer, Sequence,
};

/// Runs two actions side by side. The shorter child is padded with an
/// idle delay at construction so both finish at the same normalized time.
#[derive(Debug, Clone)]
pub struct Spawn {
    timer: IntervalTimer,
    one: BoxedAction,
    two: BoxedAction,
}

impl Spawn {
    pub fn new(one: BoxedAction, two: BoxedAction) -> Self {
        let one_duration = nominal(one.duration());
        let two_duration = nominal(two.duration());
        let timer = IntervalTimer::with_duration(one_duration.max(two_duration));

        let (one, two) = if one_duration > two_duration {
            (one, pad(two, one_duration - two_duration))
        } else if two_duration > one_duration {
            (pad(one, two_duration - one_duration), two)
        } else {
            (one, two)
        };

        Self { timer, one, two }
    }

    /// Folds `actions` left to right into nested two-child spawns. A lone
    /// action is paired with an `ExtraAction`.
    pub fn from_actions(
        actions: impl IntoIterator<Item = BoxedAction>,
    ) -> Result<Self, ActionError> {
        let mut actions = actions.into_iter();
        let first = actions
            .next()
            .ok_or(ActionError::EmptyList { combinator: "spawn" })?;
        let Some(second) = actions.next() else {
            return Ok(Self::new(first, Box::new(ExtraAction::new())));
        };

        let mut spawn = Self::new(first, second);
        for next in actions {
            spawn = Self::new(Box::new(spawn), next);
        }
        Ok(spawn)
    }

    pub fn one(&self) -> &dyn Action {
        self.one.as_ref()
    }

    pub fn two(&self) -> &dyn Action {
        self.two.as_ref()
    }
}

fn pad(action: BoxedAction, by: f32) -> BoxedAction {
    Box::new(Sequence::new(action, Box::new(DelayTime::padding(by))))
}

impl Action for Spawn {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        self.one.start_with_target(target.clone());
        self.two.start_with_target(target);
    }

    fn update(&mut self, t: f32) {
        if !self.timer.is_bound() {
            return;
        }
        drive(self.one.as_mut(), t);
        drive(self.two.as_mut(), t);
    }

    fn stop(&mut self) {
        self.one.stop();
        self.two.stop();
        self.timer.unbind();
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        let one = self.one.reverse()?;
        let two = self.two.reverse()?;
        Some(Box::new(Spawn::new(one, two)))
    }
}
