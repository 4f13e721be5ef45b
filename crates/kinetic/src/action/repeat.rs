use tracing::debug;

use crate::target::SharedTarget;

use super::timer::nominal;
use super::{drive, Action, BoxedAction, IntervalTimer};

/// Runs `inner` a fixed number of times back to back.
///
/// Instant inner actions apply themselves on every `start_with_target`, so
/// the initial start already counts as one repetition and the internal
/// counter is one lower than what the caller asked for.
/// A count of zero is done from the start and never starts `inner`.
#[derive(Debug, Clone)]
pub struct Repeat {
    timer: IntervalTimer,
    inner: BoxedAction,
    requested: u32,
    times: u32,
    total: u32,
    next_dt: f32,
    inner_instant: bool,
}

impl Repeat {
    pub fn new(inner: BoxedAction, times: u32) -> Self {
        let inner_instant = inner.is_instant();
        let timer = IntervalTimer::with_duration(nominal(inner.duration()) * times as f32);
        let internal_times = if inner_instant {
            times.saturating_sub(1)
        } else {
            times
        };

        let mut repeat = Self {
            timer,
            inner,
            requested: times,
            times: internal_times,
            total: 0,
            next_dt: 0.0,
            inner_instant,
        };
        repeat.next_dt = repeat.cycle_fraction();
        repeat
    }

    pub fn inner(&self) -> &dyn Action {
        self.inner.as_ref()
    }

    pub fn times(&self) -> u32 {
        self.requested
    }

    /// Completed iterations so far.
    pub fn completed(&self) -> u32 {
        self.total
    }

    fn cycle_fraction(&self) -> f32 {
        nominal(self.inner.duration()) / self.timer.duration()
    }
}

/// Maps the time spent inside the current cycle onto the inner action's
/// own `[0, 1]` range.
fn cycle_progress(residual: f32, fraction: f32) -> f32 {
    if fraction <= 0.0 {
        return 1.0;
    }
    (residual / fraction).clamp(0.0, 1.0)
}

impl Action for Repeat {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.total = 0;
        self.next_dt = self.cycle_fraction();
        self.timer.start(&target);
        if self.requested > 0 {
            self.inner.start_with_target(target);
        }
    }

    fn update(&mut self, dt: f32) {
        if self.requested == 0 {
            return;
        }
        let Some(target) = self.timer.target() else {
            return;
        };
        let fraction = self.cycle_fraction();

        if dt >= self.next_dt {
            while dt > self.next_dt && self.total < self.times {
                drive(self.inner.as_mut(), 1.0);
                self.total += 1;

                self.inner.stop();
                self.inner.start_with_target(target.clone());
                self.next_dt = fraction * (self.total + 1) as f32;
                debug!(
                    completed = self.total,
                    times = self.times,
                    "repeat_cycle_restarted"
                );
            }

            // Close out the last cycle when time lands exactly on the end.
            if dt >= 1.0 && self.total < self.times {
                self.total += 1;
            }

            if !self.inner_instant {
                if self.total == self.times {
                    drive(self.inner.as_mut(), 1.0);
                    self.inner.stop();
                } else {
                    let residual = dt - (self.next_dt - fraction);
                    drive(self.inner.as_mut(), cycle_progress(residual, fraction));
                }
            }
        } else {
            drive(self.inner.as_mut(), (dt * self.times as f32) % 1.0);
        }
    }

    fn is_done(&self) -> bool {
        self.total == self.times
    }

    fn stop(&mut self) {
        if self.requested > 0 {
            self.inner.stop();
        }
        self.timer.unbind();
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        copy.total = 0;
        copy.next_dt = copy.cycle_fraction();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        Some(Box::new(Repeat::new(self.inner.reverse()?, self.requested)))
    }
}

/// Restarts `inner` every time it finishes, carrying any overshoot into
/// the next cycle. Never done; stop it explicitly.
///
/// Drive it with `step`. It has no normalized time of its own, so `update`
/// does nothing and it is meant to sit at the root of a tree rather than
/// inside a `Sequence` or `Repeat`.
#[derive(Debug, Clone)]
pub struct RepeatForever {
    timer: IntervalTimer,
    inner: BoxedAction,
}

impl RepeatForever {
    pub fn new(inner: BoxedAction) -> Self {
        Self {
            timer: IntervalTimer::with_duration(0.0),
            inner,
        }
    }

    pub fn inner(&self) -> &dyn Action {
        self.inner.as_ref()
    }
}

impl Action for RepeatForever {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        self.inner.start_with_target(target);
    }

    fn step(&mut self, dt: f32) {
        self.inner.step(dt);

        let cycle = self.inner.duration();
        if !self.inner.is_done() || nominal(cycle) <= 0.0 {
            return;
        }
        let Some(target) = self.timer.target() else {
            return;
        };

        let mut overshoot = self.inner.elapsed() - cycle;
        if overshoot > cycle {
            let skipped_cycles = (overshoot / cycle).floor();
            overshoot %= cycle;
            debug!(skipped_cycles, overshoot, "repeat_forever_overshoot_wrapped");
        }
        if !overshoot.is_finite() {
            overshoot = 0.0;
        }

        self.inner.start_with_target(target);
        self.inner.step(0.0);
        self.inner.step(overshoot);
    }

    fn update(&mut self, _t: f32) {}

    fn is_done(&self) -> bool {
        false
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.timer.unbind();
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        Some(Box::new(RepeatForever::new(self.inner.reverse()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::probe::{Probe, ProbeEvent, ProbeLog};
    use crate::action::{DelayTime, Move, Sequence};
    use crate::math::{Vec2, Vec3};
    use crate::target::Node;

    fn move_by(duration: f32, x: f32, y: f32) -> BoxedAction {
        Box::new(Move::by(duration, Vec2::new(x, y)).expect("move"))
    }

    fn move_to(duration: f32, x: f32, y: f32) -> BoxedAction {
        Box::new(Move::to(duration, Vec2::new(x, y)).expect("move"))
    }

    fn assert_at(position: Vec3, x: f32, y: f32) {
        assert!(
            (position.x - x).abs() < 0.001 && (position.y - y).abs() < 0.001,
            "expected ({x}, {y}), got {position:?}"
        );
    }

    fn count(log: &ProbeLog, event: ProbeEvent) -> usize {
        log.events().into_iter().filter(|seen| *seen == event).count()
    }

    #[test]
    fn duration_is_inner_times_count() {
        let repeat = Repeat::new(move_by(0.5, 1.0, 0.0), 4);
        assert!((repeat.duration() - 2.0).abs() < 0.0001);
        assert_eq!(repeat.times(), 4);
    }

    #[test]
    fn repeats_move_three_times() {
        let node = Node::default().into_shared();
        let mut repeat = Repeat::new(move_by(1.0, 1.0, 0.0), 3);
        repeat.start_with_target(node.clone());
        repeat.step(0.0);

        repeat.step(1.0);
        assert_at(node.borrow().position, 1.0, 0.0);
        assert!(!repeat.is_done());

        repeat.step(1.0);
        assert_at(node.borrow().position, 2.0, 0.0);
        assert!(!repeat.is_done());

        repeat.step(1.0);
        assert_at(node.borrow().position, 3.0, 0.0);
        assert!(repeat.is_done());
        assert_eq!(repeat.completed(), 3);
    }

    #[test]
    fn each_iteration_is_started_and_stopped() {
        let log = ProbeLog::default();
        let mut repeat = Repeat::new(Probe::boxed("inner", 1.0, &log), 3);
        repeat.start_with_target(Node::default().into_shared());

        repeat.step(0.0);
        for _ in 0..5 {
            repeat.step(0.5);
            assert!(!repeat.is_done());
        }
        repeat.step(0.5);
        assert!(repeat.is_done());

        assert_eq!(count(&log, ProbeEvent::Start("inner")), 3);
        assert_eq!(count(&log, ProbeEvent::Stop("inner")), 3);
        assert_eq!(log.updates_for("inner").last(), Some(&1.0));
    }

    #[test]
    fn residual_is_scaled_into_the_current_cycle() {
        let node = Node::default().into_shared();
        let mut repeat = Repeat::new(move_by(1.0, 1.0, 0.0), 2);
        repeat.start_with_target(node.clone());
        repeat.step(0.0);

        repeat.step(1.5);
        assert_at(node.borrow().position, 1.5, 0.0);
        assert_eq!(repeat.completed(), 1);
    }

    #[test]
    fn before_first_boundary_inner_sees_fractional_time() {
        let log = ProbeLog::default();
        let mut repeat = Repeat::new(Probe::boxed("inner", 1.0, &log), 4);
        repeat.start_with_target(Node::default().into_shared());

        repeat.update(0.125);
        let updates = log.updates_for("inner");
        assert_eq!(updates.len(), 1);
        assert!((updates[0] - 0.5).abs() < 0.0001);
    }

    #[test]
    fn instant_inner_counts_initial_start_as_first_repetition() {
        let log = ProbeLog::default();
        let mut repeat = Repeat::new(Box::new(Probe::instant("tick", &log)), 3);
        repeat.start_with_target(Node::default().into_shared());
        assert_eq!(count(&log, ProbeEvent::Start("tick")), 1);

        repeat.step(0.0);
        repeat.step(0.0);
        assert!(repeat.is_done());
        assert_eq!(count(&log, ProbeEvent::Start("tick")), 3);
    }

    #[test]
    fn zero_repetitions_are_done_immediately() {
        let repeat = Repeat::new(move_by(1.0, 1.0, 0.0), 0);
        assert!(repeat.is_done());
    }

    #[test]
    fn zero_repetitions_never_touch_the_inner_action() {
        let log = ProbeLog::default();
        let mut repeat = Repeat::new(Box::new(Probe::instant("tick", &log)), 0);
        repeat.start_with_target(Node::default().into_shared());
        assert!(repeat.is_done());

        repeat.step(0.0);
        repeat.step(1.0);
        repeat.stop();
        assert!(log.events().is_empty());

        let node = Node::default().into_shared();
        let mut repeat = Repeat::new(move_by(1.0, 5.0, 0.0), 0);
        repeat.start_with_target(node.clone());
        repeat.step(0.0);
        repeat.step(1.0);
        assert_at(node.borrow().position, 0.0, 0.0);
    }

    #[test]
    fn restart_resets_completed_cycles() {
        let node = Node::default().into_shared();
        let mut repeat = Repeat::new(move_by(1.0, 1.0, 0.0), 2);
        repeat.start_with_target(node.clone());
        repeat.step(0.0);
        repeat.step(2.0);
        assert!(repeat.is_done());

        repeat.stop();
        repeat.start_with_target(node.clone());
        assert_eq!(repeat.completed(), 0);
        assert!(!repeat.is_done());
        repeat.step(0.0);
        repeat.step(2.0);
        assert_at(node.borrow().position, 4.0, 0.0);
    }

    #[test]
    fn reverse_repeats_reversed_inner() {
        let node = Node::default().into_shared();
        let repeat = Repeat::new(move_by(1.0, 1.0, 0.0), 2);
        let mut reversed = repeat.reverse().expect("reverse");

        reversed.start_with_target(node.clone());
        reversed.step(0.0);
        reversed.step(1.0);
        reversed.step(1.0);
        assert_at(node.borrow().position, -2.0, 0.0);
        assert!(reversed.is_done());
    }

    #[test]
    fn forever_is_never_done() {
        let node = Node::default().into_shared();
        let mut forever = RepeatForever::new(move_by(1.0, 1.0, 0.0));
        forever.start_with_target(node.clone());
        forever.step(0.0);

        for _ in 0..3 {
            forever.step(1.0);
            assert!(!forever.is_done());
        }
        assert_at(node.borrow().position, 3.0, 0.0);
    }

    #[test]
    fn forever_carries_overshoot_into_next_cycle() {
        let node = Node::default().into_shared();
        let mut forever = RepeatForever::new(move_by(1.0, 10.0, 0.0));
        forever.start_with_target(node.clone());
        forever.step(0.0);

        forever.step(1.25);
        assert_at(node.borrow().position, 12.5, 0.0);
        assert!((forever.inner().elapsed() - 0.25).abs() < 0.0001);
    }

    #[test]
    fn forever_huge_delta_matches_many_small_ones() {
        let round_trip = || {
            Box::new(Sequence::new(move_to(0.5, 10.0, 0.0), move_to(0.5, 0.0, 0.0)))
                as BoxedAction
        };

        let jumped = Node::default().into_shared();
        let mut forever = RepeatForever::new(round_trip());
        forever.start_with_target(jumped.clone());
        forever.step(0.0);
        forever.step(10.5);

        let stepped = Node::default().into_shared();
        let mut forever = RepeatForever::new(round_trip());
        forever.start_with_target(stepped.clone());
        forever.step(0.0);
        for _ in 0..10 {
            forever.step(1.0);
        }
        forever.step(0.5);

        let expected = stepped.borrow().position;
        assert_at(jumped.borrow().position, expected.x, expected.y);
        assert_at(expected, 10.0, 0.0);
    }

    #[test]
    fn forever_with_zero_duration_inner_does_not_spin() {
        let node = Node::default().into_shared();
        let mut forever = RepeatForever::new(Box::new(DelayTime::new(0.0).expect("delay")));
        forever.start_with_target(node);
        for _ in 0..4 {
            forever.step(1.0);
        }
        assert!(!forever.is_done());
        assert!(forever.inner().is_done());
    }

    #[test]
    fn forever_stop_reaches_inner() {
        let log = ProbeLog::default();
        let mut forever = RepeatForever::new(Probe::boxed("inner", 1.0, &log));
        forever.start_with_target(Node::default().into_shared());
        forever.step(0.0);
        forever.step(0.5);
        forever.stop();

        assert_eq!(log.events().last(), Some(&ProbeEvent::Stop("inner")));
        assert!(forever.target().is_none());
    }

    #[test]
    fn forever_restarts_inner_after_each_cycle() {
        let log = ProbeLog::default();
        let mut forever = RepeatForever::new(Probe::boxed("inner", 1.0, &log));
        forever.start_with_target(Node::default().into_shared());
        forever.step(0.0);
        for _ in 0..4 {
            forever.step(1.0);
        }
        assert_eq!(count(&log, ProbeEvent::Start("inner")), 5);
    }
}
