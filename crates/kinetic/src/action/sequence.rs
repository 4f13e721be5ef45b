use tracing::debug;

use crate::target::SharedTarget;

use super::timer::nominal;
use super::{drive, Action, ActionError, BoxedAction, ExtraAction, IntervalTimer};

/// Runs `first` to completion, then `second`.
///
/// `split` is the normalized time at which control passes to `second`.
/// `last` remembers which child received the previous update so hand-offs
/// can finish the outgoing child (`update(1)` forward, `update(0)` when
/// time runs backwards) before the incoming one starts.
#[derive(Debug, Clone)]
pub struct Sequence {
    timer: IntervalTimer,
    actions: [BoxedAction; 2],
    split: f32,
    last: Option<usize>,
}

impl Sequence {
    pub fn new(first: BoxedAction, second: BoxedAction) -> Self {
        let timer =
            IntervalTimer::with_duration(nominal(first.duration()) + nominal(second.duration()));
        let split = split_point(first.as_ref(), &timer);
        Self {
            timer,
            actions: [first, second],
            split,
            last: None,
        }
    }

    /// Folds `actions` left to right into nested two-child sequences. A
    /// lone action is paired with an `ExtraAction`.
    pub fn from_actions(
        actions: impl IntoIterator<Item = BoxedAction>,
    ) -> Result<Self, ActionError> {
        let mut actions = actions.into_iter();
        let first = actions
            .next()
            .ok_or(ActionError::EmptyList { combinator: "sequence" })?;
        let Some(second) = actions.next() else {
            return Ok(Self::new(first, Box::new(ExtraAction::new())));
        };

        let mut sequence = Self::new(first, second);
        for next in actions {
            sequence = Self::new(Box::new(sequence), next);
        }
        Ok(sequence)
    }

    pub fn first(&self) -> &dyn Action {
        self.actions[0].as_ref()
    }

    pub fn second(&self) -> &dyn Action {
        self.actions[1].as_ref()
    }

    pub fn split(&self) -> f32 {
        self.split
    }
}

fn split_point(first: &dyn Action, timer: &IntervalTimer) -> f32 {
    (nominal(first.duration()) / timer.duration()).clamp(0.0, 1.0)
}

impl Action for Sequence {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        self.split = split_point(self.actions[0].as_ref(), &self.timer);
        self.last = None;
    }

    fn update(&mut self, t: f32) {
        let Some(target) = self.timer.target() else {
            return;
        };

        let (found, child_t) = if t < self.split {
            let child_t = if self.split != 0.0 {
                t / self.split
            } else {
                1.0
            };
            (0, child_t)
        } else {
            let child_t = if self.split == 1.0 {
                1.0
            } else {
                (t - self.split) / (1.0 - self.split)
            };
            (1, child_t)
        };

        if found == 1 {
            match self.last {
                None => {
                    debug!(split = self.split, t, "sequence_replaying_skipped_child");
                    let first = &mut self.actions[0];
                    first.start_with_target(target.clone());
                    drive(first.as_mut(), 1.0);
                    first.stop();
                }
                Some(0) => {
                    let first = &mut self.actions[0];
                    drive(first.as_mut(), 1.0);
                    first.stop();
                }
                Some(_) => {}
            }
        } else if self.last == Some(1) {
            // Rewinding from the second child. A rewind that lands here before
            // any child ran is not handled.
            let second = &mut self.actions[1];
            drive(second.as_mut(), 0.0);
            second.stop();
        }

        if self.last == Some(found) && self.actions[found].is_done() {
            return;
        }

        if self.last != Some(found) {
            self.actions[found].start_with_target(target);
        }
        drive(self.actions[found].as_mut(), child_t);
        self.last = Some(found);
    }

    fn stop(&mut self) {
        if let Some(last) = self.last {
            self.actions[last].stop();
        }
        self.timer.unbind();
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        copy.last = None;
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        let second = self.actions[1].reverse()?;
        let first = self.actions[0].reverse()?;
        Some(Box::new(Sequence::new(second, first)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::probe::{Probe, ProbeEvent, ProbeLog};
    use crate::action::{Move, Repeat};
    use crate::math::{Vec2, Vec3};
    use crate::target::Node;

    fn move_by(duration: f32, x: f32, y: f32) -> BoxedAction {
        Box::new(Move::by(duration, Vec2::new(x, y)).expect("move"))
    }

    fn probe_pair(log: &ProbeLog) -> Sequence {
        Sequence::new(Probe::boxed("a", 1.0, log), Probe::boxed("b", 1.0, log))
    }

    fn assert_close(actual: Vec3, x: f32, y: f32) {
        assert!(
            (actual.x - x).abs() < 0.0001 && (actual.y - y).abs() < 0.0001,
            "expected ({x}, {y}), got {actual:?}"
        );
    }

    #[test]
    fn duration_is_sum_of_children() {
        let sequence = Sequence::new(move_by(1.5, 1.0, 0.0), move_by(0.5, 0.0, 1.0));
        assert!((sequence.duration() - 2.0).abs() < 0.0001);
        assert!((sequence.split() - 0.75).abs() < 0.0001);
    }

    #[test]
    fn runs_first_then_second() {
        let node = Node::default().into_shared();
        let mut sequence = Sequence::new(move_by(1.0, 10.0, 0.0), move_by(1.0, 0.0, 10.0));
        sequence.start_with_target(node.clone());
        sequence.step(0.0);

        sequence.step(1.0);
        assert_close(node.borrow().position, 10.0, 0.0);

        sequence.step(1.0);
        assert_close(node.borrow().position, 10.0, 10.0);
        assert!(sequence.is_done());
    }

    #[test]
    fn trajectory_matches_children_run_back_to_back() {
        let node = Node::default().into_shared();
        let mut sequence = Sequence::new(move_by(1.0, 10.0, 0.0), move_by(1.0, 0.0, 10.0));
        sequence.start_with_target(node.clone());
        sequence.step(0.0);

        for frame in 1..=20 {
            sequence.step(0.1);
            let elapsed = frame as f32 * 0.1;
            let expected_x = (elapsed.min(1.0)) * 10.0;
            let expected_y = (elapsed - 1.0).clamp(0.0, 1.0) * 10.0;
            let position = node.borrow().position;
            assert!((position.x - expected_x).abs() < 0.001, "frame {frame}: {position:?}");
            assert!((position.y - expected_y).abs() < 0.001, "frame {frame}: {position:?}");
        }
    }

    #[test]
    fn landing_on_second_child_first_replays_the_first() {
        let log = ProbeLog::default();
        let mut sequence = probe_pair(&log);
        sequence.start_with_target(Node::default().into_shared());

        sequence.update(0.75);
        assert_eq!(
            log.events(),
            vec![
                ProbeEvent::Start("a"),
                ProbeEvent::Update("a", 1.0),
                ProbeEvent::Stop("a"),
                ProbeEvent::Start("b"),
                ProbeEvent::Update("b", 0.5),
            ]
        );
    }

    #[test]
    fn hand_off_finishes_first_child_before_starting_second() {
        let log = ProbeLog::default();
        let mut sequence = probe_pair(&log);
        sequence.start_with_target(Node::default().into_shared());

        sequence.update(0.25);
        sequence.update(0.75);
        assert_eq!(
            log.events(),
            vec![
                ProbeEvent::Start("a"),
                ProbeEvent::Update("a", 0.5),
                ProbeEvent::Update("a", 1.0),
                ProbeEvent::Stop("a"),
                ProbeEvent::Start("b"),
                ProbeEvent::Update("b", 0.5),
            ]
        );
    }

    #[test]
    fn rewinding_resets_second_child_before_restarting_first() {
        let log = ProbeLog::default();
        let mut sequence = probe_pair(&log);
        sequence.start_with_target(Node::default().into_shared());

        sequence.update(0.75);
        log.clear();
        sequence.update(0.25);
        assert_eq!(
            log.events(),
            vec![
                ProbeEvent::Update("b", 0.0),
                ProbeEvent::Stop("b"),
                ProbeEvent::Start("a"),
                ProbeEvent::Update("a", 0.5),
            ]
        );
    }

    #[test]
    fn finished_child_is_not_updated_again() {
        let log = ProbeLog::default();
        let repeat = Repeat::new(Probe::boxed("b", 1.0, &log), 1);
        let mut sequence = Sequence::new(Probe::boxed("a", 1.0, &log), Box::new(repeat));
        sequence.start_with_target(Node::default().into_shared());

        sequence.update(0.25);
        sequence.update(1.0);
        let updates_for_b = log.updates_for("b").len();
        assert!(updates_for_b > 0);

        sequence.update(1.0);
        assert_eq!(log.updates_for("b").len(), updates_for_b);
    }

    #[test]
    fn children_report_done_once_carried_to_the_end() {
        let log = ProbeLog::default();
        let mut sequence = probe_pair(&log);
        sequence.start_with_target(Node::default().into_shared());

        sequence.update(0.25);
        assert!(!sequence.first().is_done());
        sequence.update(0.75);
        assert!(sequence.first().is_done());
        assert!(!sequence.second().is_done());

        sequence.update(1.0);
        assert!(sequence.second().is_done());
        let updates_for_b = log.updates_for("b").len();

        sequence.update(1.0);
        assert_eq!(log.updates_for("b").len(), updates_for_b);
    }

    #[test]
    fn stop_only_reaches_the_active_child() {
        let log = ProbeLog::default();
        let mut sequence = probe_pair(&log);
        sequence.start_with_target(Node::default().into_shared());
        sequence.update(0.25);
        sequence.stop();

        let events = log.events();
        assert_eq!(events.last(), Some(&ProbeEvent::Stop("a")));
        assert!(!events.contains(&ProbeEvent::Stop("b")));
        assert!(sequence.target().is_none());
    }

    #[test]
    fn update_without_target_is_a_no_op() {
        let log = ProbeLog::default();
        let mut sequence = probe_pair(&log);
        sequence.update(0.5);
        assert!(log.events().is_empty());
    }

    #[test]
    fn from_actions_pads_single_action() {
        let sequence = Sequence::from_actions([move_by(2.0, 1.0, 0.0)]).expect("sequence");
        assert!((sequence.duration() - 2.0).abs() < 0.0001);
        assert!((sequence.split() - 1.0).abs() < 0.0001);

        let node = Node::default().into_shared();
        let mut sequence = sequence;
        sequence.start_with_target(node.clone());
        sequence.step(0.0);
        sequence.step(2.0);
        assert_close(node.borrow().position, 1.0, 0.0);
    }

    #[test]
    fn from_actions_rejects_empty_list() {
        let result = Sequence::from_actions(Vec::new());
        assert!(matches!(
            result,
            Err(ActionError::EmptyList {
                combinator: "sequence"
            })
        ));
    }

    #[test]
    fn from_actions_folds_many_actions() {
        let node = Node::default().into_shared();
        let mut sequence = Sequence::from_actions([
            move_by(1.0, 1.0, 0.0),
            move_by(1.0, 0.0, 1.0),
            move_by(1.0, -1.0, 0.0),
        ])
        .expect("sequence");
        assert!((sequence.duration() - 3.0).abs() < 0.0001);

        sequence.start_with_target(node.clone());
        sequence.step(0.0);
        for _ in 0..3 {
            sequence.step(1.0);
        }
        assert_close(node.borrow().position, 0.0, 1.0);
        assert!(sequence.is_done());
    }

    #[test]
    fn reverse_runs_reversed_children_backwards() {
        let node = Node::default().into_shared();
        let forward = Sequence::new(move_by(1.0, 10.0, 0.0), move_by(1.0, 0.0, 10.0));
        let mut backward = forward.reverse().expect("reverse");

        backward.start_with_target(node.clone());
        backward.step(0.0);
        backward.step(1.0);
        assert_close(node.borrow().position, 0.0, -10.0);
        backward.step(1.0);
        assert_close(node.borrow().position, -10.0, -10.0);
    }

    #[test]
    fn restart_reproduces_trajectory() {
        let node = Node::default().into_shared();
        let mut sequence = Sequence::new(move_by(1.0, 4.0, 0.0), move_by(1.0, 0.0, 4.0));
        let run = |sequence: &mut Sequence| {
            node.borrow_mut().position = Vec3::ZERO;
            sequence.start_with_target(node.clone());
            let mut samples = Vec::new();
            for dt in [0.0, 0.3, 0.3, 0.7, 0.7] {
                sequence.step(dt);
                samples.push(node.borrow().position);
            }
            sequence.stop();
            samples
        };

        let first = run(&mut sequence);
        let second = run(&mut sequence);
        assert_eq!(first, second);
    }
}
