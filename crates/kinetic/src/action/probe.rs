use std::cell::RefCell;
use std::rc::Rc;

use crate::target::SharedTarget;

use super::{Action, BoxedAction, IntervalTimer};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ProbeEvent {
    Start(&'static str),
    Update(&'static str, f32),
    Stop(&'static str),
}

/// Shared record of every call the probes attached to it receive.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProbeLog(Rc<RefCell<Vec<ProbeEvent>>>);

impl ProbeLog {
    fn push(&self, event: ProbeEvent) {
        self.0.borrow_mut().push(event);
    }

    pub(crate) fn events(&self) -> Vec<ProbeEvent> {
        self.0.borrow().clone()
    }

    pub(crate) fn updates(&self) -> Vec<f32> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ProbeEvent::Update(_, t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn updates_for(&self, label: &str) -> Vec<f32> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ProbeEvent::Update(name, t) if *name == label => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count_updates_at(&self, t: f32) -> usize {
        self.updates()
            .into_iter()
            .filter(|value| (value - t).abs() < 1e-6)
            .count()
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Probe {
    timer: IntervalTimer,
    label: &'static str,
    instant: bool,
    log: ProbeLog,
}

impl Probe {
    pub(crate) fn new(duration: f32) -> (Self, ProbeLog) {
        let log = ProbeLog::default();
        (Self::labeled("probe", duration, &log), log)
    }

    pub(crate) fn labeled(label: &'static str, duration: f32, log: &ProbeLog) -> Self {
        Self {
            timer: IntervalTimer::new(duration).expect("probe duration"),
            label,
            instant: false,
            log: log.clone(),
        }
    }

    pub(crate) fn instant(label: &'static str, log: &ProbeLog) -> Self {
        Self {
            instant: true,
            ..Self::labeled(label, 0.0, log)
        }
    }

    pub(crate) fn boxed(label: &'static str, duration: f32, log: &ProbeLog) -> BoxedAction {
        Box::new(Self::labeled(label, duration, log))
    }
}

impl Action for Probe {
    fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut IntervalTimer {
        &mut self.timer
    }

    fn update(&mut self, t: f32) {
        self.log.push(ProbeEvent::Update(self.label, t));
    }

    fn clone_action(&self) -> BoxedAction {
        let mut copy = self.clone();
        copy.timer.detach();
        Box::new(copy)
    }

    fn reverse(&self) -> Option<BoxedAction> {
        Some(self.clone_action())
    }

    fn is_instant(&self) -> bool {
        self.instant
    }

    fn start_with_target(&mut self, target: SharedTarget) {
        self.timer.start(&target);
        self.log.push(ProbeEvent::Start(self.label));
    }

    fn stop(&mut self) {
        self.log.push(ProbeEvent::Stop(self.label));
        self.timer.unbind();
    }
}
