use std::time::Duration;

use serde::Serialize;

pub(crate) const STEP_WINDOW_LEN: usize = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub(crate) struct RollingMsStats {
    pub last_ms: f32,
    pub avg_ms: f32,
    pub max_ms: f32,
}

/// Wall-clock cost of `step` calls over the most recent frames.
#[derive(Debug)]
pub(crate) struct StepCost {
    samples_ms: [f32; STEP_WINDOW_LEN],
    head: usize,
    count: usize,
    sum_ms: f32,
    last_ms: f32,
}

impl Default for StepCost {
    fn default() -> Self {
        Self {
            samples_ms: [0.0; STEP_WINDOW_LEN],
            head: 0,
            count: 0,
            sum_ms: 0.0,
            last_ms: 0.0,
        }
    }
}

impl StepCost {
    pub(crate) fn record(&mut self, step_duration: Duration) {
        self.push_ms(duration_to_ms(step_duration));
    }

    fn push_ms(&mut self, value_ms: f32) {
        self.last_ms = value_ms;

        let evicted = if self.count < STEP_WINDOW_LEN {
            self.count += 1;
            0.0
        } else {
            self.samples_ms[self.head]
        };
        self.samples_ms[self.head] = value_ms;
        self.head = (self.head + 1) % STEP_WINDOW_LEN;
        self.sum_ms += value_ms - evicted;
    }

    pub(crate) fn snapshot(&self) -> RollingMsStats {
        if self.count == 0 {
            return RollingMsStats::default();
        }

        let max_ms = self.samples_ms[..self.count]
            .iter()
            .copied()
            .fold(f32::MIN, f32::max);

        RollingMsStats {
            last_ms: self.last_ms,
            avg_ms: self.sum_ms / self.count as f32,
            max_ms,
        }
    }
}

fn duration_to_ms(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}
