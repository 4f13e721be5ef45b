use std::io::{self, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use kinetic::{ActionError, Node};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use super::bootstrap::AppWiring;
use super::perf_stats::{RollingMsStats, StepCost};
use super::report::{OutputMode, Reporter};
use super::scenarios::ScenarioKind;

#[derive(Debug, Clone)]
pub(crate) struct LoopConfig {
    pub target_fps: u32,
    pub max_frames: u32,
    pub max_frame_delta: Duration,
    pub hitch_every_frames: u32,
    pub hitch: Duration,
    pub sample_every_frames: u32,
    pub scenarios: Vec<ScenarioKind>,
    pub output: OutputMode,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_frames: 600,
            max_frame_delta: Duration::from_secs(10),
            hitch_every_frames: 0,
            hitch: Duration::ZERO,
            sample_every_frames: 30,
            scenarios: ScenarioKind::ALL.to_vec(),
            output: OutputMode::Log,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum DriverError {
    #[error("failed to build scenario {scenario}: {source}")]
    Scenario {
        scenario: &'static str,
        #[source]
        source: ActionError,
    },
    #[error("failed to encode report line: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write report: {0}")]
    Write(#[source] io::Error),
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ScenarioSummary {
    pub scenario: &'static str,
    pub frames: u32,
    pub simulated_s: f32,
    pub finished: bool,
    pub hitches: u32,
    pub step_cost: RollingMsStats,
    pub nodes: Vec<Node>,
}

/// `LoopConfig` with every zero or out-of-range value replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LoopSettings {
    fixed_dt: Duration,
    max_frames: u32,
    max_frame_delta: Duration,
    hitch_every_frames: u32,
    hitch: Duration,
    sample_every_frames: u32,
}

impl LoopSettings {
    fn from_config(config: &LoopConfig) -> Self {
        let target_fps = config.target_fps.max(1);
        Self {
            fixed_dt: Duration::from_secs_f64(1.0 / target_fps as f64),
            max_frames: config.max_frames.max(1),
            max_frame_delta: normalize_non_zero_duration(
                config.max_frame_delta,
                Duration::from_secs(10),
            ),
            hitch_every_frames: config.hitch_every_frames,
            hitch: config.hitch,
            sample_every_frames: config.sample_every_frames.max(1),
        }
    }
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let stdout = io::stdout();
    if let Err(err) = run_scenarios(&app.config, stdout.lock()) {
        error!(error = %err, "demo_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

pub(crate) fn run_scenarios<W: Write>(
    config: &LoopConfig,
    out: W,
) -> Result<Vec<ScenarioSummary>, DriverError> {
    let settings = LoopSettings::from_config(config);
    info!(
        fixed_dt_ms = settings.fixed_dt.as_secs_f64() * 1000.0,
        max_frames = settings.max_frames,
        max_frame_delta_ms = settings.max_frame_delta.as_millis() as u64,
        hitch_every_frames = settings.hitch_every_frames,
        hitch_ms = settings.hitch.as_millis() as u64,
        sample_every_frames = settings.sample_every_frames,
        scenarios = config.scenarios.len(),
        "loop_config"
    );

    let mut reporter = Reporter::new(config.output, out);
    let mut summaries = Vec::with_capacity(config.scenarios.len());
    for kind in &config.scenarios {
        summaries.push(run_scenario(*kind, &settings, &mut reporter)?);
    }
    reporter.finish()?;

    info!(scenarios = summaries.len(), "demo_complete");
    Ok(summaries)
}

fn run_scenario<W: Write>(
    kind: ScenarioKind,
    settings: &LoopSettings,
    reporter: &mut Reporter<W>,
) -> Result<ScenarioSummary, DriverError> {
    let name = kind.name();
    let mut scenario = kind.build().map_err(|source| DriverError::Scenario {
        scenario: name,
        source,
    })?;
    info!(scenario = name, "scenario_started");

    let mut step_cost = StepCost::default();
    let mut simulated = Duration::ZERO;
    let mut frames = 0;
    let mut hitches = 0;

    scenario.start();
    for frame in 0..settings.max_frames {
        let plan = plan_frame(frame, settings);
        if plan.hitched {
            hitches += 1;
        }

        let step_started = Instant::now();
        scenario.step(plan.dt.as_secs_f32());
        step_cost.record(step_started.elapsed());

        simulated += plan.dt;
        frames = frame + 1;

        if frame % settings.sample_every_frames == 0 {
            reporter.sample(
                name,
                frame,
                simulated.as_secs_f32(),
                &scenario.snapshot(),
            )?;
        }
        if scenario.is_done() {
            break;
        }
    }

    let finished = scenario.is_done();
    let nodes = scenario.snapshot();
    scenario.stop();

    let summary = ScenarioSummary {
        scenario: name,
        frames,
        simulated_s: simulated.as_secs_f32(),
        finished,
        hitches,
        step_cost: step_cost.snapshot(),
        nodes,
    };
    reporter.summary(&summary)?;
    Ok(summary)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FramePlan {
    dt: Duration,
    hitched: bool,
}

/// Delta for `frame`: the fixed interval, plus the configured hitch on
/// every `hitch_every_frames`-th frame, capped at `max_frame_delta`.
fn plan_frame(frame: u32, settings: &LoopSettings) -> FramePlan {
    let hitched = settings.hitch_every_frames > 0
        && !settings.hitch.is_zero()
        && (frame + 1) % settings.hitch_every_frames == 0;
    let raw = if hitched {
        settings.fixed_dt + settings.hitch
    } else {
        settings.fixed_dt
    };

    FramePlan {
        dt: clamp_frame_delta(raw, settings.max_frame_delta),
        hitched,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
