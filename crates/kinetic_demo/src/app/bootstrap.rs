use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use super::loop_runner::LoopConfig;
use super::report::OutputMode;
use super::scenarios::ScenarioKind;
use crate::Cli;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
}

pub(crate) fn build_app(cli: Cli) -> AppWiring {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "kinetic_demo_startup");

    AppWiring {
        config: loop_config_from_cli(cli),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn loop_config_from_cli(cli: Cli) -> LoopConfig {
    let scenarios = if cli.scenario.is_empty() {
        ScenarioKind::ALL.to_vec()
    } else {
        cli.scenario
    };

    LoopConfig {
        target_fps: cli.fps,
        max_frames: cli.frames,
        max_frame_delta: Duration::from_millis(cli.max_frame_delta_ms),
        hitch_every_frames: cli.hitch_every,
        hitch: Duration::from_millis(cli.hitch_ms),
        sample_every_frames: cli.sample_every,
        scenarios,
        output: if cli.json {
            OutputMode::Json
        } else {
            OutputMode::Log
        },
    }
}
