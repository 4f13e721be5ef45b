mod app;

use std::process::ExitCode;

use clap::Parser;

use app::ScenarioKind;

#[derive(Debug, Parser)]
#[command(
    name = "kinetic_demo",
    about = "Headless fixed-rate driver for kinetic action trees",
    version
)]
pub(crate) struct Cli {
    /// Simulated frames per second
    #[arg(long, env = "KINETIC_FPS", default_value_t = 60)]
    fps: u32,

    /// Frame budget per scenario
    #[arg(long, env = "KINETIC_FRAMES", default_value_t = 600)]
    frames: u32,

    /// Upper bound on a single frame delta, in milliseconds
    #[arg(long, env = "KINETIC_MAX_FRAME_DELTA_MS", default_value_t = 10_000)]
    max_frame_delta_ms: u64,

    /// Inject a hitch every N frames (0 disables)
    #[arg(long, env = "KINETIC_HITCH_EVERY", default_value_t = 0)]
    hitch_every: u32,

    /// Extra milliseconds added to a hitched frame
    #[arg(long, env = "KINETIC_HITCH_MS", default_value_t = 0)]
    hitch_ms: u64,

    /// Emit a node sample every N frames
    #[arg(long, env = "KINETIC_SAMPLE_EVERY", default_value_t = 30)]
    sample_every: u32,

    /// Scenarios to run, comma separated (default: all)
    #[arg(long, env = "KINETIC_SCENARIOS", value_enum, value_delimiter = ',')]
    scenario: Vec<ScenarioKind>,

    /// Write samples and summaries to stdout as JSON lines
    #[arg(long, short = 'j', env = "KINETIC_JSON")]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let app = app::bootstrap::build_app(cli);
    app::loop_runner::run(app)
}
