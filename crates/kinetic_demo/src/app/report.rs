use std::io::Write;

use kinetic::Node;
use serde::Serialize;
use tracing::{debug, info};

use super::loop_runner::{DriverError, ScenarioSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputMode {
    Log,
    Json,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ReportLine<'a> {
    Sample {
        scenario: &'a str,
        frame: u32,
        time_s: f32,
        nodes: &'a [Node],
    },
    Summary(&'a ScenarioSummary),
}

/// Writes node samples and per-scenario summaries either as tracing
/// events or as one JSON object per line.
pub(crate) struct Reporter<W: Write> {
    mode: OutputMode,
    out: W,
}

impl<W: Write> Reporter<W> {
    pub(crate) fn new(mode: OutputMode, out: W) -> Self {
        Self { mode, out }
    }

    pub(crate) fn sample(
        &mut self,
        scenario: &str,
        frame: u32,
        time_s: f32,
        nodes: &[Node],
    ) -> Result<(), DriverError> {
        match self.mode {
            OutputMode::Log => {
                for node in nodes {
                    debug!(
                        scenario,
                        frame,
                        node = node.name.as_str(),
                        x = node.position.x,
                        y = node.position.y,
                        rotation = node.rotation.z,
                        opacity = node.opacity,
                        visible = node.visible,
                        "node_sample"
                    );
                }
                Ok(())
            }
            OutputMode::Json => self.write_line(&ReportLine::Sample {
                scenario,
                frame,
                time_s,
                nodes,
            }),
        }
    }

    pub(crate) fn summary(&mut self, summary: &ScenarioSummary) -> Result<(), DriverError> {
        match self.mode {
            OutputMode::Log => {
                info!(
                    scenario = summary.scenario,
                    frames = summary.frames,
                    simulated_s = summary.simulated_s,
                    finished = summary.finished,
                    hitches = summary.hitches,
                    step_last_ms = summary.step_cost.last_ms,
                    step_avg_ms = summary.step_cost.avg_ms,
                    step_max_ms = summary.step_cost.max_ms,
                    "scenario_finished"
                );
                Ok(())
            }
            OutputMode::Json => self.write_line(&ReportLine::Summary(summary)),
        }
    }

    pub(crate) fn finish(&mut self) -> Result<(), DriverError> {
        self.out.flush().map_err(DriverError::Write)
    }

    fn write_line(&mut self, line: &ReportLine<'_>) -> Result<(), DriverError> {
        serde_json::to_writer(&mut self.out, line)?;
        self.out.write_all(b"\n").map_err(DriverError::Write)
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}
