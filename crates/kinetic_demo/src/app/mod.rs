pub(crate) mod bootstrap;
pub(crate) mod loop_runner;
mod perf_stats;
mod report;
mod scenarios;

pub(crate) use scenarios::ScenarioKind;
