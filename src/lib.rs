pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod rng;
pub mod run;
pub mod schedule;
pub mod thresholds;
pub mod topology;

pub use config::{EngineMode, GeneratorKind, RunConfig};
pub use engine::{Annealer, PackedEngine, ScalarEngine};
pub use error::Error;
pub use run::{run, RunResult};
pub use schedule::{build_schedule, ScheduleKind};
pub use thresholds::ThresholdTable;
pub use topology::Topology;
