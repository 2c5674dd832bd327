pub mod error;
pub mod ioext;
pub mod math;
pub mod world;
pub mod selection;
pub mod transform;
pub mod progress;
pub mod accumulator;
pub mod config;
pub mod job;
pub mod ops;

pub use flate2;

pub use error::McError;
pub use error::McResult;
pub use config::PipelineConfig;
pub use progress::{Progress, ProgressStatus};
pub use transform::{Transform, Outcome};
pub use selection::{SelectionMap, RegionSelection, ChunkSet};
pub use math::coord::{ChunkPos, RegionPos};
pub use world::{World, FileKind, ChunkRecord};
