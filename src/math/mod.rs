pub mod bit;
pub mod coord;

pub use coord::{ChunkPos, RegionPos};
