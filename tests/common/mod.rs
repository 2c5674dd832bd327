#![allow(dead_code)]

use std::path::Path;

use rand::{rngs::StdRng, seq::index::sample, Rng, SeedableRng};

use mcapipe::{
	world::io::region::{ChunkOffset, RegionFile},
	FileKind,
	PipelineConfig,
	RegionPos,
	World,
};

/// Builds a world where every region holds `chunks` region payloads at
/// random offsets. Every third of those chunks also has an entities payload.
pub fn build_world(root: &Path, regions: &[RegionPos], chunks: usize, seed: u64) -> World {
	let world = World::at(root);
	world.create_dirs().unwrap();
	let mut rng = StdRng::seed_from_u64(seed);
	for &pos in regions {
		let mut region = RegionFile::new();
		let mut entities = RegionFile::new();
		let mut offsets: Vec<usize> = sample(&mut rng, ChunkOffset::COUNT, chunks).into_vec();
		offsets.sort_unstable();
		for (i, index) in offsets.into_iter().enumerate() {
			let offset = ChunkOffset::from_index(index);
			region.set_chunk(offset, &payload(&mut rng)).unwrap();
			if i % 3 == 0 {
				entities.set_chunk(offset, &payload(&mut rng)).unwrap();
			}
		}
		region.save(world.region_path(FileKind::Region, pos)).unwrap();
		entities.save(world.region_path(FileKind::Entities, pos)).unwrap();
	}
	world
}

pub fn payload(rng: &mut StdRng) -> Vec<u8> {
	let len: usize = rng.gen_range(16..3000);
	(0..len).map(|_| rng.gen()).collect()
}

pub fn regions(count: i32) -> Vec<RegionPos> {
	(0..count).map(|i| RegionPos::new(i % 3 - 1, i / 3 - 1)).collect()
}

pub fn config(workers: usize) -> PipelineConfig {
	PipelineConfig::new(2, workers, 2, workers + 1)
}
