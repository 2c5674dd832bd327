use crate::{McResult, McError};

/// Worker counts and the loaded-file cap for the job pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
	/// Workers reading files from disk.
	pub read_threads: usize,
	/// Workers decoding regions and running transforms.
	pub process_threads: usize,
	/// Workers encoding and writing modified regions.
	pub write_threads: usize,
	/// Maximum number of regions held in memory at once.
	pub max_loaded_files: usize,
}

impl PipelineConfig {
	pub fn new(read_threads: usize, process_threads: usize, write_threads: usize, max_loaded_files: usize) -> Self {
		Self {
			read_threads,
			process_threads,
			write_threads,
			max_loaded_files,
		}
	}

	/// A configuration with one worker per stage.
	pub fn single_threaded() -> Self {
		Self::new(1, 1, 1, 1)
	}

	pub fn validate(&self) -> McResult<()> {
		let checks = [
			("read_threads", self.read_threads),
			("process_threads", self.process_threads),
			("write_threads", self.write_threads),
			("max_loaded_files", self.max_loaded_files),
		];
		for (name, value) in checks {
			if value == 0 {
				return Err(McError::InvalidConfig(format!("{name} must be at least 1")));
			}
		}
		Ok(())
	}
}

impl Default for PipelineConfig {
	fn default() -> Self {
		let cpus = num_cpus::get().max(1);
		Self {
			read_threads: 1,
			process_threads: cpus,
			write_threads: cpus.min(4),
			max_loaded_files: (cpus * 3 + 1) / 2,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_valid() {
		let config = PipelineConfig::default();
		assert!(config.validate().is_ok());
		assert!(config.max_loaded_files >= config.process_threads);
	}

	#[test]
	fn zero_is_rejected() {
		let mut config = PipelineConfig::single_threaded();
		config.write_threads = 0;
		assert!(matches!(config.validate(), Err(McError::InvalidConfig(msg)) if msg.contains("write_threads")));
	}
}
