use std::sync::Arc;

use crate::{
	McResult, McError,
	config::PipelineConfig,
	job::{RegionTask, RegionWork},
	progress::Progress,
	selection::SelectionMap,
	world::{FileKind, World},
};

use super::{
	execute,
	export::{merge_chunks, ExportState},
};

struct ImportTask {
	target: World,
	overwrite: bool,
	progress: Arc<Progress>,
}

impl RegionTask for ImportTask {
	type State = ExportState;

	fn process(&self, work: &mut RegionWork<ExportState>) -> McResult<bool> {
		let mut present = Vec::new();
		for offset in work.selection.iter() {
			if self.progress.task_cancelled() {
				break;
			}
			if work.aggregator.has_chunk(offset) {
				present.push(offset);
			}
			self.progress.increment("chunk", 1);
		}
		if present.is_empty() {
			return Ok(false);
		}
		work.state.outputs = merge_chunks(&work.aggregator, &self.target, work.pos, &present, self.overwrite)?;
		Ok(!work.state.outputs.is_empty())
	}

	fn write(&self, work: &mut RegionWork<ExportState>) -> McResult<()> {
		for (kind, output) in work.state.outputs.iter() {
			output.save(self.target.region_path(kind, work.pos))?;
		}
		Ok(())
	}
}

/// Copies the chunks of `input`, limited to `selection` when given, into
/// `world`. Chunks `world` already holds are kept unless `overwrite` is set.
/// Payloads are copied without recompression.
pub fn import(
	world: &World,
	input: &World,
	selection: Option<&SelectionMap>,
	overwrite: bool,
	config: PipelineConfig,
	progress: Arc<Progress>,
) -> McResult<()> {
	if FileKind::ALL.iter().any(|&kind| world.dir(kind) == input.dir(kind)) {
		let err = McError::InvalidConfig("import input must differ from the target world".into());
		progress.fail(err.to_string());
		return Err(err);
	}
	let task = Arc::new(ImportTask {
		target: world.clone(),
		overwrite,
		progress: progress.clone(),
	});
	execute(input, selection, task, config, &progress, |_| None)
}
