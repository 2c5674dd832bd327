use std::{
	path::PathBuf,
	process::ExitCode,
	sync::Arc,
};

use clap::{Args, Parser, Subcommand, ValueEnum};

use mcapipe::{
	ops,
	selection::load_selection,
	selection::save_selection,
	ChunkRecord,
	FileKind,
	McError,
	McResult,
	PipelineConfig,
	Progress,
	SelectionMap,
	Transform,
	World,
};

#[derive(Parser)]
#[command(name = "mcapipe", about = "Batch jobs over the region files of a Minecraft world")]
struct Cli {
	#[command(flatten)]
	pipeline: PipelineArgs,

	/// Log debug messages
	#[arg(long, global = true)]
	debug: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Args)]
struct PipelineArgs {
	/// Workers reading region files
	#[arg(long, global = true, env = "MCAPIPE_READ_THREADS")]
	read_threads: Option<usize>,

	/// Workers decoding regions and running the job
	#[arg(long, global = true, env = "MCAPIPE_PROCESS_THREADS")]
	process_threads: Option<usize>,

	/// Workers writing modified regions
	#[arg(long, global = true, env = "MCAPIPE_WRITE_THREADS")]
	write_threads: Option<usize>,

	/// Regions held in memory at once
	#[arg(long, global = true, env = "MCAPIPE_MAX_LOADED_FILES")]
	max_loaded_files: Option<usize>,
}

impl PipelineArgs {
	fn config(&self) -> PipelineConfig {
		let defaults = PipelineConfig::default();
		PipelineConfig::new(
			self.read_threads.unwrap_or(defaults.read_threads),
			self.process_threads.unwrap_or(defaults.process_threads),
			self.write_threads.unwrap_or(defaults.write_threads),
			self.max_loaded_files.unwrap_or(defaults.max_loaded_files),
		)
	}
}

#[derive(Args)]
struct Target {
	/// World directory holding region/, poi/ and entities/
	world: PathBuf,

	/// Selection file to restrict the job to. Every region on disk when omitted.
	#[arg(long, short)]
	selection: Option<PathBuf>,
}

impl Target {
	fn open(&self) -> McResult<(World, Option<SelectionMap>)> {
		let world = World::open(&self.world)?;
		let selection = self.selection.as_ref().map(load_selection).transpose()?;
		Ok((world, selection))
	}
}

#[derive(Args)]
struct FilterArgs {
	/// Only chunks stored in every listed kind (region, poi, entities)
	#[arg(long, value_delimiter = ',', value_parser = parse_kind)]
	require: Vec<FileKind>,

	/// Only chunks whose decompressed payloads add up to at least this many bytes
	#[arg(long)]
	min_bytes: Option<usize>,
}

impl FilterArgs {
	fn is_empty(&self) -> bool {
		self.require.is_empty() && self.min_bytes.is_none()
	}

	fn matches(require: &[FileKind], min_bytes: Option<usize>, record: &ChunkRecord) -> bool {
		require.iter().all(|&kind| record.has(kind))
			&& min_bytes.map_or(true, |min| record.total_len() >= min)
	}

	/// `None` when no condition was given.
	fn filter(&self) -> Option<Transform> {
		if self.is_empty() {
			return None;
		}
		let require = self.require.clone();
		let min_bytes = self.min_bytes;
		Some(Transform::filter(move |record| Ok(Self::matches(&require, min_bytes, record))))
	}
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
	/// Count chunks
	Chunks,
	/// Add up decompressed payload sizes
	Bytes,
}

#[derive(Subcommand)]
enum Command {
	/// Write the chunks matching a filter to a selection file
	Select {
		#[command(flatten)]
		target: Target,
		#[command(flatten)]
		filter: FilterArgs,
		/// Grow the result by this many chunks in every direction
		#[arg(long, default_value_t = 0)]
		radius: u32,
		/// Selection file to write
		#[arg(long, short)]
		output: PathBuf,
	},
	/// Add up a value over the selected chunks
	Sum {
		#[command(flatten)]
		target: Target,
		#[command(flatten)]
		filter: FilterArgs,
		#[arg(long, value_enum, default_value_t = ValueKind::Chunks)]
		value: ValueKind,
	},
	/// Delete the selected chunks
	Delete {
		#[command(flatten)]
		target: Target,
		#[command(flatten)]
		filter: FilterArgs,
	},
	/// Copy the selected chunks into another world
	Export {
		#[command(flatten)]
		target: Target,
		#[command(flatten)]
		filter: FilterArgs,
		/// Output world directory
		#[arg(long, short)]
		output: PathBuf,
	},
	/// Copy the chunks of another world into this one
	Import {
		/// World directory to import into
		world: PathBuf,
		/// World directory to copy chunks from
		#[arg(long, short)]
		input: PathBuf,
		/// Selection file limiting which chunks of the input are copied
		#[arg(long, short)]
		selection: Option<PathBuf>,
		/// Replace chunks the world already holds
		#[arg(long)]
		overwrite: bool,
	},
	/// Rewrite the selected chunks
	Change {
		#[command(flatten)]
		target: Target,
		/// Re-encode every payload with zlib
		#[arg(long)]
		recompress: bool,
		/// Remove the payloads of these kinds
		#[arg(long, value_delimiter = ',', value_parser = parse_kind)]
		strip: Vec<FileKind>,
	},
}

fn parse_kind(s: &str) -> Result<FileKind, String> {
	s.parse().map_err(|err: McError| err.to_string())
}

fn run(cli: Cli) -> McResult<()> {
	let config = cli.pipeline.config();
	// Rejected before anything is read or scheduled.
	config.validate()?;
	let progress = Arc::new(Progress::new());
	progress.on_done(|status| log::info!("finished: {status}"));
	match cli.command {
		Command::Select { target, filter, radius, output } => {
			let (world, selection) = target.open()?;
			let filter = filter.filter().unwrap_or_else(|| Transform::filter(|_| Ok(true)));
			let found = ops::select(&world, selection.as_ref(), filter, radius, config, progress)?;
			save_selection(&output, &found)?;
			println!("{} chunks in {} regions", found.chunk_count(), found.len());
		}
		Command::Sum { target, filter, value } => {
			let (world, selection) = target.open()?;
			let require = filter.require.clone();
			let min_bytes = filter.min_bytes;
			let transform = Transform::value(move |record| {
				if !FilterArgs::matches(&require, min_bytes, record) {
					return Ok(0);
				}
				Ok(match value {
					ValueKind::Chunks => 1,
					ValueKind::Bytes => record.total_len() as i64,
				})
			});
			let total = ops::sum(&world, selection.as_ref(), transform, config, progress)?;
			println!("{total}");
		}
		Command::Delete { target, filter } => {
			let (world, selection) = target.open()?;
			ops::delete(&world, selection.as_ref(), filter.filter(), config, progress)?;
		}
		Command::Export { target, filter, output } => {
			let (world, selection) = target.open()?;
			let output = World::at(output);
			ops::export(&world, selection.as_ref(), filter.filter(), &output, config, progress)?;
		}
		Command::Import { world, input, selection, overwrite } => {
			let input = World::open(&input)?;
			let selection = selection.as_ref().map(load_selection).transpose()?;
			ops::import(&World::at(world), &input, selection.as_ref(), overwrite, config, progress)?;
		}
		Command::Change { target, recompress, strip } => {
			if !recompress && strip.is_empty() {
				return Err(McError::InvalidConfig("change needs --recompress or --strip".into()));
			}
			let (world, selection) = target.open()?;
			let mutator = Transform::mutate(move |record| {
				for &kind in strip.iter() {
					record.remove_data(kind);
				}
				if recompress {
					for kind in FileKind::ALL {
						if let Some(data) = record.data(kind).map(<[u8]>::to_vec) {
							record.set_data(kind, data);
						}
					}
				}
				Ok(record.is_dirty())
			});
			ops::change(&world, selection.as_ref(), mutator, config, progress)?;
		}
	}
	Ok(())
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	let level = if cli.debug { "debug" } else { "info" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
	match run(cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			log::error!("{err}");
			ExitCode::FAILURE
		}
	}
}
