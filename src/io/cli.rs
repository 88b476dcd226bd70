//! Command-line interface for generating a tile grid from one sample file

use crate::algorithm::executor::WfcState;
use crate::algorithm::propagation::PropagationMode;
use crate::algorithm::runner::{FailureReason, RunLoop, RunStatus};
use crate::algorithm::selection::RandomSelector;
use crate::analysis::patterns::Sample;
use crate::io::configuration::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, DEFAULT_RETRIES,
    DEFAULT_SEED, GIF_FRAME_DELAY_MS, GenerationOptions, OUTPUT_SUFFIX,
};
use crate::io::error::{Result, WfcError};
use crate::io::image::{default_palette, export_tiles_as_png};
use crate::io::progress::RunProgress;
use crate::io::sample::load_sample;
use crate::io::snapshot::{load_state, save_history, save_state};
use crate::io::visualization::HistoryCapture;
use clap::Parser;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "wavetile")]
#[command(
    author,
    version,
    about = "Generate tile grids with overlapping wave function collapse"
)]
/// Command-line arguments for the generation tool
pub struct Cli {
    /// Sample file (.json rows, .txt rows or .png image)
    #[arg(value_name = "SAMPLE")]
    pub target: PathBuf,

    /// Output width in cells (implies square if height not specified)
    #[arg(short = 'W', long)]
    pub width: Option<usize>,

    /// Output height in cells
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Side length of the patterns learned from the sample
    #[arg(short = 'n', long, default_value_t = DEFAULT_PATTERN_SIZE)]
    pub pattern_size: usize,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum ticks before giving up
    #[arg(short, long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub iterations: usize,

    /// How far constraint narrowing spreads after each collapse
    #[arg(short, long, value_enum, default_value_t = PropagationMode::FixedPoint)]
    pub propagation: PropagationMode,

    /// Restart with the next seed this many times after a contradiction
    #[arg(short, long, default_value_t = DEFAULT_RETRIES)]
    pub retries: usize,

    /// Output PNG path (defaults to <sample>_result.png next to the sample)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Continue from a saved state instead of initializing from the sample
    #[arg(long, value_name = "STATE")]
    pub resume: Option<PathBuf>,

    /// Save the final (or last good) state as JSON
    #[arg(long, value_name = "STATE")]
    pub state_out: Option<PathBuf>,

    /// Write the run history as an animated GIF
    #[arg(short, long, value_name = "GIF")]
    pub visualize: Option<PathBuf>,

    /// Pixels per cell in the GIF
    #[arg(long, default_value_t = 8)]
    pub scale: u32,

    /// Write the run history as a JSON array of states
    #[arg(long, value_name = "JSON")]
    pub history_out: Option<PathBuf>,

    /// Log specification, e.g. "info" or "debug, wavetile::algorithm = trace"
    #[arg(short, long)]
    pub log: Option<String>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Output dimensions, square when only one side is given
    pub fn dimensions(&self) -> (usize, usize) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w),
            (None, Some(h)) => (h, h),
            (None, None) => (DEFAULT_OUTPUT_SIZE, DEFAULT_OUTPUT_SIZE),
        }
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Whether any requested output needs the per-tick history
    pub const fn needs_history(&self) -> bool {
        self.visualize.is_some() || self.history_out.is_some()
    }

    /// Where the rendered PNG goes
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| Self::default_output_path(&self.target))
    }

    fn default_output_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{OUTPUT_SUFFIX}.png", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }
}

/// Runs one generation end to end from parsed arguments
pub struct SampleProcessor {
    cli: Cli,
    cancel: Arc<AtomicBool>,
}

impl SampleProcessor {
    /// Create a processor for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the run at the next tick boundary when set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Load, generate and export according to the CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if loading, generation or any export fails
    pub fn process(&self) -> Result<()> {
        let start_time = Instant::now();
        let loaded = load_sample(&self.cli.target)?;
        let initial = self.initial_state(&loaded.sample)?;

        let tile_count = loaded.sample.tile_ids().last().map_or(1, |max| max + 1);
        let palette = loaded
            .palette
            .unwrap_or_else(|| default_palette(tile_count));

        let (status, state, history, iterations) = self.run_attempts(&initial)?;

        if let Some(state_path) = &self.cli.state_out {
            save_state(&state, state_path)?;
        }

        if let Some(history_path) = &self.cli.history_out {
            save_history(&history, history_path)?;
        }

        if let Some(gif_path) = &self.cli.visualize {
            HistoryCapture::new(palette.clone(), self.cli.scale).export_gif(
                &history,
                gif_path,
                GIF_FRAME_DELAY_MS,
            )?;
        }

        match status {
            RunStatus::Complete => {
                let output_path = self.cli.output_path();
                export_tiles_as_png(&state.render_tiles(), &palette, &output_path)?;
                info!(
                    "Wrote {} in {:.2?}",
                    output_path.display(),
                    start_time.elapsed()
                );
                Ok(())
            }
            RunStatus::Failed(reason) => Err(reason.into_error(iterations)),
            RunStatus::Running => Err(WfcError::Cancelled {
                iteration: iterations,
            }),
        }
    }

    fn initial_state(&self, sample: &Sample) -> Result<WfcState> {
        if let Some(resume_path) = &self.cli.resume {
            info!("Resuming from {}", resume_path.display());
            return load_state(resume_path);
        }
        let (width, height) = self.cli.dimensions();
        WfcState::init_with(
            sample,
            self.cli.pattern_size,
            width,
            height,
            GenerationOptions::with_mode(self.cli.propagation),
        )
    }

    fn run_attempts(
        &self,
        initial: &WfcState,
    ) -> Result<(RunStatus, WfcState, Vec<WfcState>, usize)> {
        let cell_count = initial.width() * initial.height();
        let mut attempt = 0;

        loop {
            let seed = self.cli.seed.wrapping_add(attempt as u64);
            let progress = if self.cli.should_show_progress() {
                RunProgress::new(&format!("seed {seed}"), cell_count)
            } else {
                RunProgress::hidden(cell_count)
            };

            let mut run_loop = RunLoop::new(
                initial.clone(),
                RandomSelector::new(seed),
                self.cli.iterations,
            )
            .with_cancellation(self.cancel_flag())
            .with_history(self.cli.needs_history())
            .with_observer(|event| progress.record(event));

            while run_loop.step()? == RunStatus::Running {}
            let iterations = run_loop.iterations();
            let (status, state, history) = run_loop.into_parts();

            match status {
                RunStatus::Failed(reason @ FailureReason::Contradiction { .. })
                    if attempt < self.cli.retries =>
                {
                    warn!("Attempt {attempt} failed with {reason:?}, retrying");
                    progress.finish("contradiction");
                    attempt += 1;
                    continue;
                }
                RunStatus::Complete => progress.finish("done"),
                _ => progress.finish("failed"),
            }
            return Ok((status, state, history, iterations));
        }
    }
}
