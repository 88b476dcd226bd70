//! Generation constants and runtime configuration defaults

use crate::algorithm::propagation::PropagationMode;
use serde::{Deserialize, Serialize};

/// Side length of extracted patterns
pub const DEFAULT_PATTERN_SIZE: usize = 3;

/// Output width and height used when the CLI is given neither
pub const DEFAULT_OUTPUT_SIZE: usize = 16;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default maximum iterations before stopping
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Whole-run restarts attempted after a contradiction
pub const DEFAULT_RETRIES: usize = 0;

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 5;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;

/// Options fixed at initialization and carried with the state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// How far constraint narrowing spreads after each collapse
    pub mode: PropagationMode,
}

impl GenerationOptions {
    /// Options with the given propagation mode
    pub const fn with_mode(mode: PropagationMode) -> Self {
        Self { mode }
    }
}
