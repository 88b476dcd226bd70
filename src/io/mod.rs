/// Command-line arguments and the end-to-end processor
pub mod cli;
/// Defaults and tunable constants
pub mod configuration;
/// Error type and context helpers
pub mod error;
/// PNG rendering
pub mod image;
/// Terminal progress bars
pub mod progress;
/// Sample file loading
pub mod sample;
/// JSON state snapshots
pub mod snapshot;
/// GIF rendering of run history
pub mod visualization;
