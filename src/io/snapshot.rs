//! JSON snapshots of generation state
//!
//! This is the only place a state crosses into an untyped representation.
//! Loaded states are validated before they are handed back to the core.

use crate::algorithm::executor::WfcState;
use crate::io::error::{Result, WfcError, WithContext};
use std::path::Path;

/// Encode a state as JSON
///
/// # Errors
///
/// Returns `Serialization` if encoding fails
pub fn state_to_json(state: &WfcState) -> Result<String> {
    Ok(serde_json::to_string(state)?)
}

/// Decode and validate a state
///
/// # Errors
///
/// Returns `Serialization` for malformed JSON and `InvalidParameter` when
/// the decoded state is internally inconsistent
pub fn state_from_json(json: &str) -> Result<WfcState> {
    let state: WfcState = serde_json::from_str(json)?;
    state.validate()?;
    Ok(state)
}

/// Write a state snapshot to `path`, creating parent directories
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written
pub fn save_state<P: AsRef<Path>>(state: &WfcState, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = state_to_json(state).with_path(path)?;
    write_file(path, json.as_bytes())
}

/// Read a state snapshot from `path`
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a valid state
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<WfcState> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| WfcError::FileSystem {
        path: path.to_path_buf(),
        operation: "read state",
        source: e,
    })?;
    state_from_json(&json).with_path(path)
}

/// Write every history entry as a JSON array
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written
pub fn save_history<P: AsRef<Path>>(history: &[WfcState], path: P) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string(history).with_path(path)?;
    write_file(path, json.as_bytes())
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WfcError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    std::fs::write(path, bytes).map_err(|e| WfcError::FileSystem {
        path: path.to_path_buf(),
        operation: "write file",
        source: e,
    })
}
