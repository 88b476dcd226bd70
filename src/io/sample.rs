//! Sample loading from JSON, plain text, or PNG files

use crate::analysis::patterns::Sample;
use crate::io::error::{Result, WfcError, WithContext, invalid_parameter, invalid_sample};
use image::RgbaImage;
use log::debug;
use ndarray::Array2;
use std::collections::BTreeSet;
use std::path::Path;

/// A sample and, when it came from an image, the colour of each tile id
#[derive(Debug, Clone)]
pub struct LoadedSample {
    /// Tile grid
    pub sample: Sample,
    /// RGBA colour per tile id, present for image inputs
    pub palette: Option<Vec<[u8; 4]>>,
}

/// Load a sample, choosing the format from the file extension
///
/// - `.json`: an array of rows of non-negative integers
/// - `.txt`: one row per line, tiles separated by whitespace
/// - `.png`: distinct colours numbered from 0 in ascending RGBA order
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read or decoded
/// - The extension is not one of the supported formats
/// - The resulting grid is empty or ragged
pub fn load_sample<P: AsRef<Path>>(path: P) -> Result<LoadedSample> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => {
            let img = image::open(path).map_err(|e| WfcError::ImageLoad {
                path: path.to_path_buf(),
                source: e,
            })?;
            let (sample, palette) = quantize_image(&img.to_rgba8())?;
            Ok(LoadedSample {
                sample,
                palette: Some(palette),
            })
        }
        Some("json") => {
            let text = read_text(path)?;
            let rows: Vec<Vec<usize>> = serde_json::from_str(&text).with_path(path)?;
            Ok(LoadedSample {
                sample: Sample::from_rows(&rows)?,
                palette: None,
            })
        }
        Some("txt") => {
            let text = read_text(path)?;
            Ok(LoadedSample {
                sample: parse_text_sample(&text)?,
                palette: None,
            })
        }
        _ => Err(invalid_parameter(
            "sample",
            &path.display(),
            &"expected a .json, .txt or .png file",
        )),
    }
}

/// Parse whitespace-separated tile ids, one row per non-blank line
///
/// # Errors
///
/// Returns `InvalidSample` for non-numeric tokens, ragged rows, or empty input
pub fn parse_text_sample(text: &str) -> Result<Sample> {
    let rows = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(y, line)| {
            line.split_whitespace()
                .map(|token| {
                    token.parse::<usize>().map_err(|e| {
                        invalid_sample(&format!("row {y}: '{token}' is not a tile id ({e})"))
                    })
                })
                .collect::<Result<Vec<usize>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Sample::from_rows(&rows)
}

/// Map each distinct colour to a tile id
///
/// Colours are sorted so the same image always yields the same ids.
///
/// # Errors
///
/// Returns `InvalidSample` for a zero-sized image
pub fn quantize_image(img: &RgbaImage) -> Result<(Sample, Vec<[u8; 4]>)> {
    let palette: Vec<[u8; 4]> = img
        .pixels()
        .map(|p| p.0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut tiles = Array2::zeros((height, width));
    for (x, y, pixel) in img.enumerate_pixels() {
        if let (Ok(id), Some(tile)) = (
            palette.binary_search(&pixel.0),
            tiles.get_mut((y as usize, x as usize)),
        ) {
            *tile = id;
        }
    }

    debug!(
        "Quantized {width}x{height} image into {} colours",
        palette.len()
    );
    Ok((Sample::from_array(tiles)?, palette))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| WfcError::FileSystem {
        path: path.to_path_buf(),
        operation: "read sample",
        source: e,
    })
}
