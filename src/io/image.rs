//! PNG export of rendered tile grids

use crate::io::error::{Result, WfcError};
use image::{ImageBuffer, Rgba, RgbaImage};
use ndarray::Array2;
use std::path::Path;

/// Colour used for cells that are not collapsed yet
pub const UNSET_COLOR: [u8; 4] = [0, 0, 0, 0];

/// Evenly spaced opaque hues for samples that carry no colours
///
/// Tile 0 is black so binary samples read as black on coloured ground.
pub fn default_palette(tile_count: usize) -> Vec<[u8; 4]> {
    (0..tile_count)
        .map(|i| {
            if i == 0 {
                return [0, 0, 0, 255];
            }
            let hue = (i - 1) as f64 / tile_count.saturating_sub(1).max(1) as f64;
            let [r, g, b] = hue_to_rgb(hue);
            [r, g, b, 255]
        })
        .collect()
}

fn hue_to_rgb(hue: f64) -> [u8; 3] {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

/// Paint a `[y, x]` tile grid, one pixel per cell
///
/// # Errors
///
/// Returns `InvalidParameter` if a tile id has no palette entry
pub fn render_tiles(tiles: &Array2<Option<usize>>, palette: &[[u8; 4]]) -> Result<RgbaImage> {
    let (height, width) = tiles.dim();
    let mut img = ImageBuffer::new(width as u32, height as u32);

    for ((y, x), tile) in tiles.indexed_iter() {
        let color = match tile {
            Some(id) => palette.get(*id).copied().ok_or_else(|| {
                crate::io::error::invalid_parameter(
                    "palette",
                    &palette.len(),
                    &format!("tile {id} has no colour"),
                )
            })?,
            None => UNSET_COLOR,
        };
        img.put_pixel(x as u32, y as u32, Rgba(color));
    }

    Ok(img)
}

/// Export a tile grid as a PNG with transparent unset cells
///
/// # Errors
///
/// Returns an error if:
/// - A tile value is out of bounds for the palette
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_tiles_as_png<P: AsRef<Path>>(
    tiles: &Array2<Option<usize>>,
    palette: &[[u8; 4]],
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let img = render_tiles(tiles, palette)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WfcError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    img.save(output_path).map_err(|e| WfcError::ImageExport {
        path: output_path.to_path_buf(),
        source: e,
    })
}
