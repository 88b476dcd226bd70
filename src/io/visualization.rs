//! GIF rendering of run history

use crate::algorithm::executor::WfcState;
use crate::io::configuration::VIEWER_MIN_FRAME_DELAY_MS;
use crate::io::error::{Result, WfcError, invalid_parameter};
use image::{Delay, Frame, Rgba, RgbaImage};
use std::path::Path;

/// Turns a sequence of states into animation frames
///
/// Cells that are not collapsed yet are painted with the average of all
/// palette colours.
pub struct HistoryCapture {
    palette: Vec<[u8; 4]>,
    empty_color: [u8; 4],
    scale: u32,
}

impl HistoryCapture {
    /// The average of all tile colours is used as the empty colour
    pub fn new(palette: Vec<[u8; 4]>, scale: u32) -> Self {
        let empty_color = if palette.is_empty() {
            [128, 128, 128, 255]
        } else {
            let mut sums = [0u32; 4];
            for color in &palette {
                for (sum, &channel) in sums.iter_mut().zip(color) {
                    *sum += u32::from(channel);
                }
            }
            let count = palette.len() as u32;
            sums.map(|s| (s / count) as u8)
        };

        Self {
            palette,
            empty_color,
            scale: scale.max(1),
        }
    }

    /// Colour painted for uncollapsed cells
    pub const fn empty_color(&self) -> [u8; 4] {
        self.empty_color
    }

    /// Draw one state, `scale` pixels per cell
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a rendered tile has no palette entry
    pub fn render_state(&self, state: &WfcState) -> Result<RgbaImage> {
        let tiles = state.render_tiles();
        let (height, width) = tiles.dim();
        let mut img = RgbaImage::new(width as u32 * self.scale, height as u32 * self.scale);

        for ((y, x), tile) in tiles.indexed_iter() {
            let color = match tile {
                Some(id) => self.palette.get(*id).copied().ok_or_else(|| {
                    invalid_parameter(
                        "palette",
                        &self.palette.len(),
                        &format!("tile {id} has no colour"),
                    )
                })?,
                None => self.empty_color,
            };
            for dy in 0..self.scale {
                for dx in 0..self.scale {
                    img.put_pixel(
                        x as u32 * self.scale + dx,
                        y as u32 * self.scale + dy,
                        Rgba(color),
                    );
                }
            }
        }

        Ok(img)
    }

    /// Export states as a GIF with automatic frame skipping
    ///
    /// If `frame_delay_ms` is below what viewers display reliably, frames
    /// are dropped so the animation keeps its apparent speed. The last frame
    /// is always kept and held longer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `history` is empty
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif<P: AsRef<Path>>(
        &self,
        history: &[WfcState],
        output_path: P,
        frame_delay_ms: u32,
    ) -> Result<()> {
        let output_path = output_path.as_ref();
        if history.is_empty() {
            return Err(invalid_parameter(
                "history",
                &0,
                &"no states captured for visualization",
            ));
        }

        let frames = self.generate_frames(history, frame_delay_ms)?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| WfcError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| WfcError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| WfcError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })
    }

    /// Frames that [`HistoryCapture::export_gif`] would encode
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a rendered tile has no palette entry
    pub fn generate_frames(&self, history: &[WfcState], frame_delay_ms: u32) -> Result<Vec<Frame>> {
        let frame_delay_ms = frame_delay_ms.max(1);
        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms) as usize
        } else {
            1
        };

        let mut frames = Vec::new();
        let Some(last) = history.len().checked_sub(1) else {
            return Ok(frames);
        };
        for (index, state) in history.iter().enumerate() {
            if index % skip_factor == 0 || index == last {
                let delay = if index == last {
                    // Final frame displays longer for better visibility
                    effective_delay_ms * 25
                } else {
                    effective_delay_ms
                };
                frames.push(Frame::from_parts(
                    self.render_state(state)?,
                    0,
                    0,
                    Delay::from_numer_denom_ms(delay, 1),
                ));
            }
        }

        Ok(frames)
    }
}
