#![warn(missing_docs)]
//! # chemviz-chart
//!
//! ## Purpose
//! Models the chart-rendering capability the report engine depends on.
//!
//! ## Responsibilities
//! - Define a surface-agnostic [`ChartSurface`] trait producing an optional
//!   raster image of the current distribution chart.
//! - Expose a deterministic synthetic surface for tests and headless shells.
//! - Validate raster buffers before they enter the report pipeline.
//!
//! ## Data flow
//! Export asks the active surface for a raster of the current
//! [`chemviz_core::Summary`]; `None` means no rendering surface exists and
//! pagination proceeds without the image.
//!
//! ## Ownership and lifetimes
//! Raster images own their pixel buffers so report documents can outlive the
//! surface that produced them.
//!
//! ## Error model
//! Buffer shape violations return [`ChartError`]. A missing surface is not an
//! error; it is the `None` case of the capability.

use chemviz_core::Summary;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raster image in RGBA row-major layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel bytes (`width * height * 4`).
    pub rgba: Vec<u8>,
}

impl RasterImage {
    /// Constructs a validated raster image.
    ///
    /// # Errors
    /// Returns [`ChartError::InvalidRasterShape`] when the buffer length is
    /// not exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ChartError> {
        let expected = required_rgba_len(width, height)?;
        if rgba.len() != expected {
            return Err(ChartError::InvalidRasterShape {
                expected,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

/// Capability producing a raster image of the current chart, or none.
///
/// The real bar-chart rasterizer is an external collaborator; this trait is
/// its boundary. `None` models a missing rendering surface and must not
/// abort report export.
pub trait ChartSurface: Send + Sync {
    /// Renders the current distribution chart, if a surface is available.
    fn render(&self, summary: &Summary) -> Option<RasterImage>;
}

/// Surface that is always absent. Models export without a rendered chart.
#[derive(Debug, Default)]
pub struct NullChartSurface;

impl ChartSurface for NullChartSurface {
    fn render(&self, _summary: &Summary) -> Option<RasterImage> {
        None
    }
}

/// Deterministic synthetic surface for tests and headless shells.
///
/// Draws one solid column per equipment type on a white background, scaled
/// against the maximum count. Output depends only on the summary and the
/// configured geometry.
#[derive(Debug, Clone)]
pub struct SyntheticChartSurface {
    width: u32,
    height: u32,
}

impl SyntheticChartSurface {
    /// Creates a synthetic surface with the given raster geometry.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for SyntheticChartSurface {
    fn default() -> Self {
        Self::new(360, 180)
    }
}

impl ChartSurface for SyntheticChartSurface {
    fn render(&self, summary: &Summary) -> Option<RasterImage> {
        if self.width == 0 || self.height == 0 {
            return None;
        }

        let width = self.width as usize;
        let height = self.height as usize;
        let mut rgba = vec![255_u8; width * height * 4];

        let bars: Vec<u64> = summary.type_distribution.values().copied().collect();
        let max_count = bars.iter().copied().max().unwrap_or(0);
        if max_count > 0 {
            let slot_width = width / bars.len().max(1);
            for (bar_index, count) in bars.iter().enumerate() {
                let bar_height =
                    ((*count as usize).saturating_mul(height) / max_count as usize).min(height);
                let x_start = bar_index * slot_width;
                // Leave a one-pixel gutter between adjacent columns.
                let x_end = (x_start + slot_width.saturating_sub(1)).min(width);
                let shade = column_shade(bar_index);

                for y in height - bar_height..height {
                    for x in x_start..x_end {
                        let offset = (y * width + x) * 4;
                        rgba[offset..offset + 4].copy_from_slice(&shade);
                    }
                }
            }
        }

        RasterImage::new(self.width, self.height, rgba).ok()
    }
}

fn column_shade(bar_index: usize) -> [u8; 4] {
    // Cycle a small fixed palette so adjacent columns stay distinguishable.
    const PALETTE: [[u8; 4]; 4] = [
        [54, 162, 235, 255],
        [46, 134, 193, 255],
        [36, 113, 163, 255],
        [27, 79, 114, 255],
    ];
    PALETTE[bar_index % PALETTE.len()]
}

fn required_rgba_len(width: u32, height: u32) -> Result<usize, ChartError> {
    let pixels = (width as usize)
        .checked_mul(height as usize)
        .ok_or(ChartError::Overflow)?;
    pixels.checked_mul(4).ok_or(ChartError::Overflow)
}

/// Chart capability error type.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Raster buffer length does not match declared geometry.
    #[error("invalid raster shape: expected {expected} bytes, got {actual}")]
    InvalidRasterShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Integer overflow while computing raster geometry.
    #[error("raster dimension overflow")]
    Overflow,
}
