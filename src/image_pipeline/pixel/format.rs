//! Pixel format definitions

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Storage order of the channels of a three-channel pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorOrder {
    Rgb,
    Bgr,
}

/// Binary pixel encodings produced or consumed by the pipeline.
///
/// 1-bit formats are packed most-significant-bit first. 16-bit samples are stored
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 1-bit gray, 8 pixels per byte
    I1,
    /// 1 bit per channel, 3 bits per pixel
    Rgb111,
    /// 8-bit gray
    I8,
    /// 8 bits per channel, stored r, g, b
    Rgb888,
    /// 8 bits per channel, stored b, g, r
    Bgr888,
    /// 16-bit gray
    I16,
    /// 16 bits per channel, stored r, g, b
    Rgb161616,
    /// 16 bits per channel, stored b, g, r
    Bgr161616,
}

impl PixelFormat {
    /// Bits per channel
    pub fn depth(self) -> usize {
        match self {
            PixelFormat::I1 | PixelFormat::Rgb111 => 1,
            PixelFormat::I8 | PixelFormat::Rgb888 | PixelFormat::Bgr888 => 8,
            PixelFormat::I16 | PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => 16,
        }
    }

    pub fn channels(self) -> usize {
        match self {
            PixelFormat::I1 | PixelFormat::I8 | PixelFormat::I16 => 1,
            _ => 3,
        }
    }

    pub fn color_order(self) -> ColorOrder {
        match self {
            PixelFormat::Bgr888 | PixelFormat::Bgr161616 => ColorOrder::Bgr,
            _ => ColorOrder::Rgb,
        }
    }

    pub fn bits_per_pixel(self) -> usize {
        self.depth() * self.channels()
    }

    /// Number of bytes needed to store `width` pixels
    pub fn row_bytes(self, width: usize) -> usize {
        (self.bits_per_pixel() * width).div_ceil(8)
    }

    /// Number of whole pixels that fit into `row_bytes` bytes
    pub fn pixels_from_row_bytes(self, row_bytes: usize) -> usize {
        (row_bytes * 8) / self.bits_per_pixel()
    }
}

pub fn get_pixel_row_bytes(format: PixelFormat, width: usize) -> usize {
    format.row_bytes(width)
}

pub fn get_pixels_from_row_bytes(format: PixelFormat, row_bytes: usize) -> usize {
    format.pixels_from_row_bytes(row_bytes)
}

/// Looks up the format with the given depth, channel count and channel order.
///
/// Channel order is ignored for single-channel and 1-bit formats.
pub fn create_pixel_format(depth: usize, channels: usize, order: ColorOrder) -> Result<PixelFormat> {
    let format = match (depth, channels, order) {
        (1, 1, _) => PixelFormat::I1,
        (1, 3, _) => PixelFormat::Rgb111,
        (8, 1, _) => PixelFormat::I8,
        (8, 3, ColorOrder::Rgb) => PixelFormat::Rgb888,
        (8, 3, ColorOrder::Bgr) => PixelFormat::Bgr888,
        (16, 1, _) => PixelFormat::I16,
        (16, 3, ColorOrder::Rgb) => PixelFormat::Rgb161616,
        (16, 3, ColorOrder::Bgr) => PixelFormat::Bgr161616,
        _ => {
            return Err(PipelineError::UnsupportedFormat(format!(
                "no pixel format for depth {}, channels {}",
                depth, channels
            )));
        }
    };
    Ok(format)
}
