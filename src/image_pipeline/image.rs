//! In-memory image

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixel::{
    Pixel, PixelFormat, get_pixel_from_row, get_raw_channel_from_row, set_pixel_to_row,
    set_raw_channel_to_row,
};

/// A fully materialized image made of packed rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    data: Vec<u8>,
}

impl Image {
    /// Creates a zero-filled image
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        let row_bytes = format.row_bytes(width);
        Self {
            width,
            height,
            format,
            row_bytes,
            data: vec![0; row_bytes * height],
        }
    }

    /// Wraps existing row data, which must hold exactly `height` rows
    pub fn from_data(width: usize, height: usize, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let row_bytes = format.row_bytes(width);
        if data.len() != row_bytes * height {
            return Err(PipelineError::InvalidArgument(format!(
                "image data has {} bytes, expected {} for {}x{} {:?}",
                data.len(),
                row_bytes * height,
                width,
                height,
                format
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            row_bytes,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.row_bytes..(y + 1) * self.row_bytes]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[y * self.row_bytes..(y + 1) * self.row_bytes]
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Pixel {
        get_pixel_from_row(self.row(y), x, self.format)
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        let format = self.format;
        set_pixel_to_row(self.row_mut(y), x, pixel, format);
    }

    pub fn get_raw_channel(&self, x: usize, y: usize, channel: usize) -> u16 {
        get_raw_channel_from_row(self.row(y), x, channel, self.format)
    }

    pub fn set_raw_channel(&mut self, x: usize, y: usize, channel: usize, value: u16) {
        let format = self.format;
        set_raw_channel_to_row(self.row_mut(y), x, channel, value, format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_from_data_checks_size() {
        let result = Image::from_data(4, 2, PixelFormat::Rgb888, vec![0; 23]);
        assert!(matches!(result.unwrap_err(), PipelineError::InvalidArgument(_)));

        let image = Image::from_data(4, 2, PixelFormat::Rgb888, (0..24).collect()).unwrap();
        assert_eq!(image.row_bytes(), 12);
        assert_eq!(image.row(1)[0], 12);
        assert_eq!(image.get_raw_channel(1, 1, 2), 17);
    }

    #[test]
    fn test_image_pixel_access() {
        let mut image = Image::new(3, 2, PixelFormat::I16);
        image.set_pixel(2, 1, Pixel::gray(0x1234));
        assert_eq!(image.get_pixel(2, 1), Pixel::gray(0x1234));
        assert_eq!(image.row(1), &[0, 0, 0, 0, 0x34, 0x12]);

        image.set_raw_channel(0, 0, 0, 0xabcd);
        assert_eq!(image.row(0)[..2], [0xcd, 0xab]);
    }
}
