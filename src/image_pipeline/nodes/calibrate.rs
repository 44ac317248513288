//! Shading correction

use super::node::{BoxedNode, ImagePipelineNode};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixel::{PixelFormat, get_raw_channel_from_row, set_raw_channel_to_row};

/// Stretches every sample between its black (`bottom`) and white (`top`) reference.
///
/// References are full-scale 16-bit values indexed per sample (`x * channels + channel`),
/// starting at `x_start`. Samples past the end of the references pass through unchanged.
pub struct Calibrate {
    source: BoxedNode,
    max_value: f64,
    offsets: Vec<f64>,
    spans: Vec<f64>,
}

impl Calibrate {
    pub fn new(source: BoxedNode, bottom: &[u16], top: &[u16], x_start: usize) -> Result<Self> {
        let max_value = match source.get_format().depth() {
            8 => 255.0,
            16 => 65535.0,
            depth => {
                return Err(PipelineError::UnsupportedFormat(format!(
                    "calibration of {}-bit data",
                    depth
                )));
            }
        };

        let size = bottom.len().min(top.len()).saturating_sub(x_start);
        let bottom = &bottom[x_start.min(bottom.len())..];
        let top = &top[x_start.min(top.len())..];

        let offsets = bottom[..size].iter().map(|&b| b as f64).collect();
        let spans = bottom[..size]
            .iter()
            .zip(&top[..size])
            .map(|(&b, &t)| (t as f64 - b as f64).max(1.0))
            .collect();

        Ok(Self {
            source,
            max_value,
            offsets,
            spans,
        })
    }
}

impl ImagePipelineNode for Calibrate {
    fn get_width(&self) -> usize {
        self.source.get_width()
    }

    fn get_height(&self) -> usize {
        self.source.get_height()
    }

    fn get_format(&self) -> PixelFormat {
        self.source.get_format()
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        self.source.get_next_row_data(out_data)?;

        let format = self.get_format();
        let channels = format.channels();
        let samples = (self.get_width() * channels).min(self.offsets.len());

        for i in 0..samples {
            let (x, channel) = (i / channels, i % channels);
            let value = get_raw_channel_from_row(out_data, x, channel, format) as f64;

            let full_scale = value * 65535.0 / self.max_value;
            let calibrated = ((full_scale - self.offsets[i]) * self.max_value / self.spans[i]).round();
            let calibrated = calibrated.clamp(0.0, self.max_value) as u16;

            set_raw_channel_to_row(out_data, x, channel, calibrated, format);
        }
        Ok(())
    }
}
