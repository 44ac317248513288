//! Reassembly of rows split across sensor segments or physical lines

use super::node::{BoxedNode, ImagePipelineNode};
use crate::image_pipeline::buffer::RowBuffer;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixel::{PixelFormat, get_raw_pixel_from_row, set_raw_pixel_to_row};

/// Reorders pixels delivered by a segmented sensor.
///
/// `interleaved_lines` source rows are concatenated into one input line. The input line holds
/// one block of `segment_pixels` pixels per segment, in physical order. Output pixels are taken
/// `pixels_per_chunk` at a time from each segment in turn, following `segment_order`.
pub struct Desegment {
    source: BoxedNode,
    output_width: usize,
    segment_order: Vec<usize>,
    segment_pixels: usize,
    interleaved_lines: usize,
    pixels_per_chunk: usize,
    buffer: RowBuffer,
}

impl Desegment {
    pub fn new(
        source: BoxedNode,
        output_width: usize,
        segment_order: Vec<usize>,
        segment_pixels: usize,
        interleaved_lines: usize,
        pixels_per_chunk: usize,
    ) -> Result<Self> {
        if segment_order.is_empty() || interleaved_lines == 0 || pixels_per_chunk == 0 {
            return Err(PipelineError::InvalidArgument(
                "segment order, interleaved lines and pixels per chunk must be non-empty"
                    .to_string(),
            ));
        }
        if source.get_height() % interleaved_lines != 0 {
            return Err(PipelineError::InvalidArgument(format!(
                "height {} is not a multiple of the number of interleaved lines {}",
                source.get_height(),
                interleaved_lines
            )));
        }

        let segment_count = segment_order.len();
        if let Some(&segment) = segment_order.iter().find(|&&s| s >= segment_count) {
            return Err(PipelineError::InvalidArgument(format!(
                "segment {} out of range for {} segments",
                segment, segment_count
            )));
        }

        let groups = output_width / (segment_count * pixels_per_chunk);
        let input_pixels = source.get_width() * interleaved_lines;
        if groups > 0 {
            let max_segment = segment_order.iter().copied().max().unwrap_or(0);
            let last_input = (groups - 1) * pixels_per_chunk
                + segment_pixels * max_segment
                + pixels_per_chunk;
            if last_input > input_pixels {
                return Err(PipelineError::InvalidArgument(format!(
                    "desegmenting to width {} reads {} pixels, input line has {}",
                    output_width, last_input, input_pixels
                )));
            }
        }

        let buffer = RowBuffer::new(source.get_row_bytes());
        Ok(Self {
            source,
            output_width,
            segment_order,
            segment_pixels,
            interleaved_lines,
            pixels_per_chunk,
            buffer,
        })
    }

    /// Desegments with segments in physical order
    pub fn with_segment_count(
        source: BoxedNode,
        output_width: usize,
        segment_count: usize,
        segment_pixels: usize,
        interleaved_lines: usize,
        pixels_per_chunk: usize,
    ) -> Result<Self> {
        Self::new(
            source,
            output_width,
            (0..segment_count).collect(),
            segment_pixels,
            interleaved_lines,
            pixels_per_chunk,
        )
    }
}

impl ImagePipelineNode for Desegment {
    fn get_width(&self) -> usize {
        self.output_width
    }

    fn get_height(&self) -> usize {
        self.source.get_height() / self.interleaved_lines
    }

    fn get_format(&self) -> PixelFormat {
        self.source.get_format()
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        self.buffer.clear();
        for _ in 0..self.interleaved_lines {
            self.buffer.push_back();
            self.source.get_next_row_data(self.buffer.get_back_row_ptr())?;
        }

        let format = self.get_format();
        let segment_count = self.segment_order.len();
        let groups = self.output_width / (segment_count * self.pixels_per_chunk);
        let in_data = self.buffer.linear_rows();

        for igroup in 0..groups {
            for (isegment, &segment) in self.segment_order.iter().enumerate() {
                let input_offset = igroup * self.pixels_per_chunk + self.segment_pixels * segment;
                let output_offset = (igroup * segment_count + isegment) * self.pixels_per_chunk;

                for ipixel in 0..self.pixels_per_chunk {
                    let pixel = get_raw_pixel_from_row(in_data, input_offset + ipixel, format);
                    set_raw_pixel_to_row(out_data, output_offset + ipixel, pixel, format);
                }
            }
        }
        Ok(())
    }
}

/// Joins `interleaved_lines` consecutive rows into one row that is that many times wider,
/// alternating between the rows every `pixels_per_chunk` pixels.
pub struct DeinterleaveLines {
    inner: Desegment,
}

impl DeinterleaveLines {
    pub fn new(source: BoxedNode, interleaved_lines: usize, pixels_per_chunk: usize) -> Result<Self> {
        let width = source.get_width();
        let inner = Desegment::with_segment_count(
            source,
            width * interleaved_lines,
            interleaved_lines,
            width,
            interleaved_lines,
            pixels_per_chunk,
        )?;
        Ok(Self { inner })
    }
}

impl ImagePipelineNode for DeinterleaveLines {
    fn get_width(&self) -> usize {
        self.inner.get_width()
    }

    fn get_height(&self) -> usize {
        self.inner.get_height()
    }

    fn get_format(&self) -> PixelFormat {
        self.inner.get_format()
    }

    fn eof(&self) -> bool {
        self.inner.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        self.inner.get_next_row_data(out_data)
    }
}
