//! Conversion between line-sequential mono rows and interleaved color rows

use super::node::{BoxedNode, ImagePipelineNode};
use crate::image_pipeline::buffer::RowBuffer;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixel::{
    ColorOrder, PixelFormat, get_raw_channel_from_row, set_raw_channel_to_row,
};

/// Merges each group of three mono rows into one color row.
///
/// The first row of a group becomes the first stored channel, so `color_order` names the
/// order in which the sensor delivers the color lines.
pub struct MergeMonoLines {
    source: BoxedNode,
    output_format: PixelFormat,
    buffer: RowBuffer,
}

impl MergeMonoLines {
    pub fn new(source: BoxedNode, color_order: ColorOrder) -> Result<Self> {
        let output_format = Self::get_output_format(source.get_format(), color_order)?;
        let buffer = RowBuffer::new(source.get_row_bytes());
        Ok(Self {
            source,
            output_format,
            buffer,
        })
    }

    fn get_output_format(input_format: PixelFormat, order: ColorOrder) -> Result<PixelFormat> {
        match (input_format, order) {
            (PixelFormat::I1, ColorOrder::Rgb) => Ok(PixelFormat::Rgb111),
            (PixelFormat::I8, ColorOrder::Rgb) => Ok(PixelFormat::Rgb888),
            (PixelFormat::I8, ColorOrder::Bgr) => Ok(PixelFormat::Bgr888),
            (PixelFormat::I16, ColorOrder::Rgb) => Ok(PixelFormat::Rgb161616),
            (PixelFormat::I16, ColorOrder::Bgr) => Ok(PixelFormat::Bgr161616),
            _ => Err(PipelineError::UnsupportedFormat(format!(
                "cannot merge {:?} lines in {:?} order",
                input_format, order
            ))),
        }
    }
}

impl ImagePipelineNode for MergeMonoLines {
    fn get_width(&self) -> usize {
        self.source.get_width()
    }

    fn get_height(&self) -> usize {
        self.source.get_height() / 3
    }

    fn get_format(&self) -> PixelFormat {
        self.output_format
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        self.buffer.clear();
        for _ in 0..3 {
            self.buffer.push_back();
            self.source.get_next_row_data(self.buffer.get_back_row_ptr())?;
        }

        let src_format = self.source.get_format();
        for x in 0..self.get_width() {
            for channel in 0..3 {
                let value = get_raw_channel_from_row(self.buffer.get_row(channel), x, 0, src_format);
                set_raw_channel_to_row(out_data, x, channel, value, self.output_format);
            }
        }
        Ok(())
    }
}

/// Splits each color row into three mono rows, one per stored channel
pub struct SplitMonoLines {
    source: BoxedNode,
    output_format: PixelFormat,
    buffer: Vec<u8>,
    next_channel: usize,
}

impl SplitMonoLines {
    pub fn new(source: BoxedNode) -> Result<Self> {
        let output_format = match source.get_format() {
            PixelFormat::Rgb111 => PixelFormat::I1,
            PixelFormat::Rgb888 | PixelFormat::Bgr888 => PixelFormat::I8,
            PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => PixelFormat::I16,
            format => {
                return Err(PipelineError::UnsupportedFormat(format!(
                    "cannot split {:?} into mono lines",
                    format
                )));
            }
        };
        let buffer = vec![0; source.get_row_bytes()];
        Ok(Self {
            source,
            output_format,
            buffer,
            next_channel: 0,
        })
    }
}

impl ImagePipelineNode for SplitMonoLines {
    fn get_width(&self) -> usize {
        self.source.get_width()
    }

    fn get_height(&self) -> usize {
        self.source.get_height() * 3
    }

    fn get_format(&self) -> PixelFormat {
        self.output_format
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        if self.next_channel == 0 {
            self.source.get_next_row_data(&mut self.buffer)?;
        }

        let src_format = self.source.get_format();
        for x in 0..self.get_width() {
            let value = get_raw_channel_from_row(&self.buffer, x, self.next_channel, src_format);
            set_raw_channel_to_row(out_data, x, 0, value, self.output_format);
        }

        self.next_channel = (self.next_channel + 1) % 3;
        Ok(())
    }
}
