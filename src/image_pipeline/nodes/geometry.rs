//! Cropping and horizontal rescaling

use super::node::{BoxedNode, ImagePipelineNode};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixel::{
    PixelFormat, RawPixel, get_raw_channel_from_row, get_raw_pixel_from_row,
    set_raw_channel_to_row, set_raw_pixel_to_row,
};

/// Crops a `width` x `height` window starting at (`offset_x`, `offset_y`).
///
/// Parts of the window outside the source are filled with zeros.
pub struct Extract {
    source: BoxedNode,
    offset_x: usize,
    offset_y: usize,
    width: usize,
    height: usize,
    current_line: usize,
    cached_line: Vec<u8>,
}

impl Extract {
    pub fn new(
        source: BoxedNode,
        offset_x: usize,
        offset_y: usize,
        width: usize,
        height: usize,
    ) -> Self {
        let cached_line = vec![0; source.get_row_bytes()];
        Self {
            source,
            offset_x,
            offset_y,
            width,
            height,
            current_line: 0,
            cached_line,
        }
    }
}

impl ImagePipelineNode for Extract {
    fn get_width(&self) -> usize {
        self.width
    }

    fn get_height(&self) -> usize {
        self.height
    }

    fn get_format(&self) -> PixelFormat {
        self.source.get_format()
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        let source_height = self.source.get_height();
        let skip_lines = self.offset_y.min(source_height);
        while self.current_line < skip_lines {
            self.source.get_next_row_data(&mut self.cached_line)?;
            self.current_line += 1;
        }

        let format = self.get_format();
        let row_bytes = self.get_row_bytes();
        let source_line = self.current_line.max(self.offset_y);
        self.current_line = source_line + 1;

        if source_line >= source_height {
            out_data[..row_bytes].fill(0);
            return Ok(());
        }
        self.source.get_next_row_data(&mut self.cached_line)?;

        let copy_width = self
            .source
            .get_width()
            .saturating_sub(self.offset_x)
            .min(self.width);
        for x in 0..copy_width {
            let pixel = get_raw_pixel_from_row(&self.cached_line, x + self.offset_x, format);
            set_raw_pixel_to_row(out_data, x, pixel, format);
        }
        for x in copy_width..self.width {
            set_raw_pixel_to_row(out_data, x, RawPixel::default(), format);
        }
        Ok(())
    }
}

/// Rescales rows horizontally to `width` pixels, averaging source pixels when shrinking and
/// repeating them when growing
pub struct ScaleRows {
    source: BoxedNode,
    width: usize,
    cached_line: Vec<u8>,
}

impl ScaleRows {
    pub fn new(source: BoxedNode, width: usize) -> Result<Self> {
        if width == 0 || source.get_width() == 0 {
            return Err(PipelineError::InvalidDimensions(width, source.get_height()));
        }
        let cached_line = vec![0; source.get_row_bytes()];
        Ok(Self {
            source,
            width,
            cached_line,
        })
    }
}

impl ImagePipelineNode for ScaleRows {
    fn get_width(&self) -> usize {
        self.width
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
        self.source.get_next_row_data(&mut self.cached_line)?;

        let src_width = self.source.get_width();
        let dst_width = self.width;
        let format = self.get_format();
        let channels = format.channels();
        let src_data = &self.cached_line;

        if src_width > dst_width {
            let mut counter = src_width / 2;
            let mut src_x = 0;
            for dst_x in 0..dst_width {
                let mut sum = [0u32; 3];
                let mut count = 0u32;
                while counter < src_width && src_x < src_width {
                    counter += dst_width;
                    for (c, total) in sum.iter_mut().enumerate().take(channels) {
                        *total += get_raw_channel_from_row(src_data, src_x, c, format) as u32;
                    }
                    src_x += 1;
                    count += 1;
                }
                counter = counter.saturating_sub(src_width);

                let count = count.max(1);
                for (c, total) in sum.iter().enumerate().take(channels) {
                    set_raw_channel_to_row(out_data, dst_x, c, (total / count) as u16, format);
                }
            }
        } else {
            let mut counter = dst_width / 2;
            let mut dst_x = 0;
            for src_x in 0..src_width {
                let mut value = [0u16; 3];
                for (c, v) in value.iter_mut().enumerate().take(channels) {
                    *v = get_raw_channel_from_row(src_data, src_x, c, format);
                }
                while (counter < dst_width || src_x + 1 == src_width) && dst_x < dst_width {
                    counter += src_width;
                    for (c, v) in value.iter().enumerate().take(channels) {
                        set_raw_channel_to_row(out_data, dst_x, c, *v, format);
                    }
                    dst_x += 1;
                }
                counter = counter.saturating_sub(dst_width);
            }
        }
        Ok(())
    }
}
