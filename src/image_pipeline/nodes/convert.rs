//! Per-row sample conversions

use tracing::debug;

use super::node::{BoxedNode, ImagePipelineNode};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::pixel::{PixelFormat, convert_pixel_row_format};

pub struct FormatConvert {
    source: BoxedNode,
    dst_format: PixelFormat,
    buffer: Vec<u8>,
}

impl FormatConvert {
    pub fn new(source: BoxedNode, dst_format: PixelFormat) -> Self {
        let buffer = vec![0; source.get_row_bytes()];
        Self {
            source,
            dst_format,
            buffer,
        }
    }
}

impl ImagePipelineNode for FormatConvert {
    fn get_width(&self) -> usize {
        self.source.get_width()
    }

    fn get_height(&self) -> usize {
        self.source.get_height()
    }

    fn get_format(&self) -> PixelFormat {
        self.dst_format
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        let src_format = self.source.get_format();
        if src_format == self.dst_format {
            return self.source.get_next_row_data(out_data);
        }

        self.source.get_next_row_data(&mut self.buffer)?;
        convert_pixel_row_format(
            &self.buffer,
            src_format,
            out_data,
            self.dst_format,
            self.get_width(),
        );
        Ok(())
    }
}

/// Swaps the two bytes of every 16-bit sample. Rows of other depths pass through untouched.
pub struct Swap16BitEndian {
    source: BoxedNode,
    needs_swapping: bool,
}

impl Swap16BitEndian {
    pub fn new(source: BoxedNode) -> Self {
        let needs_swapping = source.get_format().depth() == 16;
        if !needs_swapping {
            debug!(format = ?source.get_format(), "Swap16BitEndian has no effect on this format");
        }
        Self {
            source,
            needs_swapping,
        }
    }
}

impl ImagePipelineNode for Swap16BitEndian {
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
        if self.needs_swapping {
            let row_bytes = self.get_row_bytes();
            for sample in out_data[..row_bytes].chunks_exact_mut(2) {
                sample.swap(0, 1);
            }
        }
        Ok(())
    }
}

/// Complements every sample. Padding bits at the end of 1-bit rows stay cleared.
pub struct Invert {
    source: BoxedNode,
}

impl Invert {
    pub fn new(source: BoxedNode) -> Self {
        Self { source }
    }
}

impl ImagePipelineNode for Invert {
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

        let row_bytes = self.get_row_bytes();
        let row = &mut out_data[..row_bytes];
        for byte in row.iter_mut() {
            *byte = !*byte;
        }

        let used_bits = self.get_width() * self.get_format().bits_per_pixel() % 8;
        if used_bits != 0 {
            if let Some(last) = row.last_mut() {
                *last &= 0xffu8 << (8 - used_bits);
            }
        }
        Ok(())
    }
}
