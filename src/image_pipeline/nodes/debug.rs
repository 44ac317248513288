//! Pass-through node that dumps the rows it sees to a TIFF file

use std::path::PathBuf;

use tracing::{debug, warn};

use super::node::{BoxedNode, ImagePipelineNode};
use crate::image_pipeline::buffer::RowBuffer;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::image::Image;
use crate::image_pipeline::pixel::PixelFormat;
use crate::image_pipeline::tiff::{ConversionConfig, write_tiff_file};

/// Retains every row passing through and writes them to `path` once the full height has
/// been pulled, or on drop if the scan ended early.
pub struct DebugDump {
    source: BoxedNode,
    path: PathBuf,
    buffer: RowBuffer,
}

impl DebugDump {
    pub fn new(source: BoxedNode, path: impl Into<PathBuf>) -> Self {
        let buffer = RowBuffer::new(source.get_row_bytes());
        Self {
            source,
            path: path.into(),
            buffer,
        }
    }

    fn flush(&mut self) -> Result<()> {
        let height = self.buffer.height();
        let image = Image::from_data(
            self.get_width(),
            height,
            self.get_format(),
            self.buffer.linear_rows().to_vec(),
        )?;
        self.buffer.clear();

        write_tiff_file(&self.path, &image, &ConversionConfig::default())?;
        debug!(path = %self.path.display(), height, "Wrote pipeline debug image");
        Ok(())
    }
}

impl ImagePipelineNode for DebugDump {
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
        self.buffer.push_back();
        self.buffer.get_back_row_ptr().copy_from_slice(&out_data[..row_bytes]);

        if self.buffer.height() == self.get_height() {
            self.flush()?;
        }
        Ok(())
    }
}

impl Drop for DebugDump {
    fn drop(&mut self) {
        if self.buffer.empty() {
            return;
        }
        if let Err(e) = self.flush() {
            warn!(path = %self.path.display(), "Failed to write pipeline debug image: {}", e);
        }
    }
}
