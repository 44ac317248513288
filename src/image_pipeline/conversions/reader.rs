use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixel::PixelFormat;
use crate::image_pipeline::stack::ImagePipelineStack;

/// Serves the output of a pipeline as a plain byte stream.
///
/// Reads may have any size; rows are pulled from the pipeline as needed. The stream ends after
/// the last output row.
pub struct PipelineReader {
    width: usize,
    height: usize,
    format: PixelFormat,
    row_bytes: usize,
    last_error: Rc<RefCell<Option<String>>>,
    buffer: ImageBuffer,
}

impl PipelineReader {
    pub fn new(mut stack: ImagePipelineStack) -> Result<Self> {
        let width = stack.get_output_width()?;
        let height = stack.get_output_height()?;
        let format = stack.get_output_format()?;
        let row_bytes = stack.get_output_row_bytes()?;
        if row_bytes == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        let last_error = Rc::new(RefCell::new(None));
        let error_slot = Rc::clone(&last_error);
        let mut buffer = ImageBuffer::new(row_bytes, move |_size, out| {
            match stack.get_next_row_data(out) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Pipeline failed to produce a row");
                    *error_slot.borrow_mut() = Some(e.to_string());
                    false
                }
            }
        });
        buffer.set_remaining_size(row_bytes * height);

        Ok(Self {
            width,
            height,
            format,
            row_bytes,
            last_error,
            buffer,
        })
    }

    /// Fills `out` completely with the next bytes of the output image
    pub fn read_data(&mut self, out: &mut [u8]) -> Result<()> {
        if out.len() > self.remaining_bytes() {
            return Err(PipelineError::ReadFailed(format!(
                "requested {} bytes, {} left in pipeline output",
                out.len(),
                self.remaining_bytes()
            )));
        }
        if self.buffer.get_data(out) {
            return Ok(());
        }
        let cause = self
            .last_error
            .borrow_mut()
            .take()
            .unwrap_or_else(|| "end of pipeline output".to_string());
        Err(PipelineError::ReadFailed(cause))
    }

    /// Bytes left before the end of the output image
    pub fn remaining_bytes(&self) -> usize {
        self.buffer.remaining_size().unwrap_or(0) + self.buffer.available()
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
}
