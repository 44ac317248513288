//! Source nodes at the head of a pipeline

use tracing::{debug, warn};

use super::node::ImagePipelineNode;
use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixel::PixelFormat;

/// Calls the producer once per row with exactly `row_bytes` bytes
pub struct CallableSource {
    producer: Box<dyn FnMut(usize, &mut [u8]) -> bool>,
    width: usize,
    height: usize,
    format: PixelFormat,
    curr_row: usize,
    eof: bool,
}

impl CallableSource {
    pub fn new<F>(width: usize, height: usize, format: PixelFormat, producer: F) -> Self
    where
        F: FnMut(usize, &mut [u8]) -> bool + 'static,
    {
        Self {
            producer: Box::new(producer),
            width,
            height,
            format,
            curr_row: 0,
            eof: false,
        }
    }
}

impl ImagePipelineNode for CallableSource {
    fn get_width(&self) -> usize {
        self.width
    }

    fn get_height(&self) -> usize {
        self.height
    }

    fn get_format(&self) -> PixelFormat {
        self.format
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        if self.curr_row >= self.height {
            warn!(height = self.height, "Trying to read past end of callable source");
            self.eof = true;
            return Err(PipelineError::EndOfData { height: self.height });
        }

        let row_bytes = self.get_row_bytes();
        let got_data = (self.producer)(row_bytes, &mut out_data[..row_bytes]);
        self.curr_row += 1;
        if !got_data {
            self.eof = true;
            return Err(PipelineError::ReadFailed(format!("row {} not delivered", self.curr_row - 1)));
        }
        Ok(())
    }
}

/// Pulls rows through an [`ImageBuffer`] so the producer only sees requests of
/// `input_batch_size` bytes, capped by the total size of the image.
pub struct BufferedCallableSource {
    width: usize,
    height: usize,
    format: PixelFormat,
    curr_row: usize,
    eof: bool,
    buffer: ImageBuffer,
}

impl BufferedCallableSource {
    pub fn new<F>(
        width: usize,
        height: usize,
        format: PixelFormat,
        input_batch_size: usize,
        producer: F,
    ) -> Result<Self>
    where
        F: FnMut(usize, &mut [u8]) -> bool + 'static,
    {
        if input_batch_size == 0 {
            return Err(PipelineError::InvalidArgument(
                "input batch size must be non-zero".to_string(),
            ));
        }

        let mut buffer = ImageBuffer::new(input_batch_size, producer);
        buffer.set_remaining_size(format.row_bytes(width) * height);
        debug!(width, height, ?format, input_batch_size, "Created buffered callable source");

        Ok(Self {
            width,
            height,
            format,
            curr_row: 0,
            eof: false,
            buffer,
        })
    }

    /// Rounds the final transport read up to a multiple of `multiple` bytes
    pub fn with_last_read_multiple(mut self, multiple: usize) -> Self {
        self.set_last_read_multiple(multiple);
        self
    }

    pub fn remaining_bytes(&self) -> Option<usize> {
        self.buffer.remaining_size()
    }

    pub fn set_remaining_bytes(&mut self, bytes: usize) {
        self.buffer.set_remaining_size(bytes);
    }

    pub fn set_last_read_multiple(&mut self, multiple: usize) {
        self.buffer.set_last_read_multiple(multiple);
    }
}

impl ImagePipelineNode for BufferedCallableSource {
    fn get_width(&self) -> usize {
        self.width
    }

    fn get_height(&self) -> usize {
        self.height
    }

    fn get_format(&self) -> PixelFormat {
        self.format
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        if self.curr_row >= self.height {
            warn!(height = self.height, "Trying to read past end of buffered callable source");
            self.eof = true;
            return Err(PipelineError::EndOfData { height: self.height });
        }

        let row_bytes = self.get_row_bytes();
        let got_data = self.buffer.get_data(&mut out_data[..row_bytes]);
        self.curr_row += 1;
        if !got_data {
            self.eof = true;
            return Err(PipelineError::ReadFailed(format!(
                "row {} of {} not delivered",
                self.curr_row - 1,
                self.height
            )));
        }
        Ok(())
    }
}

/// Serves rows from an in-memory byte array
pub struct ArraySource {
    width: usize,
    height: usize,
    format: PixelFormat,
    next_row: usize,
    eof: bool,
    data: Vec<u8>,
}

impl ArraySource {
    pub fn new(width: usize, height: usize, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let size = format.row_bytes(width) * height;
        if data.len() < size {
            return Err(PipelineError::InvalidArgument(format!(
                "array source holds {} bytes, {}x{} {:?} needs {}",
                data.len(),
                width,
                height,
                format,
                size
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            next_row: 0,
            eof: false,
            data,
        })
    }
}

impl ImagePipelineNode for ArraySource {
    fn get_width(&self) -> usize {
        self.width
    }

    fn get_height(&self) -> usize {
        self.height
    }

    fn get_format(&self) -> PixelFormat {
        self.format
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        if self.next_row >= self.height {
            self.eof = true;
            return Err(PipelineError::EndOfData { height: self.height });
        }

        let row_bytes = self.get_row_bytes();
        let offset = self.next_row * row_bytes;
        out_data[..row_bytes].copy_from_slice(&self.data[offset..offset + row_bytes]);
        self.next_row += 1;
        Ok(())
    }
}
