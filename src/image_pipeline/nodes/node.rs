use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::pixel::PixelFormat;

/// A stage of the pull pipeline.
///
/// `get_next_row_data` writes exactly `get_row_bytes()` bytes into the start of `out_data`,
/// which must be at least that long. An error ends the scan; rows pulled after an error
/// carry no guarantees.
pub trait ImagePipelineNode {
    fn get_width(&self) -> usize;

    fn get_height(&self) -> usize;

    fn get_format(&self) -> PixelFormat;

    fn get_row_bytes(&self) -> usize {
        self.get_format().row_bytes(self.get_width())
    }

    /// Whether the source at the head of the chain has stopped producing data
    fn eof(&self) -> bool;

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()>;
}

pub type BoxedNode = Box<dyn ImagePipelineNode>;
