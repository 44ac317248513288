//! Ownership and sequencing of a node chain

use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::image::Image;
use crate::image_pipeline::nodes::{BoxedNode, ImagePipelineNode};
use crate::image_pipeline::pixel::PixelFormat;

#[derive(Debug, Clone, Copy)]
struct InputGeometry {
    width: usize,
    height: usize,
    format: PixelFormat,
}

/// A chain of pipeline nodes, pulled from its last node.
///
/// The stack owns only the tail; every node owns the node it was pushed on top of.
#[derive(Default)]
pub struct ImagePipelineStack {
    input: Option<InputGeometry>,
    tail: Option<BoxedNode>,
}

impl ImagePipelineStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the source node. Fails if the stack already has nodes.
    pub fn push_first_node<N>(&mut self, node: N) -> Result<()>
    where
        N: ImagePipelineNode + 'static,
    {
        if self.tail.is_some() {
            return Err(PipelineError::InvalidArgument(
                "trying to add first node to a non-empty pipeline".to_string(),
            ));
        }

        self.input = Some(InputGeometry {
            width: node.get_width(),
            height: node.get_height(),
            format: node.get_format(),
        });
        debug!(
            width = node.get_width(),
            height = node.get_height(),
            format = ?node.get_format(),
            "Pushed source node"
        );
        self.tail = Some(Box::new(node));
        Ok(())
    }

    /// Wraps the current tail with the node returned by `make`.
    ///
    /// `make` receives ownership of the current tail. If it fails, the chain handed to it is
    /// dropped and the stack is left empty.
    pub fn push_node<N, F>(&mut self, make: F) -> Result<()>
    where
        N: ImagePipelineNode + 'static,
        F: FnOnce(BoxedNode) -> Result<N>,
    {
        let source = self.tail.take().ok_or(PipelineError::EmptyPipeline)?;
        match make(source) {
            Ok(node) => {
                debug!(
                    width = node.get_width(),
                    height = node.get_height(),
                    format = ?node.get_format(),
                    "Pushed pipeline node"
                );
                self.tail = Some(Box::new(node));
                Ok(())
            }
            Err(e) => {
                self.input = None;
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.tail = None;
        self.input = None;
    }

    pub fn is_empty(&self) -> bool {
        self.tail.is_none()
    }

    /// Whether the source has stopped producing data. An empty stack is at eof.
    pub fn eof(&self) -> bool {
        self.tail.as_ref().is_none_or(|node| node.eof())
    }

    fn input(&self) -> Result<InputGeometry> {
        self.input.ok_or(PipelineError::EmptyPipeline)
    }

    fn output(&self) -> Result<&dyn ImagePipelineNode> {
        self.tail.as_deref().ok_or(PipelineError::EmptyPipeline)
    }

    pub fn get_input_width(&self) -> Result<usize> {
        Ok(self.input()?.width)
    }

    pub fn get_input_height(&self) -> Result<usize> {
        Ok(self.input()?.height)
    }

    pub fn get_input_format(&self) -> Result<PixelFormat> {
        Ok(self.input()?.format)
    }

    pub fn get_input_row_bytes(&self) -> Result<usize> {
        let input = self.input()?;
        Ok(input.format.row_bytes(input.width))
    }

    pub fn get_output_width(&self) -> Result<usize> {
        Ok(self.output()?.get_width())
    }

    pub fn get_output_height(&self) -> Result<usize> {
        Ok(self.output()?.get_height())
    }

    pub fn get_output_format(&self) -> Result<PixelFormat> {
        Ok(self.output()?.get_format())
    }

    pub fn get_output_row_bytes(&self) -> Result<usize> {
        Ok(self.output()?.get_row_bytes())
    }

    /// Pulls one output row through the whole chain into the start of `out_data`
    pub fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        let node = self.tail.as_deref_mut().ok_or(PipelineError::EmptyPipeline)?;
        let row_bytes = node.get_row_bytes();
        if out_data.len() < row_bytes {
            return Err(PipelineError::InvalidArgument(format!(
                "output buffer of {} bytes is smaller than a row of {} bytes",
                out_data.len(),
                row_bytes
            )));
        }
        node.get_next_row_data(out_data)
    }

    /// Pulls every remaining output row. Meant for small images; scans should stream rows.
    pub fn get_all_data(&mut self) -> Result<Vec<u8>> {
        let row_bytes = self.get_output_row_bytes()?;
        let height = self.get_output_height()?;

        let mut data = vec![0u8; row_bytes * height];
        for row in data.chunks_exact_mut(row_bytes.max(1)).take(height) {
            self.get_next_row_data(row)?;
        }
        Ok(data)
    }

    pub fn get_image(&mut self) -> Result<Image> {
        let width = self.get_output_width()?;
        let height = self.get_output_height()?;
        let format = self.get_output_format()?;
        let data = self.get_all_data()?;
        Image::from_data(width, height, format, data)
    }
}
