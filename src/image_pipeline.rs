//! Scanner image pipeline module
//!
//! This module turns the raw byte stream of a scanner's image sensor into canonical pixel rows.
//! Rows are pulled through a chain of nodes built on top of a transport source, with separate
//! modules for the pixel model, buffering, nodes, shading statistics and TIFF output.

pub mod common;
pub mod pixel;
pub mod buffer;
pub mod image;
pub mod nodes;
pub mod stack;
pub mod calibration;
pub mod tiff;
pub mod conversions;

pub use common::{
    PipelineError,
    Result,
};

pub use pixel::{
    ColorOrder,
    Pixel,
    PixelFormat,
    RawPixel,
};

pub use buffer::{
    ImageBuffer,
    RowBuffer,
};

pub use image::Image;

pub use nodes::{
    BoxedNode,
    ImagePipelineNode,
};

pub use stack::ImagePipelineStack;

pub use calibration::{
    compute_array_percentile_approx,
    compute_shading_reference,
};

pub use tiff::{
    TiffCompression,
    ConversionConfig,
    ConversionConfigBuilder,
    TiffWriter,
    StandardTiffWriter,
};

pub use conversions::{
    PipelineReader,
    ScanLayout,
    ScanLayoutBuilder,
    ScanToTiffPipeline,
    ShadingReference,
    build_image_pipeline,
};
