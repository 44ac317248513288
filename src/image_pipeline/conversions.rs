//! Pipeline conversions module
//!
//! This module contains the orchestration logic that assembles a node chain for a scan layout,
//! serves its output as a byte stream and converts complete scans to TIFF.

mod layout;
mod reader;
mod scan_to_tiff;

#[cfg(test)]
mod tests;

pub use layout::{ScanLayout, ScanLayoutBuilder, ShadingReference, build_image_pipeline};
pub use reader::PipelineReader;
pub use scan_to_tiff::ScanToTiffPipeline;
