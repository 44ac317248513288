//! TIFF writing module
//!
//! This module writes pipeline output and debug dumps as TIFF files with various compression options.

mod writer;
mod standard_tiff_writer;
pub mod types;

pub use writer::TiffWriter;
pub use standard_tiff_writer::{StandardTiffWriter, write_tiff_file};
pub use types::{TiffCompression, ConversionConfig, ConversionConfigBuilder};
