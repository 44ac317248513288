//! Scan conversion configuration types

use std::path::PathBuf;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - best compression (slower)
    DeflateBest,
    /// Deflate compression - balanced
    DeflateBalanced,
}

/// Configuration for turning scanner data into TIFF output
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Compression method to use
    pub compression: TiffCompression,
    /// Predictor value for compression (2 for horizontal differencing)
    pub predictor: Option<u16>,
    /// Whether to reject empty images before encoding
    pub validate_dimensions: bool,
    /// Bytes requested from the transport per read
    pub chunk_size: usize,
    /// Transport reads are rounded up to this many bytes at the end of the scan
    pub read_alignment: usize,
    /// When set, every pipeline stage dumps its output as a TIFF file into this directory
    pub debug_dump_dir: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::None,
            predictor: None,
            validate_dimensions: true,
            chunk_size: 64 * 1024,
            read_alignment: 2,
            debug_dump_dir: None,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    validate_dimensions: Option<bool>,
    chunk_size: Option<usize>,
    read_alignment: Option<usize>,
    debug_dump_dir: Option<Option<PathBuf>>,
}

impl ConversionConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    pub fn read_alignment(mut self, bytes: usize) -> Self {
        self.read_alignment = Some(bytes);
        self
    }

    pub fn debug_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dump_dir = Some(dir);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            chunk_size: self.chunk_size.unwrap_or(default.chunk_size),
            read_alignment: self.read_alignment.unwrap_or(default.read_alignment),
            debug_dump_dir: self.debug_dump_dir.unwrap_or(default.debug_dump_dir),
        }
    }
}
