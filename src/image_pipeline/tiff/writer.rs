use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::image::Image;
use crate::image_pipeline::tiff::types::ConversionConfig;

pub trait TiffWriter {
    fn write_tiff(&self, image: &Image, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
}
