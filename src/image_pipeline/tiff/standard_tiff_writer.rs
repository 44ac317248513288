use std::io::Write;
use std::path::Path;
use tracing::debug;
use crate::image_pipeline::common::error::{Result, PipelineError};
use crate::image_pipeline::image::Image;
use crate::image_pipeline::pixel::{PixelFormat, convert_pixel_row_format};
use crate::image_pipeline::tiff::types::{ConversionConfig, TiffCompression};
use crate::image_pipeline::tiff::writer::TiffWriter;

pub struct StandardTiffWriter;

/// Format the encoder receives for a pipeline format: bit-packed data is widened to 8 bits
/// and BGR data is reordered to RGB.
fn encodable_format(format: PixelFormat) -> PixelFormat {
    match format {
        PixelFormat::I1 => PixelFormat::I8,
        PixelFormat::Rgb111 | PixelFormat::Bgr888 => PixelFormat::Rgb888,
        PixelFormat::Bgr161616 => PixelFormat::Rgb161616,
        other => other,
    }
}

fn encodable_data(image: &Image, format: PixelFormat) -> Vec<u8> {
    if format == image.format() {
        return image.data().to_vec();
    }

    let row_bytes = format.row_bytes(image.width());
    let mut data = vec![0u8; row_bytes * image.height()];
    for (y, out_row) in data.chunks_exact_mut(row_bytes.max(1)).enumerate().take(image.height()) {
        convert_pixel_row_format(image.row(y), image.format(), out_row, format, image.width());
    }
    data
}

fn samples_16(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

impl TiffWriter for StandardTiffWriter {
    fn write_tiff(&self, image: &Image, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        debug!("Encoding TIFF image: {}x{} {:?}", image.width(), image.height(), image.format());

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
        };

        let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => tiff::tags::Predictor::Horizontal,
                _ => tiff::tags::Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        let width = image.width() as u32;
        let height = image.height() as u32;
        let format = encodable_format(image.format());
        let data = encodable_data(image, format);

        let written = match format {
            PixelFormat::I8 => encoder.write_image::<tiff::encoder::colortype::Gray8>(width, height, &data),
            PixelFormat::Rgb888 => encoder.write_image::<tiff::encoder::colortype::RGB8>(width, height, &data),
            PixelFormat::I16 => encoder.write_image::<tiff::encoder::colortype::Gray16>(width, height, &samples_16(&data)),
            PixelFormat::Rgb161616 => encoder.write_image::<tiff::encoder::colortype::RGB16>(width, height, &samples_16(&data)),
            other => {
                return Err(PipelineError::UnsupportedFormat(format!("TIFF output of {:?}", other)));
            }
        };
        written.map_err(|e| PipelineError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}

/// Writes `image` to a new TIFF file at `path`
pub fn write_tiff_file<P: AsRef<Path>>(path: P, image: &Image, config: &ConversionConfig) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path).map_err(|e| {
        PipelineError::OutputWriteError(format!("{}: {}", path.display(), e))
    })?;
    StandardTiffWriter.write_tiff(image, &mut file, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode(bytes: Vec<u8>) -> (u32, u32, tiff::ColorType, tiff::decoder::DecodingResult) {
        let mut decoder = tiff::decoder::Decoder::new(Cursor::new(bytes)).unwrap();
        let (width, height) = decoder.dimensions().unwrap();
        let color_type = decoder.colortype().unwrap();
        let data = decoder.read_image().unwrap();
        (width, height, color_type, data)
    }

    #[test]
    fn test_write_bgr888_as_rgb8() {
        let image = Image::from_data(2, 1, PixelFormat::Bgr888, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let mut output = Vec::new();
        StandardTiffWriter.write_tiff(&image, &mut output, &ConversionConfig::default()).unwrap();

        let (width, height, color_type, data) = decode(output);
        assert_eq!((width, height), (2, 1));
        assert_eq!(color_type, tiff::ColorType::RGB(8));
        match data {
            tiff::decoder::DecodingResult::U8(samples) => assert_eq!(samples, vec![3, 2, 1, 6, 5, 4]),
            _ => panic!("expected 8-bit samples"),
        }
    }

    #[test]
    fn test_write_i16_little_endian_samples() {
        let image = Image::from_data(2, 2, PixelFormat::I16, vec![0x34, 0x12, 0, 0, 0xff, 0xff, 1, 0]).unwrap();
        let mut output = Vec::new();
        let config = ConversionConfig::builder().compression(TiffCompression::Lzw).build();
        StandardTiffWriter.write_tiff(&image, &mut output, &config).unwrap();

        let (_, _, color_type, data) = decode(output);
        assert_eq!(color_type, tiff::ColorType::Gray(16));
        match data {
            tiff::decoder::DecodingResult::U16(samples) => assert_eq!(samples, vec![0x1234, 0, 0xffff, 1]),
            _ => panic!("expected 16-bit samples"),
        }
    }

    #[test]
    fn test_write_i1_widened_to_gray8() {
        let image = Image::from_data(4, 1, PixelFormat::I1, vec![0b1010_0000]).unwrap();
        let mut output = Vec::new();
        StandardTiffWriter.write_tiff(&image, &mut output, &ConversionConfig::default()).unwrap();

        let (_, _, color_type, data) = decode(output);
        assert_eq!(color_type, tiff::ColorType::Gray(8));
        match data {
            tiff::decoder::DecodingResult::U8(samples) => assert_eq!(samples, vec![0xff, 0, 0xff, 0]),
            _ => panic!("expected 8-bit samples"),
        }
    }

    #[test]
    fn test_write_tiff_file_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.tiff");
        let image = Image::new(1, 1, PixelFormat::I8);
        let result = write_tiff_file(&path, &image, &ConversionConfig::default());
        assert!(matches!(result.unwrap_err(), PipelineError::OutputWriteError(_)));
    }
}
