#[cfg(test)]
mod tests {
    use crate::image_pipeline::{
        common::error::{PipelineError, Result},
        conversions::{PipelineReader, ScanLayout, ScanToTiffPipeline, ShadingReference, build_image_pipeline},
        image::Image,
        nodes::ArraySource,
        pixel::{ColorOrder, Pixel, PixelFormat},
        stack::ImagePipelineStack,
        tiff::{ConversionConfig, TiffWriter},
    };
    use std::io::{Cursor, Write};
    use std::sync::{Arc, Mutex};

    struct MockWriter {
        should_fail: bool,
        written_images: Arc<Mutex<Vec<Image>>>,
    }

    impl MockWriter {
        fn new(should_fail: bool) -> Self {
            Self {
                should_fail,
                written_images: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl TiffWriter for MockWriter {
        fn write_tiff(&self, image: &Image, _output: &mut dyn Write, _config: &ConversionConfig) -> Result<()> {
            if self.should_fail {
                return Err(PipelineError::EncodeError("Mock write error".to_string()));
            }
            self.written_images.lock().unwrap().push(image.clone());
            Ok(())
        }
    }

    fn gray_layout(width: usize, lines: usize) -> ScanLayout {
        ScanLayout::builder().width(width).lines(lines).build()
    }

    fn convert_with_mock(raw: &[u8], layout: &ScanLayout) -> Image {
        let writer = MockWriter::new(false);
        let written = Arc::clone(&writer.written_images);
        let pipeline = ScanToTiffPipeline::with_custom(writer, ConversionConfig::default());

        let mut output = Cursor::new(Vec::new());
        pipeline.convert(raw, layout, &mut output).unwrap();

        let mut images = written.lock().unwrap();
        assert_eq!(images.len(), 1);
        images.remove(0)
    }

    #[test]
    fn test_successful_conversion() {
        let raw: Vec<u8> = (0..8).collect();
        let image = convert_with_mock(&raw, &gray_layout(4, 2));

        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
        assert_eq!(image.format(), PixelFormat::I8);
        assert_eq!(image.data(), &raw[..]);
    }

    #[test]
    fn test_writer_failure() {
        let pipeline = ScanToTiffPipeline::with_custom(MockWriter::new(true), ConversionConfig::default());
        let mut output = Cursor::new(Vec::new());

        let result = pipeline.convert(&[0; 8], &gray_layout(4, 2), &mut output);
        assert!(matches!(result.unwrap_err(), PipelineError::EncodeError(_)));
    }

    #[test]
    fn test_short_scan_data() {
        let pipeline = ScanToTiffPipeline::with_custom(MockWriter::new(false), ConversionConfig::default());
        let mut output = Cursor::new(Vec::new());

        let result = pipeline.convert(&[0; 7], &gray_layout(4, 2), &mut output);
        assert!(matches!(result.unwrap_err(), PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_scan_rejected() {
        let pipeline = ScanToTiffPipeline::with_custom(MockWriter::new(false), ConversionConfig::default());
        let mut output = Cursor::new(Vec::new());

        let result = pipeline.convert(&[], &gray_layout(4, 0), &mut output);
        assert!(matches!(result.unwrap_err(), PipelineError::InvalidDimensions(4, 0)));
    }

    #[test]
    fn test_unsupported_layout_format() {
        let layout = ScanLayout::builder().width(4).lines(1).depth(12).build();
        let pipeline = ScanToTiffPipeline::with_custom(MockWriter::new(false), ConversionConfig::default());
        let mut output = Cursor::new(Vec::new());

        let result = pipeline.convert(&[0; 8], &layout, &mut output);
        assert!(matches!(result.unwrap_err(), PipelineError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_segmented_cis_color_scan() {
        // two 2-pixel segments delivered in swapped order, one mono line per color
        let layout = ScanLayout::builder()
            .width(4)
            .lines(3)
            .channels(3)
            .cis(true)
            .segments(vec![1, 0], 2)
            .build();
        let raw = vec![
            0x11, 0x13, 0x10, 0x12,
            0x21, 0x23, 0x20, 0x22,
            0x31, 0x33, 0x30, 0x32,
        ];

        let image = convert_with_mock(&raw, &layout);
        assert_eq!(image.format(), PixelFormat::Rgb888);
        assert_eq!((image.width(), image.height()), (4, 1));
        assert_eq!(
            image.data(),
            &[
                0x10, 0x20, 0x30, 0x11, 0x21, 0x31,
                0x12, 0x22, 0x32, 0x13, 0x23, 0x33,
            ]
        );
    }

    #[test]
    fn test_big_endian_inverted_bgr_scan() {
        let layout = ScanLayout::builder()
            .width(2)
            .lines(1)
            .depth(16)
            .channels(3)
            .color_order(ColorOrder::Bgr)
            .swap_16bit(true)
            .invert(true)
            .build();
        let raw = vec![
            0xfa, 0xf9, 0xfc, 0xfb, 0xfe, 0xfd,
            0x1f, 0x0f, 0x3f, 0x2f, 0x5f, 0x4f,
        ];

        let image = convert_with_mock(&raw, &layout);
        assert_eq!(image.format(), PixelFormat::Rgb161616);
        assert_eq!(image.get_pixel(0, 0), Pixel::new(0x0102, 0x0304, 0x0506));
        assert_eq!(image.get_pixel(1, 0), Pixel::new(0xa0b0, 0xc0d0, 0xe0f0));
    }

    #[test]
    fn test_color_shifted_scan() {
        let layout = ScanLayout::builder()
            .width(1)
            .lines(3)
            .channels(3)
            .color_shift_lines(0, 1, 2)
            .build();
        let raw = vec![
            0x10, 0x20, 0x30,
            0x11, 0x21, 0x31,
            0x12, 0x22, 0x32,
        ];

        let image = convert_with_mock(&raw, &layout);
        assert_eq!((image.width(), image.height()), (1, 1));
        assert_eq!(image.data(), &[0x10, 0x21, 0x32]);
    }

    #[test]
    fn test_staggered_scan() {
        let layout = ScanLayout::builder()
            .width(4)
            .lines(3)
            .stagger_y(vec![0, 1])
            .build();
        let raw: Vec<u8> = (0..3u8)
            .flat_map(|row| (0..4u8).map(move |col| row * 0x10 + col))
            .collect();

        let image = convert_with_mock(&raw, &layout);
        assert_eq!((image.width(), image.height()), (4, 2));
        assert_eq!(
            image.data(),
            &[0x00, 0x11, 0x02, 0x13, 0x10, 0x21, 0x12, 0x23]
        );
    }

    #[test]
    fn test_shading_corrected_scan() {
        let layout = ScanLayout::builder()
            .width(2)
            .lines(1)
            .shading(Some(ShadingReference {
                bottom: vec![0x1000, 0x1000],
                top: vec![0x3000, 0x5000],
                x_start: 0,
            }))
            .build();

        let image = convert_with_mock(&[0x20, 0x30], &layout);
        assert_eq!(image.data(), &[0x80, 0x80]);
    }

    #[test]
    fn test_rescaled_to_requested_pixels() {
        let layout = ScanLayout::builder()
            .width(3)
            .lines(2)
            .requested_pixels(Some(6))
            .build();

        let image = convert_with_mock(&[1, 2, 3, 4, 5, 6], &layout);
        assert_eq!((image.width(), image.height()), (6, 2));
        assert_eq!(image.row(1), &[4, 5, 5, 6, 6, 6]);
    }

    #[test]
    fn test_unaligned_final_read_is_padded() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let config = ConversionConfig::builder().chunk_size(4).read_alignment(4).build();

        let mut stack = build_image_pipeline(&gray_layout(3, 2), &config, move |size, out| {
            recorded.lock().unwrap().push(size);
            out.fill(7);
            true
        })
        .unwrap();

        assert_eq!(stack.get_all_data().unwrap(), vec![7; 6]);
        assert_eq!(*requests.lock().unwrap(), vec![4, 4]);
    }

    #[test]
    fn test_debug_dump_per_stage() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversionConfig::builder()
            .debug_dump_dir(Some(dir.path().to_path_buf()))
            .build();
        let layout = ScanLayout::builder()
            .width(4)
            .lines(3)
            .invert(true)
            .stagger_y(vec![0, 1])
            .build();

        let pipeline = ScanToTiffPipeline::with_custom(MockWriter::new(false), config);
        pipeline.process(&[0; 12], &layout).unwrap();

        let mut stages: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .map(|name| name.splitn(3, '_').nth(2).unwrap().to_string())
            .collect();
        stages.sort();
        assert_eq!(
            stages,
            vec![
                "0_from_source.tiff",
                "3_after_invert.tiff",
                "5_after_format.tiff",
                "8_after_y_unstagger.tiff",
            ]
        );
    }

    #[test]
    fn test_convert_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.raw");
        let output = dir.path().join("scan.tiff");
        std::fs::write(&input, (0..24).collect::<Vec<u8>>()).unwrap();

        let layout = ScanLayout::builder().width(4).lines(2).channels(3).build();
        let pipeline = ScanToTiffPipeline::new(ConversionConfig::default());
        pipeline.convert_file(&input, &layout, &output).unwrap();

        let file = std::fs::File::open(&output).unwrap();
        let mut decoder = tiff::decoder::Decoder::new(file).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (4, 2));
        assert_eq!(decoder.colortype().unwrap(), tiff::ColorType::RGB(8));
    }

    #[test]
    fn test_convert_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ScanToTiffPipeline::new(ConversionConfig::default());

        let result = pipeline.convert_file(
            dir.path().join("missing.raw"),
            &gray_layout(4, 2),
            dir.path().join("out.tiff"),
        );
        assert!(matches!(result.unwrap_err(), PipelineError::InputReadError(_)));
    }

    #[test]
    fn test_pipeline_reader_arbitrary_reads() {
        let mut stack = ImagePipelineStack::new();
        stack
            .push_first_node(ArraySource::new(4, 2, PixelFormat::I8, (0..8).collect()).unwrap())
            .unwrap();

        let mut reader = PipelineReader::new(stack).unwrap();
        assert_eq!(reader.row_bytes(), 4);
        assert_eq!(reader.remaining_bytes(), 8);

        let mut first = [0u8; 3];
        reader.read_data(&mut first).unwrap();
        assert_eq!(first, [0, 1, 2]);

        let mut second = [0u8; 5];
        reader.read_data(&mut second).unwrap();
        assert_eq!(second, [3, 4, 5, 6, 7]);
        assert_eq!(reader.remaining_bytes(), 0);

        let mut past_end = [0u8; 1];
        assert!(matches!(
            reader.read_data(&mut past_end).unwrap_err(),
            PipelineError::ReadFailed(_)
        ));
    }

    #[test]
    fn test_pipeline_reader_reports_source_failure() {
        let config = ConversionConfig::default();
        let stack = build_image_pipeline(&gray_layout(4, 2), &config, |_, _| false).unwrap();
        let mut reader = PipelineReader::new(stack).unwrap();

        let mut out = [0u8; 4];
        match reader.read_data(&mut out).unwrap_err() {
            PipelineError::ReadFailed(cause) => assert!(cause.contains("Source read failed")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_config_update() {
        let mut pipeline = ScanToTiffPipeline::new(ConversionConfig::default());
        assert!(pipeline.config().validate_dimensions);

        pipeline.set_config(ConversionConfig::builder().validate_dimensions(false).build());
        assert!(!pipeline.config().validate_dimensions);
    }
}
