use tracing::{info, instrument};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{PipelineError, Result},
    conversions::layout::{ScanLayout, build_image_pipeline},
    image::Image,
    tiff::{TiffWriter, StandardTiffWriter, ConversionConfig},
};

/// Replays `data` to the pipeline the way a transport would.
///
/// Requests past the end of the data that still overlap it are zero-padded, which covers the
/// aligned final read. Requests starting past the end fail.
fn replay_producer(data: Vec<u8>) -> impl FnMut(usize, &mut [u8]) -> bool + 'static {
    let mut offset = 0;
    move |size, out| {
        if offset >= data.len() {
            return false;
        }
        let bytes_copy = (data.len() - offset).min(size);
        out[..bytes_copy].copy_from_slice(&data[offset..offset + bytes_copy]);
        out[bytes_copy..].fill(0);
        offset += bytes_copy;
        true
    }
}

pub struct ScanToTiffPipeline<W: TiffWriter> {
    writer: W,
    config: ConversionConfig,
}

impl ScanToTiffPipeline<StandardTiffWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            writer: StandardTiffWriter,
            config,
        }
    }
}

impl<W: TiffWriter> ScanToTiffPipeline<W> {
    pub fn with_custom(writer: W, config: ConversionConfig) -> Self {
        Self {
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    /// Runs raw scanner data through the pipeline for `layout` and returns the final image
    #[instrument(skip(self, raw_data, layout), fields(input_size = raw_data.len()))]
    pub fn process(&self, raw_data: &[u8], layout: &ScanLayout) -> Result<Image> {
        let expected = layout.raw_size()?;
        if raw_data.len() < expected {
            return Err(PipelineError::InvalidArgument(format!(
                "scan data has {} bytes, layout needs {}",
                raw_data.len(),
                expected
            )));
        }

        let mut stack = {
            let _span = tracing::info_span!("build_pipeline").entered();
            build_image_pipeline(layout, &self.config, replay_producer(raw_data.to_vec()))?
        };

        let _span = tracing::info_span!("run_pipeline").entered();
        stack.get_image()
    }

    #[instrument(skip(self, raw_data, layout, output), fields(input_size = raw_data.len()))]
    pub fn convert(&self, raw_data: &[u8], layout: &ScanLayout, output: &mut dyn Write) -> Result<()> {
        info!("Starting scan to TIFF conversion");

        let image = self.process(raw_data, layout)?;

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = image.width(),
                height = image.height()
            ).entered();
            self.validate_dimensions(image.width(), image.height())?;
        }

        {
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_tiff(&image, output, &self.config)?;
        }

        info!(
            width = image.width(),
            height = image.height(),
            format = ?image.format(),
            "Conversion complete"
        );
        Ok(())
    }

    #[instrument(skip(self, input_path, layout, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        layout: &ScanLayout,
        output_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                PipelineError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                PipelineError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };

        self.convert(&input_data, layout, &mut output_file)?;

        Ok(())
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
