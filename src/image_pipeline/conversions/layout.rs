//! Scan layout description and pipeline assembly

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::utilities::align_multiple_ceil;
use crate::image_pipeline::nodes::{
    BufferedCallableSource, Calibrate, ComponentShiftLines, DebugDump, Desegment, FormatConvert,
    Invert, MergeMonoLines, PixelShiftColumns, PixelShiftLines, ScaleRows, Swap16BitEndian,
};
use crate::image_pipeline::pixel::{ColorOrder, PixelFormat, create_pixel_format};
use crate::image_pipeline::stack::ImagePipelineStack;
use crate::image_pipeline::tiff::ConversionConfig;

static PIPELINE_INDEX: AtomicUsize = AtomicUsize::new(0);

/// Black and white shading references for host-side calibration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadingReference {
    /// Full-scale 16-bit black level per sample
    pub bottom: Vec<u16>,
    /// Full-scale 16-bit white level per sample
    pub top: Vec<u16>,
    /// Index of the reference sample that lines up with the first sample of a row
    pub x_start: usize,
}

/// Physical layout of the data a scanner delivers for one scan
#[derive(Debug, Clone)]
pub struct ScanLayout {
    /// Pixels per raw line as delivered by the transport
    pub width: usize,
    /// Raw lines delivered. CIS color scans deliver one line per color.
    pub lines: usize,
    /// Bits per sample: 1, 8 or 16
    pub depth: usize,
    /// Channels of the final image: 1 or 3
    pub channels: usize,
    /// Order in which the sensor delivers color samples or color lines
    pub color_order: ColorOrder,
    /// Contact image sensor: color scans arrive as three consecutive mono lines
    pub is_cis: bool,
    /// Physical position of each sensor segment, in output order
    pub segment_order: Vec<usize>,
    /// Pixels covered by one sensor segment
    pub segment_pixels: usize,
    /// 16-bit samples arrive big-endian
    pub swap_16bit: bool,
    /// Sensor reports inverted intensities
    pub invert: bool,
    /// Line delay of the red, green and blue sensor rows
    pub color_shift_lines: [usize; 3],
    /// Column shifts of staggered sensor elements
    pub stagger_x: Vec<usize>,
    /// Line shifts of staggered sensor elements
    pub stagger_y: Vec<usize>,
    pub shading: Option<ShadingReference>,
    /// Pixels per line the client asked for; output rows are rescaled when they differ
    pub requested_pixels: Option<usize>,
}

impl Default for ScanLayout {
    fn default() -> Self {
        Self {
            width: 0,
            lines: 0,
            depth: 8,
            channels: 1,
            color_order: ColorOrder::Rgb,
            is_cis: false,
            segment_order: Vec::new(),
            segment_pixels: 0,
            swap_16bit: false,
            invert: false,
            color_shift_lines: [0; 3],
            stagger_x: Vec::new(),
            stagger_y: Vec::new(),
            shading: None,
            requested_pixels: None,
        }
    }
}

impl ScanLayout {
    pub fn builder() -> ScanLayoutBuilder {
        ScanLayoutBuilder::default()
    }

    /// Format of the rows delivered by the transport
    pub fn raw_format(&self) -> Result<PixelFormat> {
        let channels = if self.is_cis { 1 } else { self.channels };
        create_pixel_format(self.depth, channels, self.color_order)
    }

    pub fn raw_row_bytes(&self) -> Result<usize> {
        Ok(self.raw_format()?.row_bytes(self.width))
    }

    /// Total bytes the transport delivers for the scan
    pub fn raw_size(&self) -> Result<usize> {
        Ok(self.raw_row_bytes()? * self.lines)
    }

    pub fn segment_count(&self) -> usize {
        self.segment_order.len().max(1)
    }
}

/// Builder for ScanLayout
#[derive(Default)]
pub struct ScanLayoutBuilder {
    layout: ScanLayout,
}

impl ScanLayoutBuilder {
    pub fn width(mut self, width: usize) -> Self {
        self.layout.width = width;
        self
    }

    pub fn lines(mut self, lines: usize) -> Self {
        self.layout.lines = lines;
        self
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.layout.depth = depth;
        self
    }

    pub fn channels(mut self, channels: usize) -> Self {
        self.layout.channels = channels;
        self
    }

    pub fn color_order(mut self, order: ColorOrder) -> Self {
        self.layout.color_order = order;
        self
    }

    pub fn cis(mut self, is_cis: bool) -> Self {
        self.layout.is_cis = is_cis;
        self
    }

    pub fn segments(mut self, order: Vec<usize>, segment_pixels: usize) -> Self {
        self.layout.segment_order = order;
        self.layout.segment_pixels = segment_pixels;
        self
    }

    pub fn swap_16bit(mut self, swap: bool) -> Self {
        self.layout.swap_16bit = swap;
        self
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.layout.invert = invert;
        self
    }

    pub fn color_shift_lines(mut self, r: usize, g: usize, b: usize) -> Self {
        self.layout.color_shift_lines = [r, g, b];
        self
    }

    pub fn stagger_x(mut self, shifts: Vec<usize>) -> Self {
        self.layout.stagger_x = shifts;
        self
    }

    pub fn stagger_y(mut self, shifts: Vec<usize>) -> Self {
        self.layout.stagger_y = shifts;
        self
    }

    pub fn shading(mut self, shading: Option<ShadingReference>) -> Self {
        self.layout.shading = shading;
        self
    }

    pub fn requested_pixels(mut self, pixels: Option<usize>) -> Self {
        self.layout.requested_pixels = pixels;
        self
    }

    pub fn build(self) -> ScanLayout {
        self.layout
    }
}

/// Inserts a [`DebugDump`] after a stage when a dump directory is configured
struct StageDumps<'a> {
    dir: Option<&'a Path>,
    prefix: String,
}

impl StageDumps<'_> {
    fn push(&self, stack: &mut ImagePipelineStack, stage: &str) -> Result<()> {
        if let Some(dir) = self.dir {
            let path = dir.join(format!("{}_{}.tiff", self.prefix, stage));
            debug!(path = %path.display(), "Dumping pipeline stage");
            stack.push_node(move |source| Ok(DebugDump::new(source, path)))?;
        }
        Ok(())
    }
}

/// Assembles the node chain that turns the transport data described by `layout` into
/// canonical rows.
///
/// `producer` is called with the number of bytes requested and a buffer of that length, and
/// returns `false` when the transport fails.
pub fn build_image_pipeline<F>(
    layout: &ScanLayout,
    config: &ConversionConfig,
    producer: F,
) -> Result<ImagePipelineStack>
where
    F: FnMut(usize, &mut [u8]) -> bool + 'static,
{
    let format = layout.raw_format()?;
    let index = PIPELINE_INDEX.fetch_add(1, Ordering::Relaxed) + 1;
    let dumps = StageDumps {
        dir: config.debug_dump_dir.as_deref(),
        prefix: format!("pipeline_{}", index),
    };

    let mut stack = ImagePipelineStack::new();

    // some transports fail on reads that are not aligned
    let chunk_size = align_multiple_ceil(config.chunk_size, config.read_alignment);
    let source = BufferedCallableSource::new(layout.width, layout.lines, format, chunk_size, producer)?
        .with_last_read_multiple(config.read_alignment);
    stack.push_first_node(source)?;
    dumps.push(&mut stack, "0_from_source")?;

    if layout.segment_order.len() > 1 {
        let output_width = layout.segment_pixels * layout.segment_order.len();
        let order = layout.segment_order.clone();
        let segment_pixels = layout.segment_pixels;
        stack.push_node(|source| Desegment::new(source, output_width, order, segment_pixels, 1, 1))?;
        dumps.push(&mut stack, "1_after_desegment")?;
    }

    if format.depth() == 16 && layout.swap_16bit {
        stack.push_node(|source| Ok(Swap16BitEndian::new(source)))?;
        dumps.push(&mut stack, "2_after_swap")?;
    }

    if layout.invert {
        stack.push_node(|source| Ok(Invert::new(source)))?;
        dumps.push(&mut stack, "3_after_invert")?;
    }

    if layout.is_cis && layout.channels == 3 {
        let order = layout.color_order;
        stack.push_node(|source| MergeMonoLines::new(source, order))?;
        dumps.push(&mut stack, "4_after_merge_mono")?;
    }

    match stack.get_output_format()? {
        PixelFormat::Bgr888 => {
            stack.push_node(|source| Ok(FormatConvert::new(source, PixelFormat::Rgb888)))?
        }
        PixelFormat::Bgr161616 => {
            stack.push_node(|source| Ok(FormatConvert::new(source, PixelFormat::Rgb161616)))?
        }
        _ => {}
    }
    dumps.push(&mut stack, "5_after_format")?;

    let [shift_r, shift_g, shift_b] = layout.color_shift_lines;
    if shift_r.max(shift_g).max(shift_b) > 0 && layout.channels == 3 {
        stack.push_node(|source| ComponentShiftLines::new(source, shift_r, shift_g, shift_b))?;
        dumps.push(&mut stack, "6_after_color_unshift")?;
    }

    if !layout.stagger_x.is_empty() {
        let shifts = layout.stagger_x.clone();
        stack.push_node(|source| PixelShiftColumns::new(source, shifts))?;
        dumps.push(&mut stack, "7_after_x_unstagger")?;
    }

    if !layout.stagger_y.is_empty() {
        let shifts = layout.stagger_y.clone();
        stack.push_node(|source| PixelShiftLines::new(source, shifts))?;
        dumps.push(&mut stack, "8_after_y_unstagger")?;
    }

    if let Some(shading) = &layout.shading {
        stack.push_node(|source| Calibrate::new(source, &shading.bottom, &shading.top, shading.x_start))?;
        dumps.push(&mut stack, "9_after_calibrate")?;
    }

    if let Some(requested) = layout.requested_pixels {
        if stack.get_output_width()? != requested {
            stack.push_node(|source| ScaleRows::new(source, requested))?;
        }
    }

    info!(
        input_width = stack.get_input_width()?,
        input_height = stack.get_input_height()?,
        output_width = stack.get_output_width()?,
        output_height = stack.get_output_height()?,
        output_format = ?stack.get_output_format()?,
        "Image pipeline built"
    );
    Ok(stack)
}
