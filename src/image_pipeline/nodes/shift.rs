//! Compensation for sensor elements that are offset along either scan axis

use super::node::{BoxedNode, ImagePipelineNode};
use crate::image_pipeline::buffer::RowBuffer;
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pixel::{
    ColorOrder, PixelFormat, get_raw_channel_from_row, get_raw_pixel_from_row,
    set_raw_channel_to_row, set_raw_pixel_to_row,
};

/// Drops the front row (if any) and refills `buffer` up to `rows` rows from `source`
fn advance_lookahead(source: &mut BoxedNode, buffer: &mut RowBuffer, rows: usize) -> Result<()> {
    if !buffer.empty() {
        buffer.pop_front();
    }
    while buffer.height() < rows {
        buffer.push_back();
        source.get_next_row_data(buffer.get_back_row_ptr())?;
    }
    Ok(())
}

/// Reads each color channel from a row further down the scan, by per-channel line counts
pub struct ComponentShiftLines {
    source: BoxedNode,
    extra_height: usize,
    channel_shifts: [usize; 3],
    buffer: RowBuffer,
}

impl ComponentShiftLines {
    pub fn new(source: BoxedNode, shift_r: usize, shift_g: usize, shift_b: usize) -> Result<Self> {
        let format = source.get_format();
        if format.channels() != 3 {
            return Err(PipelineError::UnsupportedFormat(format!(
                "component shift requires a three-channel format, got {:?}",
                format
            )));
        }

        // shifts are kept in storage order
        let channel_shifts = match format.color_order() {
            ColorOrder::Rgb => [shift_r, shift_g, shift_b],
            ColorOrder::Bgr => [shift_b, shift_g, shift_r],
        };
        let extra_height = shift_r.max(shift_g).max(shift_b);
        let buffer = RowBuffer::new(source.get_row_bytes());

        Ok(Self {
            source,
            extra_height,
            channel_shifts,
            buffer,
        })
    }
}

impl ImagePipelineNode for ComponentShiftLines {
    fn get_width(&self) -> usize {
        self.source.get_width()
    }

    fn get_height(&self) -> usize {
        self.source.get_height().saturating_sub(self.extra_height)
    }

    fn get_format(&self) -> PixelFormat {
        self.source.get_format()
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        advance_lookahead(&mut self.source, &mut self.buffer, self.extra_height + 1)?;

        let format = self.get_format();
        let rows = self.channel_shifts.map(|shift| self.buffer.get_row(shift));
        for x in 0..self.get_width() {
            for (channel, row) in rows.iter().enumerate() {
                let value = get_raw_channel_from_row(row, x, channel, format);
                set_raw_channel_to_row(out_data, x, channel, value, format);
            }
        }
        Ok(())
    }
}

/// Reassembles rows whose pixels were sampled by several staggered sensor rows.
///
/// Pixel `x` of an output row is read from the row `shifts[x % shifts.len()]` lines further
/// down. Shifts are taken relative to the smallest one.
pub struct PixelShiftLines {
    source: BoxedNode,
    extra_height: usize,
    pixel_shifts: Vec<usize>,
    buffer: RowBuffer,
}

impl PixelShiftLines {
    pub fn new(source: BoxedNode, shifts: Vec<usize>) -> Result<Self> {
        let Some(&min_shift) = shifts.iter().min() else {
            return Err(PipelineError::InvalidArgument(
                "pixel shift lines requires at least one shift".to_string(),
            ));
        };
        let pixel_shifts: Vec<usize> = shifts.iter().map(|shift| shift - min_shift).collect();
        let extra_height = pixel_shifts.iter().copied().max().unwrap_or(0);
        let buffer = RowBuffer::new(source.get_row_bytes());

        Ok(Self {
            source,
            extra_height,
            pixel_shifts,
            buffer,
        })
    }
}

impl ImagePipelineNode for PixelShiftLines {
    fn get_width(&self) -> usize {
        self.source.get_width()
    }

    fn get_height(&self) -> usize {
        self.source.get_height().saturating_sub(self.extra_height)
    }

    fn get_format(&self) -> PixelFormat {
        self.source.get_format()
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        advance_lookahead(&mut self.source, &mut self.buffer, self.extra_height + 1)?;

        let format = self.get_format();
        let shift_count = self.pixel_shifts.len();
        for x in 0..self.get_width() {
            let row = self.buffer.get_row(self.pixel_shifts[x % shift_count]);
            let pixel = get_raw_pixel_from_row(row, x, format);
            set_raw_pixel_to_row(out_data, x, pixel, format);
        }
        Ok(())
    }
}

/// Number of columns that must be dropped from a row of `source_width` pixels so that every
/// read of [`PixelShiftColumns`] with the given shifts stays inside the row
pub fn compute_pixel_shift_extra_width(source_width: usize, shifts: &[usize]) -> usize {
    let group_size = shifts.len() as i64;
    if group_size == 0 {
        return 0;
    }
    let non_filled_group = source_width as i64 % group_size;
    let mut extra_width = 0i64;

    for (i, &shift) in shifts.iter().enumerate() {
        let shift = shift as i64;
        let mut shift_groups = shift / group_size;
        let shift_rem = shift % group_size;

        if shift_rem < non_filled_group {
            shift_groups -= 1;
        }
        extra_width = extra_width.max(shift_groups * group_size + non_filled_group - i as i64);
    }
    extra_width as usize
}

/// Reorders columns within groups of `shifts.len()` pixels: output column `x + i` of the
/// group starting at `x` is read from source column `x + shifts[i]`.
pub struct PixelShiftColumns {
    source: BoxedNode,
    width: usize,
    pixel_shifts: Vec<usize>,
    buffer: Vec<u8>,
}

impl PixelShiftColumns {
    pub fn new(source: BoxedNode, shifts: Vec<usize>) -> Result<Self> {
        if shifts.is_empty() {
            return Err(PipelineError::InvalidArgument(
                "pixel shift columns requires at least one shift".to_string(),
            ));
        }

        let source_width = source.get_width();
        let extra_width = compute_pixel_shift_extra_width(source_width, &shifts);
        let width = source_width.saturating_sub(extra_width);
        if width == 0 {
            return Err(PipelineError::InvalidDimensions(width, source.get_height()));
        }

        let group_size = shifts.len();
        for (i, &shift) in shifts.iter().enumerate().take(width) {
            let last_group_start = (width - 1 - i) / group_size * group_size;
            if last_group_start + shift >= source_width {
                return Err(PipelineError::InvalidArgument(format!(
                    "shift {} reads column {} of a {}-pixel row",
                    shift,
                    last_group_start + shift,
                    source_width
                )));
            }
        }

        let buffer = vec![0; source.get_row_bytes()];
        Ok(Self {
            source,
            width,
            pixel_shifts: shifts,
            buffer,
        })
    }
}

impl ImagePipelineNode for PixelShiftColumns {
    fn get_width(&self) -> usize {
        self.width
    }

    fn get_height(&self) -> usize {
        self.source.get_height()
    }

    fn get_format(&self) -> PixelFormat {
        self.source.get_format()
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn get_next_row_data(&mut self, out_data: &mut [u8]) -> Result<()> {
        self.source.get_next_row_data(&mut self.buffer)?;

        let format = self.get_format();
        let group_size = self.pixel_shifts.len();
        for x in (0..self.width).step_by(group_size) {
            for (i, &shift) in self.pixel_shifts.iter().enumerate() {
                if x + i >= self.width {
                    break;
                }
                let pixel = get_raw_pixel_from_row(&self.buffer, x + shift, format);
                set_raw_pixel_to_row(out_data, x + i, pixel, format);
            }
        }
        Ok(())
    }
}
