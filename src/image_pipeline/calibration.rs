//! Shading reference statistics
//!
//! Black and white shading references are derived from several scan lines of a calibration
//! target. Each column is reduced to a single value with an approximate percentile so that dust
//! and sensor noise on individual lines do not leak into the reference.

use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::image::Image;
use crate::image_pipeline::pixel::get_raw_channel_from_row;

/// Computes a per-column percentile of `line_count` lines of `elements_per_line` values each.
///
/// `data` holds the lines one after another. `result[i]` receives the value of column `i` at
/// rank `floor(line_count * percentile)`, clamped to the last rank, so a percentile of 0 gives
/// the column minimum and 1 gives the column maximum. Values between those are order
/// statistics of the column and are non-decreasing in `percentile`.
pub fn compute_array_percentile_approx<T: Copy + Ord>(
    result: &mut [T],
    data: &[T],
    line_count: usize,
    elements_per_line: usize,
    percentile: f32,
) -> Result<()> {
    if line_count == 0 {
        return Err(PipelineError::InvalidArgument("line_count must not be zero".to_string()));
    }
    if elements_per_line == 0 {
        return Err(PipelineError::InvalidArgument(
            "elements_per_line must not be zero".to_string(),
        ));
    }
    if data.len() < line_count * elements_per_line || result.len() < elements_per_line {
        return Err(PipelineError::InvalidArgument(format!(
            "{} lines of {} elements do not fit data of {} and result of {}",
            line_count,
            elements_per_line,
            data.len(),
            result.len()
        )));
    }

    if line_count == 1 {
        result[..elements_per_line].copy_from_slice(&data[..elements_per_line]);
        return Ok(());
    }

    let percentile = percentile.clamp(0.0, 1.0);
    let select_elem = ((line_count as f32 * percentile) as usize).min(line_count - 1);

    let mut column = Vec::with_capacity(line_count);
    for (x, out) in result.iter_mut().take(elements_per_line).enumerate() {
        column.clear();
        column.extend(data.iter().skip(x).step_by(elements_per_line).take(line_count));
        let (_, value, _) = column.select_nth_unstable(select_elem);
        *out = *value;
    }
    Ok(())
}

/// Reduces a 16-bit calibration scan to one reference value per sample.
///
/// The returned vector is indexed per sample (`x * channels + channel`) and starts with
/// `start_offset` zeroed pixels, matching the layout the calibrate node expects.
pub fn compute_shading_reference(image: &Image, start_offset: usize, percentile: f32) -> Result<Vec<u16>> {
    let format = image.format();
    if format.depth() != 16 {
        return Err(PipelineError::UnsupportedFormat(format!(
            "shading reference from {:?} data",
            format
        )));
    }

    let channels = format.channels();
    let samples_per_line = image.width() * channels;

    let mut samples = Vec::with_capacity(samples_per_line * image.height());
    for y in 0..image.height() {
        let row = image.row(y);
        for x in 0..image.width() {
            for channel in 0..channels {
                samples.push(get_raw_channel_from_row(row, x, channel, format));
            }
        }
    }

    let offset = start_offset * channels;
    let mut reference = vec![0u16; offset + samples_per_line];
    compute_array_percentile_approx(
        &mut reference[offset..],
        &samples,
        image.height(),
        samples_per_line,
        percentile,
    )?;

    debug!(
        lines = image.height(),
        samples = samples_per_line,
        percentile,
        "Computed shading reference"
    );
    Ok(reference)
}
