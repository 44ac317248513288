//! Pixel model module
//!
//! This module describes the binary pixel encodings a scanner can deliver and provides the
//! row codec that reads and writes individual pixels, raw pixels and raw channels inside a
//! packed byte row.

pub mod format;
pub mod types;
pub mod row;

pub use format::{
    ColorOrder,
    PixelFormat,
    create_pixel_format,
    get_pixel_row_bytes,
    get_pixels_from_row_bytes,
};
pub use types::{Pixel, RawPixel};
pub use row::{
    convert_pixel_row_format,
    get_pixel_from_row,
    get_raw_channel_from_row,
    get_raw_pixel_from_row,
    set_pixel_to_row,
    set_raw_channel_to_row,
    set_raw_pixel_to_row,
};
