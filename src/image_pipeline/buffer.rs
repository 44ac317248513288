//! Buffering module
//!
//! Row-level lookback storage for nodes that combine several physical lines, and a chunked
//! pull buffer that adapts fixed-size transport reads to arbitrary-sized requests.

pub mod row_buffer;
pub mod image_buffer;

pub use row_buffer::RowBuffer;
pub use image_buffer::{ImageBuffer, ProducerCallback};
