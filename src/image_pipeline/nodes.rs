//! Pipeline node module
//!
//! Every stage of the scan pipeline is an [`ImagePipelineNode`] that owns its upstream node and
//! produces one row per pull. Sources sit at the head of the chain; every other node transforms
//! the rows of the node it wraps.

mod node;
mod source;
mod convert;
mod segment;
mod mono;
mod shift;
mod geometry;
mod calibrate;
mod debug;


pub use node::{BoxedNode, ImagePipelineNode};
pub use source::{ArraySource, BufferedCallableSource, CallableSource};
pub use convert::{FormatConvert, Invert, Swap16BitEndian};
pub use segment::{DeinterleaveLines, Desegment};
pub use mono::{MergeMonoLines, SplitMonoLines};
pub use shift::{
    ComponentShiftLines,
    PixelShiftColumns,
    PixelShiftLines,
    compute_pixel_shift_extra_width,
};
pub use geometry::{Extract, ScaleRows};
pub use calibrate::Calibrate;
pub use debug::DebugDump;
