//! Utility types shared by the record model, resolver and exporters.
//!
//! - [`ElementType`] - Element types of side-car buffers
//! - [`Dimensions`] - Declared array shapes
//! - [`Error`] / [`Result`] - Error handling

mod pod;
mod error;
mod dimensions;

pub use pod::*;
pub use error::*;
pub use dimensions::*;
