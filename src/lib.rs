//! Batch image converter - turns the JPEG and PNG files in a directory into
//! WebP and reports how much space the conversion saved.
//!
//! The pipeline is plain library code: callers hand it a directory and an
//! [`ImageCodec`](crate::image::ImageCodec), and get back a
//! [`models::RunOutcome`]. Prompting and progress display live in the binary.

pub mod error;
pub mod image;
pub mod models;
pub mod pipeline;
pub mod summary;

pub use error::{Error, Result};
pub use pipeline::ConversionPipeline;
