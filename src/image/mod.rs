//! Image decoding and format conversion
//!
//! The pipeline treats the codec as an opaque collaborator: it hands over an
//! input path and receives either a written output file or an error.

pub mod mock;
pub mod processor;

pub use mock::MockImageCodec;
pub use processor::ImageProcessor;

use crate::models::TargetFormat;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait ImageCodec: Send + Sync {
    /// Decode `input` and write it re-encoded as `target` to `output`.
    async fn convert(&self, input: &Path, output: &Path, target: TargetFormat) -> Result<()>;
}
