use super::ImageCodec;
use crate::models::TargetFormat;
use crate::{Error, Result};
use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

/// Converts files with the `image` crate. WebP output is lossless.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    fn transcode_sync(data: Vec<u8>, target: TargetFormat) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(&data)?;

        // JPEG has no alpha channel; the WebP encoder only takes 8-bit RGB(A).
        let prepared = match target {
            TargetFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
            TargetFormat::WebP | TargetFormat::Png => DynamicImage::ImageRgba8(decoded.to_rgba8()),
        };

        let mut encoded = Vec::new();
        prepared.write_to(&mut Cursor::new(&mut encoded), target.image_format())?;
        Ok(encoded)
    }

    async fn transcode(&self, data: Vec<u8>, target: TargetFormat) -> Result<Vec<u8>> {
        tokio::task::spawn_blocking(move || Self::transcode_sync(data, target))
            .await
            .map_err(|e| Error::Invariant(format!("Image processing task join error: {}", e)))?
    }
}

#[async_trait]
impl ImageCodec for ImageProcessor {
    async fn convert(&self, input: &Path, output: &Path, target: TargetFormat) -> Result<()> {
        let data = tokio::fs::read(input).await?;
        let encoded = self.transcode(data, target).await?;
        tokio::fs::write(output, &encoded).await?;
        tracing::debug!(
            "Encoded {} as {} ({} bytes)",
            input.display(),
            target,
            encoded.len()
        );
        Ok(())
    }
}
