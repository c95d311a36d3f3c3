use super::ImageCodec;
use crate::models::TargetFormat;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Codec double that writes a filler output sized as a fraction of the input.
#[derive(Clone)]
pub struct MockImageCodec {
    call_count: Arc<Mutex<usize>>,
    output_ratio: f64,
    failing_files: Arc<Mutex<HashSet<String>>>,
}

impl MockImageCodec {
    pub fn new() -> Self {
        Self {
            call_count: Arc::new(Mutex::new(0)),
            output_ratio: 0.5,
            failing_files: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_output_ratio(mut self, ratio: f64) -> Self {
        self.output_ratio = ratio;
        self
    }

    /// Fail every conversion whose input file name equals `name`.
    pub fn with_failure_for(self, name: &str) -> Self {
        self.failing_files.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageCodec for MockImageCodec {
    async fn convert(&self, input: &Path, output: &Path, _target: TargetFormat) -> Result<()> {
        *self.call_count.lock().unwrap() += 1;

        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_files.lock().unwrap().contains(&name) {
            return Err(crate::Error::Image(image::ImageError::IoError(
                std::io::Error::other(format!("Mock failure for {}", name)),
            )));
        }

        let input_len = tokio::fs::metadata(input).await?.len();
        let output_len = (input_len as f64 * self.output_ratio) as usize;
        tokio::fs::write(output, vec![0u8; output_len]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mock_writes_scaled_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.jpg");
        std::fs::write(&input, vec![1u8; 1000]).unwrap();
        let output = dir.path().join("a.webp");

        let codec = MockImageCodec::new();
        codec
            .convert(&input, &output, TargetFormat::WebP)
            .await
            .unwrap();

        assert_eq!(std::fs::metadata(&output).unwrap().len(), 500);
        assert_eq!(codec.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_custom_ratio() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("b.png");
        std::fs::write(&input, vec![1u8; 400]).unwrap();
        let output = dir.path().join("b.webp");

        MockImageCodec::new()
            .with_output_ratio(0.25)
            .convert(&input, &output, TargetFormat::WebP)
            .await
            .unwrap();

        assert_eq!(std::fs::metadata(&output).unwrap().len(), 100);
    }

    #[tokio::test]
    async fn test_mock_with_failure() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("bad.png");
        std::fs::write(&input, b"data").unwrap();
        let output = dir.path().join("bad.webp");

        let codec = MockImageCodec::new().with_failure_for("bad.png");
        let result = codec.convert(&input, &output, TargetFormat::WebP).await;

        assert!(result.is_err());
        assert!(!output.exists());
        assert_eq!(codec.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_clones_share_call_count() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("c.jpg");
        std::fs::write(&input, b"abcd").unwrap();

        let codec = MockImageCodec::new();
        let probe = codec.clone();
        codec
            .convert(&input, &dir.path().join("c.webp"), TargetFormat::WebP)
            .await
            .unwrap();

        assert_eq!(probe.get_call_count(), 1);
    }
}
