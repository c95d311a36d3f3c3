//! Directory scan and batch conversion.

use crate::image::ImageCodec;
use crate::models::{
    BatchReport, CandidateFile, Config, ConversionResult, FailureKind, RunOutcome,
};
use crate::{Error, Result};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Converts every accepted image directly inside a directory, one at a time.
pub struct ConversionPipeline {
    codec: Box<dyn ImageCodec>,
    config: Config,
}

impl ConversionPipeline {
    pub fn new(codec: Box<dyn ImageCodec>, config: Config) -> Self {
        Self { codec, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List candidate files in `dir`, sorted by file name.
    ///
    /// Any error while listing the directory aborts the scan with
    /// [`Error::DirectoryUnavailable`]; no partial listing is returned.
    pub async fn scan(&self, dir: &Path) -> Result<Vec<CandidateFile>> {
        let unavailable = |source: std::io::Error| Error::DirectoryUnavailable {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(unavailable)?;
        let mut paths: Vec<PathBuf> = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            if !self.config.accepts(&path) {
                continue;
            }
            // Follows symlinks; directories and dangling links are not candidates.
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => paths.push(path),
                Ok(_) => debug!("Ignoring non-file entry {}", path.display()),
                Err(e) => debug!("Ignoring unreadable entry {}: {}", path.display(), e),
            }
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Found {} candidate(s) in {}", paths.len(), dir.display());

        Ok(paths
            .into_iter()
            .map(|path| CandidateFile::new(path, self.config.target_format))
            .collect())
    }

    /// Convert a single candidate. Never fails the batch: every problem is
    /// folded into the returned [`ConversionResult`].
    pub async fn convert_one(&self, candidate: &CandidateFile) -> ConversionResult {
        let target = self.config.target_format;

        if writes_over_input(&candidate.input_path, target.extension()) {
            return ConversionResult::Skipped {
                reason: format!("already a .{} file", target.extension()),
            };
        }

        let original_bytes = match tokio::fs::metadata(&candidate.input_path).await {
            Ok(meta) => meta.len(),
            Err(e) => return failed(FailureKind::StatFailed, &candidate.input_path, e),
        };

        match tokio::fs::remove_file(&candidate.output_path).await {
            Ok(()) => debug!("Removed stale output {}", candidate.output_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return failed(
                    FailureKind::StaleOutputDeleteFailed,
                    &candidate.output_path,
                    e,
                )
            }
        }

        if let Err(e) = self
            .codec
            .convert(&candidate.input_path, &candidate.output_path, target)
            .await
        {
            return failed(FailureKind::ConversionFailed, &candidate.input_path, e);
        }

        match tokio::fs::metadata(&candidate.output_path).await {
            Ok(meta) => ConversionResult::Converted {
                original_bytes,
                new_bytes: meta.len(),
            },
            Err(e) => failed(FailureKind::StatFailed, &candidate.output_path, e),
        }
    }

    pub async fn run(&self, dir: &Path) -> Result<RunOutcome> {
        self.run_with_progress(dir, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_file` before each candidate.
    pub async fn run_with_progress<F>(&self, dir: &Path, mut on_file: F) -> Result<RunOutcome>
    where
        F: FnMut(&CandidateFile),
    {
        let candidates = self.scan(dir).await?;
        if candidates.is_empty() {
            info!("No images found in {}", dir.display());
            return Ok(RunOutcome::NoCandidates);
        }

        info!(
            "Converting {} image(s) in {} to {}",
            candidates.len(),
            dir.display(),
            self.config.target_format
        );

        let mut report = BatchReport::new(self.config.target_format, candidates.len());
        let sources: HashSet<String> = candidates
            .iter()
            .map(|c| path_key(&c.input_path))
            .collect();
        let mut outputs: HashSet<&Path> = HashSet::new();

        for candidate in &candidates {
            on_file(candidate);

            // Another source image may live at the derived output path; the
            // pre-clean step would delete it.
            let result = if sources.contains(&path_key(&candidate.output_path)) {
                ConversionResult::Skipped {
                    reason: format!(
                        "output {} would overwrite a source image",
                        candidate.output_path.display()
                    ),
                }
            } else {
                if !outputs.insert(candidate.output_path.as_path()) {
                    warn!(
                        "{} overwrites an output produced earlier in this run: {}",
                        candidate.name,
                        candidate.output_path.display()
                    );
                }
                self.convert_one(candidate).await
            };
            match &result {
                ConversionResult::Converted {
                    original_bytes,
                    new_bytes,
                } => info!(
                    "Converted {} ({} -> {} bytes)",
                    candidate.name, original_bytes, new_bytes
                ),
                ConversionResult::Skipped { reason } => {
                    warn!("Skipped {}: {}", candidate.name, reason)
                }
                ConversionResult::Failed { kind, message } => {
                    warn!("Failed {}: {}: {}", candidate.name, kind, message)
                }
            }
            report.record(candidate, result);
        }

        info!(
            "Converted {}/{} image(s), {} failure(s)",
            report.converted_count,
            report.candidate_count,
            report.failures.len()
        );
        Ok(RunOutcome::Completed(report))
    }
}

fn writes_over_input(input: &Path, target_extension: &str) -> bool {
    input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(target_extension))
        .unwrap_or(false)
}

/// Case-folded so that `a.JPG` and `a.jpg` collide, as they do on
/// case-insensitive filesystems.
fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

fn failed(kind: FailureKind, path: &Path, err: impl std::fmt::Display) -> ConversionResult {
    ConversionResult::Failed {
        kind,
        message: format!("{}: {}", path.display(), err),
    }
}
