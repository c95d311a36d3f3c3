//! Data models and structures
//!
//! Defines the configuration, candidate files, per-file conversion results
//! and the aggregate batch report produced by a pipeline run.

use image::ImageFormat;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    WebP,
    Png,
    Jpeg,
}

impl TargetFormat {
    /// File extension written for converted outputs, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::WebP => "webp",
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpg",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            TargetFormat::WebP => ImageFormat::WebP,
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "webp" => Ok(TargetFormat::WebP),
            "png" => Ok(TargetFormat::Png),
            "jpg" | "jpeg" => Ok(TargetFormat::Jpeg),
            other => Err(crate::Error::Config(format!(
                "Unsupported target format '{}'. Expected one of: webp, png, jpeg",
                other
            ))),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Lowercase extensions (no leading dot) that make a file a candidate.
    pub accepted_extensions: BTreeSet<String>,
    pub target_format: TargetFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accepted_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            target_format: TargetFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        match dotenvy::dotenv() {
            Err(e) if !e.not_found() => return Err(e.into()),
            _ => {}
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(format) = lookup("CONVERTER_TARGET_FORMAT") {
            config.target_format = format.parse()?;
        }

        if let Some(list) = lookup("CONVERTER_EXTENSIONS") {
            let extensions = parse_extensions(&list);
            if extensions.is_empty() {
                return Err(crate::Error::Config(
                    "CONVERTER_EXTENSIONS must name at least one extension".to_string(),
                ));
            }
            config.accepted_extensions = extensions;
        }

        Ok(config)
    }

    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.accepted_extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

fn parse_extensions(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A directory entry eligible for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl CandidateFile {
    pub fn new(input_path: PathBuf, target: TargetFormat) -> Self {
        let name = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_path = input_path.with_extension(target.extension());
        Self {
            name,
            input_path,
            output_path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    StatFailed,
    StaleOutputDeleteFailed,
    ConversionFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::StatFailed => "could not read file size",
            FailureKind::StaleOutputDeleteFailed => "could not remove stale output",
            FailureKind::ConversionFailed => "conversion failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionResult {
    Converted { original_bytes: u64, new_bytes: u64 },
    Skipped { reason: String },
    Failed { kind: FailureKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub target_format: TargetFormat,
    pub candidate_count: usize,
    pub converted_count: usize,
    pub total_original_bytes: u64,
    pub total_new_bytes: u64,
    pub skipped: Vec<SkippedFile>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn new(target_format: TargetFormat, candidate_count: usize) -> Self {
        Self {
            target_format,
            candidate_count,
            ..Self::default()
        }
    }

    pub fn record(&mut self, candidate: &CandidateFile, result: ConversionResult) {
        match result {
            ConversionResult::Converted {
                original_bytes,
                new_bytes,
            } => {
                self.converted_count += 1;
                self.total_original_bytes += original_bytes;
                self.total_new_bytes += new_bytes;
            }
            ConversionResult::Skipped { reason } => self.skipped.push(SkippedFile {
                path: candidate.input_path.clone(),
                reason,
            }),
            ConversionResult::Failed { kind, message } => self.failures.push(FileFailure {
                path: candidate.input_path.clone(),
                kind,
                message,
            }),
        }
    }

    /// Bytes saved across converted files. Negative when outputs grew.
    pub fn bytes_saved(&self) -> i64 {
        self.total_original_bytes as i64 - self.total_new_bytes as i64
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Percentage of the original size saved; 0.0 when nothing was converted.
    pub fn percent_saved(&self) -> f64 {
        if self.total_original_bytes == 0 {
            return 0.0;
        }
        self.bytes_saved() as f64 / self.total_original_bytes as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    NoCandidates,
    Completed(BatchReport),
}

impl RunOutcome {
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            RunOutcome::NoCandidates => None,
            RunOutcome::Completed(report) => Some(report),
        }
    }
}
