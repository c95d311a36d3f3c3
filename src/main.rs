use anyhow::Result;
use clap::Parser;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webp_converter::image::ImageProcessor;
use webp_converter::models::{Config, RunOutcome};
use webp_converter::summary::{summary_entries, Tone};
use webp_converter::ConversionPipeline;

#[derive(Debug, Parser)]
#[command(name = "webp-converter")]
#[command(about = "Convert JPG, JPEG, and PNG images in a directory to WebP")]
struct CliArgs {
    /// Directory containing the images. Prompted for when omitted.
    #[arg(value_name = "DIRECTORY")]
    directory: Option<PathBuf>,

    /// Print the batch report as JSON instead of a text summary.
    #[arg(long)]
    json: bool,
}

fn prompt_directory() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    println!("Current directory: {}", cwd.display());
    let input: String = Input::new().with_prompt("Path to images").interact_text()?;
    Ok(PathBuf::from(input.trim()))
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Processing images...");
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webp_converter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let directory = match args.directory {
        Some(dir) => dir,
        None => prompt_directory()?,
    };

    info!("Starting conversion in {}", directory.display());

    let pipeline = ConversionPipeline::new(Box::new(ImageProcessor::new()), config);
    info!("Target format: {}", pipeline.config().target_format);
    let pb = spinner();

    let outcome = pipeline
        .run_with_progress(&directory, |candidate| {
            pb.set_message(format!("Processing {}...", candidate.name));
        })
        .await;

    match outcome {
        Ok(RunOutcome::NoCandidates) => {
            pb.abandon_with_message("No images found to convert.");
            Ok(())
        }
        Ok(RunOutcome::Completed(report)) => {
            if report.failures.is_empty() {
                pb.finish_with_message("All images have been converted.");
            } else {
                pb.finish_with_message(format!(
                    "Finished with {} failure(s).",
                    report.failures.len()
                ));
            }

            if args.json {
                println!("{}", report.to_json()?);
            } else {
                for (tone, line) in summary_entries(&report) {
                    let styled = match tone {
                        Tone::Plain => style(line),
                        Tone::Original => style(line).red(),
                        Tone::Converted => style(line).green(),
                        Tone::Saved => style(line).white().bold(),
                        Tone::Problem => style(line).yellow(),
                    };
                    println!("{}", styled);
                }
            }
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message(format!("Error reading directory: {}", e));
            error!("Conversion aborted: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_cli_directory_argument() {
        let args = CliArgs::try_parse_from(["webp-converter", "./photos", "--json"]).unwrap();
        assert_eq!(args.directory, Some(PathBuf::from("./photos")));
        assert!(args.json);
    }

    #[test]
    fn test_cli_directory_is_optional() {
        let args = CliArgs::try_parse_from(["webp-converter"]).unwrap();
        assert!(args.directory.is_none());
        assert!(!args.json);
    }
}
