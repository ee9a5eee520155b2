//! rawtiff - Inspect TIFF/DNG camera raw files and raw image sequences.
//!
//! This binary parses the CLI, sets up logging and prints reports.

use clap::Parser;
use serde::Serialize;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rawtiff::{
    config::{Cli, Command, CopyConfig, DirsConfig, FooterConfig, InfoConfig, OutputFormat},
    detect_format, DirectorySummary, FileFormat, RawFooterReader, SeekReader, TiffFile,
};

type CommandResult = Result<(), Box<dyn Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.command.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::Info(config) => run_info(&config, cli.format),
        Command::Footer(config) => run_footer(&config, cli.format),
        Command::Dirs(config) => run_dirs(&config, cli.format),
        Command::Copy(config) => run_copy(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so reports on stdout stay machine-readable.
fn init_logging(verbose: bool) {
    let env_filter = if verbose { "rawtiff=debug" } else { "rawtiff=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: &InfoConfig, format: OutputFormat) -> CommandResult {
    let mut reader = SeekReader::open(&config.path)?;
    let detected = detect_format(&mut reader)?;
    info!("{}: {}", config.path.display(), detected.name());

    match detected {
        FileFormat::Tiff => {
            drop(reader);
            let dirs = DirsConfig {
                path: config.path.clone(),
                cfa_only: false,
            };
            run_dirs(&dirs, format)
        }
        FileFormat::RawSequence => {
            let mut footer = RawFooterReader::new(reader)?;
            print_footer(&mut footer, None, format)
        }
    }
}

// =============================================================================
// Footer Command
// =============================================================================

fn run_footer(config: &FooterConfig, format: OutputFormat) -> CommandResult {
    let mut footer = RawFooterReader::open(&config.path)?;
    print_footer(&mut footer, config.frame, format)
}

#[derive(Serialize)]
struct FrameRange {
    index: u32,
    start: u64,
    end: u64,
}

fn print_footer(
    footer: &mut RawFooterReader,
    frame: Option<u32>,
    format: OutputFormat,
) -> CommandResult {
    let report = footer.info()?;
    let frame = match frame {
        Some(index) => {
            let range = footer.frame_range(index)?;
            Some(FrameRange {
                index,
                start: range.start,
                end: range.end,
            })
        }
        None => None,
    };

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "footer": report,
            "frame": frame,
        })),
        OutputFormat::Text => {
            println!("{}", report);
            if let Some(frame) = frame {
                println!();
                println!("Frame {}: bytes {}..{}", frame.index, frame.start, frame.end);
            }
            Ok(())
        }
    }
}

// =============================================================================
// Dirs Command
// =============================================================================

fn run_dirs(config: &DirsConfig, format: OutputFormat) -> CommandResult {
    let file = TiffFile::open(&config.path)?;
    debug!(
        byte_order = ?file.header().byte_order,
        count = file.directories().len(),
        "parsed TIFF structure"
    );

    let summaries: Vec<DirectorySummary> = if config.cfa_only {
        match file.first_cfa_directory() {
            Some(dir) => vec![dir.summary(file.buffer())],
            None => {
                return Err(format!("{} has no CFA directory", config.path.display()).into());
            }
        }
    } else {
        file.directories()
            .iter()
            .map(|dir| dir.summary(file.buffer()))
            .collect()
    };

    match format {
        OutputFormat::Json => print_json(&summaries),
        OutputFormat::Text => {
            for (index, summary) in summaries.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                print_summary(summary);
            }
            Ok(())
        }
    }
}

fn print_summary(summary: &DirectorySummary) {
    match summary.parent_offset {
        Some(parent) => println!("Sub-IFD @ {} (parent {})", summary.offset, parent),
        None => println!("IFD @ {} (next {})", summary.offset, summary.next_offset),
    }
    if let Some(photometric) = summary.photometric_interpretation {
        println!("  Photometric: {:?}", photometric);
    }
    if let (Some(width), Some(height)) = (summary.width, summary.height) {
        println!("  Size: {}x{}", width, height);
    }
    for tag in &summary.tags {
        println!(
            "  {:>5} {:<26} {:<9} x{:<6} {}",
            tag.tag,
            tag.name.unwrap_or("?"),
            tag.field_type,
            tag.count,
            tag.first_value.as_deref().unwrap_or("-"),
        );
    }
}

// =============================================================================
// Copy Command
// =============================================================================

fn run_copy(config: &CopyConfig) -> CommandResult {
    let file = TiffFile::open(&config.source)?;
    file.save_as(&config.destination)?;
    info!(
        "Copied {} ({} bytes, {} directories) to {}",
        config.source.display(),
        file.buffer().len(),
        file.directories().len(),
        config.destination.display()
    );
    Ok(())
}
