//! Gesture Relay - Main Entry Point
//!
//! Reads hand landmarks (one JSON frame per line) from stdin or a file,
//! debounces the recognized gestures and relays confirmed actions to the
//! display, speech and serial actuators.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use gesture_relay::actuators::{SerialSink, Sink, SinkKind};
use gesture_relay::settings::Settings;
use gesture_relay::telemetry::init_logging;
use gesture_relay::{ActionDispatcher, CaptureError, Debouncer, GesturePipeline, JsonLinesSource};

#[derive(Parser, Debug)]
#[command(name = "gesture-relay", version, about)]
struct Cli {
    /// Settings file (JSON); defaults to the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Landmark stream to read; stdin when omitted or "-"
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override the number of consecutive frames needed to confirm a gesture
    #[arg(short, long)]
    threshold: Option<u32>,

    /// Override the serial device path
    #[arg(long)]
    serial_port: Option<String>,

    /// Do not open the serial link
    #[arg(long)]
    no_serial: bool,

    /// Append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(threshold) = self.threshold {
            settings.detection_threshold = threshold;
        }
        if let Some(port) = &self.serial_port {
            settings.serial.port = port.clone();
        }
        if self.no_serial {
            settings.serial.enabled = false;
        }
        if let Some(path) = &self.log_file {
            settings.log.file_enabled = true;
            settings.log.file_path = Some(path.clone());
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load_or_default().context("failed to load settings")?,
    };
    cli.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let _log_guard = init_logging(&settings.log).context("failed to initialize logging")?;

    let table = Arc::new(settings.gesture_table()?);
    let threshold = settings.threshold()?;
    tracing::info!(gestures = table.len(), threshold = threshold.get(), "Gesture table ready");

    let dispatcher = ActionDispatcher::new(
        settings.display.build(SinkKind::Display),
        settings.speech.build(SinkKind::Speech),
        open_serial(&settings),
    );
    let mut pipeline = GesturePipeline::new(Debouncer::new(table, threshold), dispatcher);

    if let Some(message) = &settings.startup_message {
        pipeline.announce(message);
    }

    let reader = open_input(cli.input.as_deref())?;
    let mut source = JsonLinesSource::new(reader);
    let summary = pipeline.run(&mut source);

    tracing::info!(
        frames = summary.frames,
        confirmations = summary.confirmations,
        failed_sends = summary.failed_sends,
        "Shutting down"
    );

    // Closes the serial port before the log guard flushes.
    drop(pipeline);

    if let CaptureError::Io(e) = summary.ended_by {
        return Err(e).context("landmark stream failed");
    }
    Ok(())
}

/// Open the serial sink, or disable it for the whole run if that fails
fn open_serial(settings: &Settings) -> Option<Box<dyn Sink>> {
    let serial = &settings.serial;
    if !serial.enabled {
        tracing::info!("Serial link disabled");
        return None;
    }

    match SerialSink::open(&serial.port, serial.baud_rate, serial.timeout(), serial.settle()) {
        Ok(sink) => Some(Box::new(sink)),
        Err(e) => {
            tracing::error!(port = %serial.port, "Could not open serial port: {}", e);
            None
        }
    }
}

fn open_input(path: Option<&std::path::Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("failed to open landmark stream {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}
