use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use storyboard_core::{parser, Storyboard, StoryboardObject};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Output storyboard width every script coordinate is authored against,
/// matching `storyboard_core::storyboard`'s virtual field.
const DEFAULT_RESOLUTION_WIDTH: f64 = 1920.0;

/// How many evenly-spaced samples to report across each object's active
/// interval. Rendering actual frames is an external collaborator's job;
/// this driver only proves the script compiles and dumps a readable
/// summary of what it produced.
const SAMPLES_PER_OBJECT: usize = 5;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the storyboard script
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Output path, accepted for interface parity with a real renderer but
    /// never written to here — rendering pixels is out of scope for this core.
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Target output resolution width in pixels; scales the storyboard's
    /// virtual 854-wide coordinate space.
    #[arg(long, default_value_t = DEFAULT_RESOLUTION_WIDTH)]
    resolution_width: f64,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format);

    if let Some(output) = &cli.output {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                warn!(path = %output.display(), "output path's parent directory does not exist");
            }
        }
    }

    match run(&cli) {
        Ok(()) => info!("done"),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn init_logging(log_level: LogLevel, log_format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.to_string().parse().expect("log level parses as a directive"))
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }
}

fn run(cli: &Cli) -> Result<()> {
    info!(script = %cli.script.display(), "parsing storyboard script");
    let parsed = parser::parse_file(&cli.script).context("failed to read storyboard script")?;

    for diagnostic in &parsed.diagnostics {
        warn!(line = diagnostic.line, "{}", diagnostic.message);
    }
    info!(
        objects = parsed.objects.len(),
        samples = parsed.samples.len(),
        diagnostics = parsed.diagnostics.len(),
        "parsed storyboard script"
    );

    let storyboard = Storyboard::new(parsed.objects, parsed.samples, cli.resolution_width);
    report(&storyboard);

    Ok(())
}

/// Logs a handful of evenly-spaced draw-frame samples across each object's
/// active interval, enough to eyeball that the compiled keyframes behave
/// sensibly without requiring an actual renderer.
fn report(storyboard: &Storyboard) {
    for object in &storyboard.objects {
        let sprite = match object {
            StoryboardObject::Sprite(s) => s,
            StoryboardObject::Animation(a) => &a.sprite,
        };
        let (start, end) = sprite.active_interval;
        info!(
            filepath = %sprite.filepath,
            layer = ?sprite.layer,
            active_start = start,
            active_end = end,
            "sprite compiled"
        );

        for sample_time in sample_times(start, end, SAMPLES_PER_OBJECT) {
            let position = sprite.position_at(sample_time);
            let scale = sprite.scale_at(sample_time);
            info!(
                time = sample_time,
                x = position.x,
                y = position.y,
                scale_x = scale.x,
                scale_y = scale.y,
                rotation = sprite.rotation_at(sample_time),
                opacity = sprite.opacity_at(sample_time),
                "sampled frame"
            );
        }
    }

    let passing_frame = storyboard.draw_frame(0.0, true);
    info!(draw_commands = passing_frame.len(), "draw_frame(0.0) resolved");
}

/// Evenly spaces `count` sample times across `[start, end]`, clamping an
/// unbounded interval to a readable window around zero.
fn sample_times(start: f64, end: f64, count: usize) -> Vec<f64> {
    let start = if start.is_finite() { start } else { 0.0 };
    let end = if end.is_finite() { end } else { start + 1000.0 };
    if count <= 1 || end <= start {
        return vec![start];
    }
    let step = (end - start) / (count - 1) as f64;
    (0..count).map(|i| start + step * i as f64).collect()
}
