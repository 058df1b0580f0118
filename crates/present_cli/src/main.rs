//! Present animation CLI
//!
//! Plays the engine's animations headlessly and reports the styles they
//! leave on each target.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use present_animation::{
    animate_property, get_scheduler, set_global_scheduler, CameraController, PulseConfig,
    PulseController, RotationController,
};
use std::f64::consts::PI;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod session;

use session::{Report, Session};

#[derive(Parser)]
#[command(name = "present-anim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless driver for the Present animation engine", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Animation config file (defaults to ./present-anim.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// How long to drive the scheduler, in milliseconds
    #[arg(long, global = true)]
    run_ms: Option<u64>,

    /// Tick on a background thread against the real clock instead of simulating
    #[arg(long, global = true)]
    realtime: bool,

    /// Print the final style table as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Continuous sine rotation
    Rotate {
        /// Full cycle length in seconds
        #[arg(long, default_value = "5")]
        cycle_secs: u64,
    },

    /// One-shot rotation with back-overshoot
    Pushback {
        /// Total sweep in degrees
        #[arg(long, default_value = "360", allow_negative_numbers = true)]
        degrees: f64,

        /// Duration in seconds
        #[arg(long, default_value = "6")]
        secs: u64,
    },

    /// Looping opacity/scale pulse
    Pulse,

    /// Camera move: translate the container, rotate the slides
    Camera {
        /// Final vertical offset in pixels
        #[arg(long, default_value = "-1300", allow_negative_numbers = true)]
        y: f64,

        /// Final rotation in radians
        #[arg(long, default_value = "3.14", allow_negative_numbers = true)]
        radians: f64,

        /// Translation duration in milliseconds
        #[arg(long, default_value = "2000")]
        move_ms: u64,

        /// Rotation duration in milliseconds
        #[arg(long, default_value = "4000")]
        rotate_ms: u64,
    },

    /// Start an animation by property name
    Animate {
        /// Property to animate (only `opacity` is supported)
        property: String,
    },

    /// Rotation, pulse and camera move at once
    Demo,

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = config::load(cli.config.as_deref())?;
    let mut session = Session::new(config, cli.realtime);
    set_global_scheduler(session.handle()).context("Failed to install animation scheduler")?;

    let default_run_ms = match &cli.command {
        Commands::Rotate { cycle_secs } => cmd_rotate(&session, *cycle_secs)?,
        Commands::Pushback { degrees, secs } => cmd_pushback(&session, *degrees, *secs)?,
        Commands::Pulse => cmd_pulse(&session)?,
        Commands::Camera {
            y,
            radians,
            move_ms,
            rotate_ms,
        } => cmd_camera(&session, *y, *radians, *move_ms, *rotate_ms)?,
        Commands::Animate { property } => cmd_animate(&session, property)?,
        Commands::Demo => cmd_demo(&session)?,
        Commands::Config => {
            print!("{}", config::to_toml(session.config())?);
            return Ok(());
        }
    };

    session.run_for(cli.run_ms.unwrap_or(default_run_ms));
    print_report(&session.report(), cli.json)
}

fn rotation(session: &Session) -> Result<RotationController> {
    Ok(RotationController::with_config(get_scheduler()?, session.config()))
}

fn cmd_rotate(session: &Session, cycle_secs: u64) -> Result<u64> {
    rotation(session)?
        .start_continuous(&session.stage.star, Duration::from_secs(cycle_secs))
        .context("Failed to start continuous rotation")?;
    Ok(cycle_secs.saturating_mul(2000))
}

fn cmd_pushback(session: &Session, degrees: f64, secs: u64) -> Result<u64> {
    rotation(session)?
        .start_pushback(&session.stage.star, degrees, Duration::from_secs(secs))
        .context("Failed to start pushback rotation")?;
    Ok(secs.saturating_mul(1000).saturating_add(100))
}

fn cmd_pulse(session: &Session) -> Result<u64> {
    PulseController::with_config(get_scheduler()?, session.config())
        .start(&session.stage.star)
        .context("Failed to start pulse")?;
    Ok(pulse_loop_ms(&session.config().pulse))
}

/// One full pulse loop: four phases and the hold
fn pulse_loop_ms(pulse: &PulseConfig) -> u64 {
    pulse.phase_ms.saturating_mul(4).saturating_add(pulse.hold_ms)
}

fn cmd_camera(
    session: &Session,
    y: f64,
    radians: f64,
    move_ms: u64,
    rotate_ms: u64,
) -> Result<u64> {
    let stage = &session.stage;
    CameraController::with_config(get_scheduler()?, session.config())
        .move_and_rotate(
            &stage.camera,
            &stage.slides,
            &stage.container,
            y,
            radians,
            Duration::from_millis(move_ms),
            Duration::from_millis(rotate_ms),
        )
        .context("Failed to start camera move")?;
    Ok(move_ms.max(rotate_ms).saturating_add(100))
}

fn cmd_animate(session: &Session, property: &str) -> Result<u64> {
    let started = animate_property(
        &get_scheduler()?,
        session.config(),
        &session.stage.star,
        property,
    );
    match started {
        Ok(_) => Ok(3000),
        Err(err) => {
            info!("Nothing started: {}", err);
            Ok(0)
        }
    }
}

fn cmd_demo(session: &Session) -> Result<u64> {
    let rotate = cmd_rotate(session, 5)?;
    let pulse = cmd_pulse(session)?;
    let camera = cmd_camera(session, -1300.0, PI, 2000, 4000)?;
    info!("Demo running rotation, pulse and camera move together");
    Ok(rotate.max(pulse).max(camera))
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{}", text);
        return Ok(());
    }

    info!(
        "{}ms elapsed, {} styles applied, {} animations completed",
        report.elapsed_ms, report.styles_applied, report.completed_animations
    );
    for entry in &report.styles {
        println!(
            "{:<10} {:<8} {:<13} [{}] {}",
            entry.label,
            entry.slot.source,
            format!("{:?}", entry.slot.layer),
            entry.priority.0,
            entry.style
        );
    }
    if report.active.is_empty() {
        println!("No animations running");
    } else {
        for active in &report.active {
            println!("Still running: {} on {}", active.kind, active.target);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_loop_length() {
        assert_eq!(pulse_loop_ms(&PulseConfig::default()), 3000);
    }

    #[test]
    fn test_pulse_loop_length_saturates() {
        let pulse = PulseConfig {
            phase_ms: u64::MAX / 2,
            hold_ms: u64::MAX,
            ..PulseConfig::default()
        };
        assert_eq!(pulse_loop_ms(&pulse), u64::MAX);
    }
}
