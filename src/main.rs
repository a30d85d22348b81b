//! axis-buttons entry point
//!
//! Opens the given /dev/input/event* device, registers a virtual clone of it
//! with one synthetic button per absolute axis, then mirrors events until
//! interrupted or until the stdout consumer goes away.
//!
//! Exit status: 0 on clean shutdown; 2 on usage errors; 3 when the device
//! already has buttons; 4 when it has no absolute axes; otherwise the failing
//! syscall's error code, or 1 when there is none.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use evdev::Device;
use thiserror::Error as ThisError;
use tracing::{error, info, warn};

use axis_buttons::descriptor::{DescriptorError, DeviceCapabilities};
use axis_buttons::mapper::ButtonMapper;
use axis_buttons::mirror::{MirrorError, MirrorSpec};
use axis_buttons::pump::{EventPump, PumpError};
use axis_buttons::sink::UinputSink;

/// Exit code when the device already reports buttons
const EXIT_HAS_BUTTONS: u8 = 3;
/// Exit code when the device has no absolute axes
const EXIT_NO_AXES: u8 = 4;

#[derive(Parser)]
#[command(name = "axis-buttons")]
#[command(about = "Mirror an axis-only input device, adding a thresholded button per axis")]
struct Cli {
    /// Real device to mirror (e.g. /dev/input/event3)
    device: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, ThisError)]
enum AppError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Describe(#[from] DescriptorError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Pump(#[from] PumpError),
}

impl AppError {
    /// Refusals decline the device politely; they are not faults.
    fn is_refusal(&self) -> bool {
        matches!(
            self,
            AppError::Describe(
                DescriptorError::HasButtons { .. } | DescriptorError::NoAxes { .. }
            )
        )
    }

    fn exit_code(&self) -> ExitCode {
        match self {
            AppError::Describe(DescriptorError::HasButtons { .. }) => {
                ExitCode::from(EXIT_HAS_BUTTONS)
            }
            AppError::Describe(DescriptorError::NoAxes { .. }) => ExitCode::from(EXIT_NO_AXES),
            AppError::Open { source, .. }
            | AppError::Describe(DescriptorError::Io(source))
            | AppError::Mirror(MirrorError::Create(source))
            | AppError::Pump(PumpError::Read(source) | PumpError::Write(source)) => {
                os_exit_code(source)
            }
        }
    }
}

/// Propagate the failing syscall's error code where there is one.
fn os_exit_code(err: &std::io::Error) -> ExitCode {
    match err.raw_os_error() {
        Some(code @ 1..=255) => ExitCode::from(code as u8),
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_refusal() => {
            warn!("{err}");
            err.exit_code()
        }
        Err(err) => {
            error!("{err}");
            let mut source = err.source();
            while let Some(cause) = source {
                error!("  caused by: {cause}");
                source = cause.source();
            }
            err.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let device = Device::open(&cli.device).map_err(|source| AppError::Open {
        path: cli.device.clone(),
        source,
    })?;

    let caps = DeviceCapabilities::from_device(&device)?;
    info!(
        "{} ({:04x}:{:04x})",
        caps.name(),
        caps.vendor(),
        caps.product()
    );

    let mapper = ButtonMapper::new(&caps);
    for entry in mapper.entries() {
        info!(
            "Axis {} -> button {} (max {}, threshold {})",
            entry.axis,
            entry.button.code(),
            entry.max,
            entry.threshold
        );
    }

    let spec = MirrorSpec::new(&caps, &mapper);
    let mut virt = spec.build()?;
    info!("Created virtual device: {}", spec.name());
    if let Ok(nodes) = virt.enumerate_dev_nodes_blocking() {
        for node in nodes.flatten() {
            info!("Available as {}", node.display());
        }
    }

    let stream = device.into_event_stream().map_err(PumpError::Read)?;
    EventPump::new(mapper, UinputSink::new(virt)).run(stream).await?;

    Ok(())
}
