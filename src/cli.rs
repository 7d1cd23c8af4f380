// SPDX-License-Identifier: GPL-3.0-only

//! Command implementations for the thermal-stream binary
//!
//! - Listing V4L2 capture devices
//! - Running the capture loop and HTTP server until shutdown

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use thermal_stream::backends::camera::{CaptureLoopController, LoopExit, V4l2Camera, v4l2_utils};
use thermal_stream::capture::CaptureLoop;
use thermal_stream::frame_store::FrameStore;
use thermal_stream::pipelines::FramePipeline;
use thermal_stream::server::{self, ServerState};
use thermal_stream::shutdown::Shutdown;
use thermal_stream::terminal::TerminalDisplay;
use thermal_stream::{Config, platform};
use tracing::{debug, info, warn};

/// Grace period for in-flight HTTP work once shutdown starts
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest wait for the capture thread; a device read times out well before this
const CAPTURE_STOP_TIMEOUT: Duration = Duration::from_secs(3);

/// List all V4L2 capture devices
pub fn list_devices() -> Result<(), Box<dyn Error>> {
    let devices = v4l2_utils::list_capture_devices();

    if devices.is_empty() {
        println!("No capture devices found.");
        return Ok(());
    }

    println!("Available capture devices:");
    println!();
    for device in &devices {
        println!("  {}  {} ({})", device.path, device.card, device.driver);
    }
    Ok(())
}

fn log_platform() {
    match platform::board_model() {
        Some(model) => info!(
            model = %model,
            raspberry_pi = platform::model_is_raspberry_pi(&model),
            "Detected board"
        ),
        None => debug!("Board model unknown"),
    }
}

/// Capture, process and stream until Ctrl+C, the quit key or camera loss
pub fn run(config: Config) -> Result<(), Box<dyn Error>> {
    log_platform();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("thermal-http")
        .build()?;

    // Both of these are fatal before capture starts
    let listener = runtime.block_on(server::bind(config.server.port))?;
    let camera = V4l2Camera::open(&config.device_path())?;

    let store = Arc::new(FrameStore::new());
    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Interrupt received, shutting down");
            shutdown.trigger();
        })?;
    }

    let url = format!("http://0.0.0.0:{}", config.server.port);

    let mut capture = CaptureLoop::new(
        camera,
        FramePipeline::new(config.pipeline.clone()),
        Arc::clone(&store),
    );
    if !config.headless {
        match TerminalDisplay::new(&url) {
            Ok(display) => capture = capture.with_display(Box::new(display)),
            Err(e) => warn!(error = %e, "Local display unavailable, running headless"),
        }
    }

    let mut controller = {
        let shutdown = shutdown.clone();
        CaptureLoopController::start(
            "thermal-capture",
            move || capture.step(),
            move |exit| {
                if exit == LoopExit::Finished {
                    shutdown.trigger();
                }
            },
        )?
    };

    let state = Arc::new(ServerState::new(
        store,
        config.server.jpeg_quality,
        config.server.max_clients,
    ));

    info!(port = config.server.port, "Server started at {}", url);
    info!("Press Ctrl+C to stop");

    let served = runtime.block_on(server::serve(listener, state, {
        let shutdown = shutdown.clone();
        async move { shutdown.wait().await }
    }));
    if let Err(e) = &served {
        warn!(error = %e, "HTTP server failed");
    }

    // Releases the camera and the local display on the capture thread
    shutdown.trigger();
    if controller.stop_timeout(CAPTURE_STOP_TIMEOUT).is_none() {
        warn!("Capture thread did not exit cleanly");
    }
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    info!("Stopped");

    served.map_err(Into::into)
}
