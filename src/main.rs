// SPDX-License-Identifier: GPL-3.0-only

use clap::Parser;
use std::path::PathBuf;
use thermal_stream::Config;
use thermal_stream::errors::AppResult;

mod cli;

#[derive(Parser)]
#[command(name = "thermal-stream")]
#[command(about = "Stream a thermal camera as false-color MJPEG over HTTP")]
#[command(version)]
struct Cli {
    /// Camera index, opened as /dev/video<N> [default: 0]
    #[arg(short, long)]
    device: Option<u32>,

    /// HTTP port to listen on [default: 8000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Run without the local display
    #[arg(long)]
    headless: bool,

    /// JSON config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upscale factor [default: 3]
    #[arg(long)]
    scale: Option<u32>,

    /// Brightness gain [default: 1.0]
    #[arg(long)]
    alpha: Option<f32>,

    /// Box blur kernel size in pixels; even sizes round up to the next odd
    /// size (2 blurs like 3), 0 or 1 disables [default: 0]
    #[arg(long)]
    blur: Option<u32>,

    /// JPEG quality 1-100 [default: 80]
    #[arg(long)]
    quality: Option<u8>,

    /// Maximum simultaneous stream clients [default: unlimited]
    #[arg(long)]
    max_clients: Option<usize>,

    /// List capture devices and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    fn resolve_config(&self) -> AppResult<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(device) = self.device {
            config.device = device;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.headless {
            config.headless = true;
        }
        if let Some(scale) = self.scale {
            config.pipeline.scale = scale;
        }
        if let Some(alpha) = self.alpha {
            config.pipeline.alpha = alpha;
        }
        if let Some(blur) = self.blur {
            config.pipeline.blur = blur;
        }
        if let Some(quality) = self.quality {
            config.server.jpeg_quality = quality;
        }
        if self.max_clients.is_some() {
            config.server.max_clients = self.max_clients;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Log level used when RUST_LOG is unset
///
/// Log lines written to stderr would tear the terminal display, so only
/// warnings and errors are shown while it is active.
fn default_log_filter(config: &Config) -> &'static str {
    if config.headless { "info" } else { "warn" }
}

fn init_tracing(default_filter: &str) {
    // Set RUST_LOG to control verbosity, e.g. RUST_LOG=thermal_stream=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.list {
        init_tracing("info");
        return cli::list_devices();
    }

    let config = cli.resolve_config()?;
    init_tracing(default_log_filter(&config));
    tracing::debug!(?config, "Resolved configuration");
    cli::run(config)
}
