//! # qrwall CLI
//!
//! Command-line interface for rendering QR wallpapers.
//!
//! ## Usage
//!
//! ```bash
//! # List supported devices
//! qrwall devices
//!
//! # Start a design for a device
//! qrwall new --device "Pixel 8" --url https://example.com > design.json
//!
//! # Render it at twice the device resolution
//! qrwall render design.json -o wallpaper.png --scale 2
//!
//! # Serve the HTTP API
//! qrwall serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use qrwall::{
    DesignDocument, DesignState, DeviceProfile, EditorConfig, QrwallError,
    design::{BackgroundFill, BackgroundSpec, ImageSource, QrSpec, from_serializable, to_serializable},
    export::{ExportFormat, ExportOptions, render_design},
    loader::{ImageLoader, LoadRequest},
    server::{self, ServerConfig},
};

/// qrwall - QR code wallpaper compositor
#[derive(Parser, Debug)]
#[command(name = "qrwall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Editor settings file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a design document to PNG or JPEG
    Render {
        /// Design document (JSON)
        design: PathBuf,

        /// Output image path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// png or jpeg (defaults to the output extension)
        #[arg(long)]
        format: Option<String>,

        /// Output size relative to the device resolution
        #[arg(long, default_value = "1.0")]
        scale: f32,

        /// JPEG quality in (0, 1]
        #[arg(long)]
        quality: Option<f32>,
    },

    /// List known device resolutions
    Devices,

    /// Print a starter design document
    New {
        /// Device name (see `qrwall devices`)
        #[arg(long, default_value = "iPhone 15 Pro Max")]
        device: String,

        /// URL to encode
        #[arg(long, default_value = "https://example.com")]
        url: String,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), QrwallError> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::from_file(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Commands::Render {
            design,
            output,
            format,
            scale,
            quality,
        } => {
            let format = match format {
                Some(name) => name.parse::<ExportFormat>()?,
                None => format_from_extension(&output),
            };
            let options = ExportOptions {
                format,
                quality: quality.unwrap_or(ExportOptions::default().quality),
                scale,
            };

            let text = std::fs::read_to_string(&design)?;
            let state = from_serializable(DesignDocument::from_json(&text)?)?;
            let background = load_background(&state, design.parent()).await;

            let exported = tokio::task::spawn_blocking(move || {
                render_design(&state, background, &config, &options)
            })
            .await
            .map_err(|e| QrwallError::Server(format!("Render task failed: {}", e)))??;

            std::fs::write(&output, &exported.bytes)?;
            tracing::info!(
                width = exported.width,
                height = exported.height,
                path = %output.display(),
                "saved wallpaper"
            );
        }

        Commands::Devices => {
            println!("Available devices:");
            for profile in DeviceProfile::ALL {
                println!(
                    "  {:<20} {}x{}",
                    profile.name, profile.pixel_width, profile.pixel_height
                );
            }
        }

        Commands::New {
            device,
            url,
            output,
        } => {
            let profile = DeviceProfile::find(&device).ok_or_else(|| {
                QrwallError::Document(format!(
                    "Unknown device '{}'. Run `qrwall devices` to see available options.",
                    device
                ))
            })?;
            let qr = QrSpec {
                payload_url: url,
                ..Default::default()
            };
            let state = DesignState::new(profile.canvas(), BackgroundSpec::default(), qr);
            let json = to_serializable(&state).to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    tracing::info!(path = %path.display(), device = profile.name, "wrote design");
                }
                None => println!("{}", json),
            }
        }

        Commands::Serve { listen } => {
            server::serve(ServerConfig {
                listen_addr: listen,
                editor: config,
            })
            .await?;
        }
    }

    Ok(())
}

fn format_from_extension(path: &Path) -> ExportFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
        .unwrap_or_default()
}

/// Fetch the image for an image fill. Relative paths resolve against the
/// design file's directory. Failures fall back to the white fill.
async fn load_background(state: &DesignState, base: Option<&Path>) -> Option<image::DynamicImage> {
    let BackgroundFill::Image { source } = &state.background().fill else {
        return None;
    };
    let request = match source {
        ImageSource::Url(url) => LoadRequest::Url(url.clone()),
        ImageSource::Path(path) if path.is_relative() => {
            LoadRequest::Path(base.map(|b| b.join(path)).unwrap_or_else(|| path.clone()))
        }
        ImageSource::Path(path) => LoadRequest::Path(path.clone()),
        ImageSource::Blob(_) => {
            tracing::warn!("in-memory backgrounds cannot be restored from a file");
            return None;
        }
    };

    let loaded = match ImageLoader::new() {
        Ok(loader) => loader.load(request).await,
        Err(e) => Err(e),
    };
    match loaded {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!(error = %e, "background image unavailable, using fallback fill");
            None
        }
    }
}
