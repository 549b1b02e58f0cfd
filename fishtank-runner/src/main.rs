mod loader;
mod stats;

use clap::Parser;
use fishtank_config::{load_config, Config, ConfigError, SenderType, SerializerType, ViewportSettings};
use fishtank_simulation::{ParticleParams, SceneParams, SwimParams, TankApp};
use fishtank_transport::{
    BinarySerializer, FileSender, JsonSerializer, ModelLook, NullSender, ParticleLook,
    SceneDescription, Sender, Serializer, StdioSender, TransportController, TransportError,
    Viewport,
};
use loader::FileModelLoader;
use log::{error, info, warn};
use stats::FrameStats;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Failed to set up frame statistics: {0}")]
    Stats(#[from] hdrhistogram::CreationError),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless fish tank simulation", long_about = None)]
struct Args {
    /// Path to a JSON or TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u64>,

    /// Seed for every random draw (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output size, e.g. 1920x1080
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<ViewportSettings>,
}

fn parse_viewport(value: &str) -> Result<ViewportSettings, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: u32 = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok(ViewportSettings { width, height, ..ViewportSettings::default() })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{e}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), RunnerError> {
    let config = resolve_config(&args)?;

    let mut app = TankApp::new(scene_params(&config), Box::new(FileModelLoader::new()));
    let mut transport = TransportController::new(
        create_serializer(&config),
        create_sender(&config)?,
        config.transport.output_every,
    );
    transport.send_scene(&scene_description(&config))?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
    }

    info!(
        "Running {} actors and {} particles at {} FPS",
        config.actors.count, config.particles.count, config.framerate
    );
    app.start_loading();

    let mut stats = FrameStats::new()?;
    while !stop.load(Ordering::SeqCst) {
        if args.frames.map_or(false, |limit| app.tank().frame() >= limit) {
            break;
        }

        let frame_start = Instant::now();
        let report = app.step();

        if let Some(event) = report.opened {
            info!("Tank ready on frame {}: {:?}", report.frame, event);
        }

        if let Err(e) = transport.publish(app.tank()) {
            warn!("Failed to send frame {}: {}", report.frame, e);
        }

        stats.record(&app.pace(frame_start));
    }

    if stop.load(Ordering::SeqCst) {
        info!("Interrupted, shutting down");
    }
    transport.flush()?;
    stats.log_summary();
    info!("Sent {} frame snapshots", transport.sent_frames());

    let pending = app.loads_in_flight();
    if !app.tank().is_ready() {
        warn!(
            "Tank never became ready: {} loads still in flight, {} failed",
            pending,
            app.tank().latch.failed_count()
        );
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<Config, RunnerError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Using configuration from {}", path.display());
            load_config(path)?
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(viewport) = args.viewport {
        config.viewport = ViewportSettings { pixel_ratio: config.viewport.pixel_ratio, ..viewport };
    }
    config.validate()?;
    Ok(config)
}

fn scene_params(config: &Config) -> SceneParams {
    SceneParams {
        container: config.container.to_container(),
        actor_count: config.actors.count,
        particle_count: config.particles.count,
        model_path: config.actors.model_path.clone(),
        model_scale: config.actors.scale,
        failure_policy: config.actors.on_load_failure,
        swim: SwimParams {
            swim_speed: config.actors.swim_speed,
            rotation_smoothing: config.actors.rotation_smoothing,
            clipping_margin: config.actors.clipping_margin,
        },
        particles: ParticleParams {
            speed: config.particles.speed,
            amplitude: config.particles.amplitude,
            damping: config.particles.damping,
        },
        seed: config.seed,
        framerate: Some(config.framerate),
    }
}

fn scene_description(config: &Config) -> SceneDescription {
    let viewport = Viewport {
        width: config.viewport.width,
        height: config.viewport.height,
        pixel_ratio: config.viewport.pixel_ratio,
    };
    SceneDescription::new(
        &config.container.to_container(),
        viewport,
        ModelLook {
            path: config.actors.model_path.clone(),
            scale: config.actors.scale,
        },
        ParticleLook {
            sprite: config.particles.sprite_path.clone(),
            size: config.particles.size,
            opacity: config.particles.opacity,
        },
    )
}

fn create_serializer(config: &Config) -> Box<dyn Serializer> {
    match config.transport.serializer.serializer_type {
        SerializerType::Json => Box::new(JsonSerializer),
        SerializerType::Binary => Box::new(BinarySerializer),
    }
}

fn create_sender(config: &Config) -> Result<Box<dyn Sender>, RunnerError> {
    let sender: Box<dyn Sender> = match config.transport.sender.sender_type {
        SenderType::Stdio => Box::new(StdioSender::new()),
        SenderType::Null => Box::new(NullSender),
        SenderType::File => {
            let options = config.transport.sender.get_file_options().ok_or_else(|| {
                ConfigError::Validation("File sender requires an options.path entry.".to_string())
            })?;
            Box::new(FileSender::new(&options.path)?)
        }
    };
    Ok(sender)
}
