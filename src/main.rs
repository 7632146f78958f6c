use anyhow::{Context, Result};
use chromakey::background::{self, BackgroundSource};
use chromakey::capture::{CaptureSource, ImageSequenceCapture, WebcamCapture};
use chromakey::config::{self, KeyerSettings};
use chromakey::controller::input::CommandInput;
use chromakey::controller::{Event, PipelineController};
use chromakey::keying::StepPolicy;
use chromakey::output::{ImageSequenceWriter, OutputSink, PreviewWriter, V4L2Output};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of frames to key, read in file-name order
    #[arg(short, long, conflicts_with = "camera")]
    input: Option<PathBuf>,

    /// Webcam device index to key live instead of a frame directory
    #[arg(short, long)]
    camera: Option<u32>,

    /// Background image, resized to the frame size
    #[arg(short, long, conflicts_with = "background_color")]
    background: Option<PathBuf>,

    /// Solid background colour as r,g,b
    #[arg(long, value_parser = background::parse_color)]
    background_color: Option<[u8; 3]>,

    /// v4l2loopback device to present the live composite on
    ///
    /// Without one the composite is presented as a PNG file (see --preview).
    #[arg(short, long)]
    output_device: Option<String>,

    /// PNG file rewritten with the composite when no output device is given
    #[arg(long, default_value = "chromakey-preview.png")]
    preview: PathBuf,

    /// Directory the sample export writes frames into
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Frame rate reported for frame directories
    #[arg(long)]
    fps: Option<f32>,

    /// Milliseconds between ticks of the frame loop
    #[arg(long)]
    tick_ms: Option<u64>,

    /// How threshold sliders shift the range: absolute or incremental
    #[arg(long)]
    step_policy: Option<StepPolicy>,

    /// Settings file (TOML); defaults to ./chromakey.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Show the softened mask instead of the composite
    #[arg(long)]
    show_mask: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("chromakey starting");

    let handle = config::load_settings(args.config.as_deref());
    for warning in &handle.warnings {
        tracing::warn!("{}", warning);
    }
    if let Some(source) = &handle.source {
        tracing::info!("Loaded settings from {}", source.display());
    }
    let settings = apply_overrides(handle.settings, &args);

    let background = match (&args.background, args.background_color) {
        (Some(path), _) => BackgroundSource::Image(path.clone()),
        (None, Some(color)) => BackgroundSource::Solid(color),
        (None, None) => BackgroundSource::Solid(settings.background_color),
    };

    let capture = open_source(&args, &settings).context("Couldn't open video source")?;
    let (width, height) = capture.resolution();
    tracing::info!("Capture: {}x{} @ {} fps", width, height, capture.frame_rate());

    let mut controller = PipelineController::new(capture, &background, &settings)
        .context("Failed to start keying session")?;

    let mut output: Box<dyn OutputSink> = match &args.output_device {
        Some(device) => Box::new(
            V4L2Output::new(device, width, height)
                .context("Failed to initialize v4l2loopback output")?,
        ),
        None => {
            tracing::info!("No output device given, presenting to {}", args.preview.display());
            Box::new(
                PreviewWriter::new(&args.preview, width, height)
                    .context("Failed to create preview file")?,
            )
        }
    };

    let mut input = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            CommandInput::spawn(BufReader::new(file))
        }
        None => CommandInput::spawn(BufReader::new(std::io::stdin())),
    };

    if args.show_mask {
        controller.push_event(Event::ShowMask(true));
    }

    tracing::info!("Commands: hue/sat/val/soften/spill N, select X0 Y0 X1 Y1, step, reset, export, quit");

    run_pipeline(&mut controller, &mut input, output.as_mut(), &args, &settings)?;

    tracing::info!("chromakey stopped");
    Ok(())
}

fn apply_overrides(mut settings: KeyerSettings, args: &Args) -> KeyerSettings {
    if let Some(fps) = args.fps {
        settings.frame_rate = fps;
    }
    if let Some(tick_ms) = args.tick_ms {
        settings.tick_ms = tick_ms;
    }
    if let Some(policy) = args.step_policy {
        settings.step_policy = policy;
    }
    if let Some(dir) = &args.export_dir {
        settings.export_dir = dir.clone();
    }
    settings.sanitize()
}

fn open_source(args: &Args, settings: &KeyerSettings) -> Result<Box<dyn CaptureSource>> {
    match (&args.input, args.camera) {
        (Some(dir), _) => Ok(Box::new(ImageSequenceCapture::open(dir, settings.frame_rate)?)),
        (None, Some(index)) => Ok(Box::new(WebcamCapture::new(index)?)),
        (None, None) => anyhow::bail!("Give a frame directory with --input or a webcam with --camera"),
    }
}

fn run_pipeline(
    controller: &mut PipelineController,
    input: &mut CommandInput,
    output: &mut dyn OutputSink,
    args: &Args,
    settings: &KeyerSettings,
) -> Result<()> {
    let tick_duration = Duration::from_millis(settings.tick_ms);
    let mut tick_count = 0u64;
    let mut total_key_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!("Starting main pipeline loop");

    loop {
        let loop_start = Instant::now();

        controller.extend_events(input.poll());

        let key_start = Instant::now();
        let tick = controller.tick().context("Failed to key frame")?;
        total_key_time += key_start.elapsed();

        let output_start = Instant::now();
        output.write_frame(&tick.frame).context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        if tick.export_requested {
            if let Err(e) = export(controller, args, settings) {
                tracing::warn!("Sample export failed: {:#}", e);
            }
        }

        if tick.quit {
            break;
        }

        tick_count += 1;

        // Log stats every 30 ticks
        if tick_count % 30 == 0 {
            let avg_key_ms = total_key_time.as_secs_f64() * 1000.0 / tick_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / tick_count as f64;
            tracing::debug!(
                "Tick {}: frame={}, key={:.1}ms, output={:.1}ms",
                tick_count,
                controller.frames_read(),
                avg_key_ms,
                avg_output_ms
            );
        }

        let elapsed = loop_start.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        }
    }

    Ok(())
}

/// Re-read the source from the start and write the keyed frames out
fn export(controller: &PipelineController, args: &Args, settings: &KeyerSettings) -> Result<()> {
    let Some(dir) = &args.input else {
        anyhow::bail!("Sample export needs a frame directory source");
    };

    let mut source = ImageSequenceCapture::open(dir, settings.frame_rate)
        .context("Couldn't reopen the source for export")?;
    let mut sink = ImageSequenceWriter::create(&settings.export_dir, source.stream_info())
        .context("Couldn't create export directory")?;

    let written = controller.export_sample(&mut source, &mut sink)?;
    tracing::info!("Exported {} frames to {}", written, sink.dir().display());
    Ok(())
}
