use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, info};

use clicktrack::config::{Mode, TrackerKind};
use clicktrack::integration::{
    HighGuiWindow, KcfTracker, Mog2Detector, TemplateMatTracker, VideoSource,
};
use clicktrack::{
    Annotator, AppConfig, LoopExit, MotionLoop, MotionTracker, SelectionMode, TrackingLoop,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Track,
    Motion,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SelectionArg {
    Drag,
    Click,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TrackerArg {
    Kcf,
    Template,
}

#[derive(Parser, Debug)]
#[command(name = "clicktrack", version, about = "Click-to-track object tracking on a live view")]
struct Args {
    /// YAML settings file (defaults to ./clicktrack.yaml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Camera index
    #[arg(long, conflicts_with = "file")]
    camera: Option<i32>,
    /// Video file to read instead of a camera
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    #[arg(long, value_enum)]
    selection: Option<SelectionArg>,
    #[arg(long, value_enum)]
    tracker: Option<TrackerArg>,
    /// Display calibration used for centimeter-sized overlays
    #[arg(long)]
    pixels_per_cm: Option<f64>,
    /// Keep frames in color
    #[arg(long)]
    no_grayscale: bool,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(camera) = self.camera {
            config.source.camera = camera;
            config.source.file = None;
        }
        if let Some(file) = &self.file {
            config.source.file = Some(file.clone());
        }
        if let Some(mode) = self.mode {
            config.mode = match mode {
                ModeArg::Track => Mode::Track,
                ModeArg::Motion => Mode::Motion,
            };
        }
        if let Some(selection) = self.selection {
            config.selection.mode = match selection {
                SelectionArg::Drag => SelectionMode::Drag,
                SelectionArg::Click => SelectionMode::ClickCenter,
            };
        }
        if let Some(tracker) = self.tracker {
            config.tracker.kind = match tracker {
                TrackerArg::Kcf => TrackerKind::Kcf,
                TrackerArg::Template => TrackerKind::Template,
            };
        }
        if let Some(ppcm) = self.pixels_per_cm {
            config.render.pixels_per_cm = ppcm;
        }
        if self.no_grayscale {
            config.source.grayscale = false;
        }
    }
}

fn setup_logger() {
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stderr);
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        builder.filter(None, LevelFilter::Warn);
        builder.filter(Some("clicktrack"), LevelFilter::Info);
    }
    builder.init();
}

fn run(config: &AppConfig) -> Result<LoopExit> {
    let source = VideoSource::open(&config.source).context("failed to open video source")?;
    let window = HighGuiWindow::open(config.window_name(), config.window.size)
        .context("failed to open window")?;
    let annotator = Annotator::new(config.render.clone());
    let settings = config.loop_settings();

    let exit = match (config.mode, config.tracker.kind) {
        (Mode::Motion, _) => {
            let detector =
                Mog2Detector::new(&config.motion).context("failed to create motion detector")?;
            let tracker = MotionTracker::new(config.motion.tracker_config());
            MotionLoop::new(source, window, detector, tracker, annotator, settings).run()?
        }
        (Mode::Track, TrackerKind::Kcf) => TrackingLoop::new(
            source,
            window,
            KcfTracker::new(),
            config.selector(),
            annotator,
            settings,
        )
        .run()?,
        (Mode::Track, TrackerKind::Template) => TrackingLoop::new(
            source,
            window,
            TemplateMatTracker::new(config.tracker.template.clone()),
            config.selector(),
            annotator,
            settings,
        )
        .run()?,
    };
    Ok(exit)
}

fn main() -> Result<()> {
    setup_logger();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    info!(
        "mode {:?}, source {:?}, tracker {:?}, selection {:?}",
        config.mode,
        config.source.input(),
        config.tracker.kind,
        config.selection.mode
    );

    let exit = run(&config)?;
    info!("exiting: {exit:?}");
    Ok(())
}
