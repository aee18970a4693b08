use frame_motion_common::config::Config;
use frame_motion_detector::diff::FrameDiffer;
use frame_motion_detector::driver::{self, MotionDriver};
use frame_motion_detector::sink::{JsonLinesSink, LogSink, PresentationSink};
use frame_motion_detector::source::DirectorySource;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        tolerance = config.detector.tolerance,
        parallel = config.detector.parallel,
        grid_width = config.grid.width,
        grid_height = config.grid.height,
        source = config.source.kind,
        sink = config.sink.kind,
        fps = config.driver.fps,
        "starting frame-motion"
    );

    let source = match config.source.kind.as_str() {
        "directory" => match DirectorySource::open(
            Path::new(&config.source.path),
            config.grid.width,
            config.grid.height,
            config.source.repeat,
        ) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, path = config.source.path, "failed to open frame source");
                std::process::exit(1);
            }
        },
        other => {
            error!(kind = other, "unknown source kind, expected 'directory'");
            std::process::exit(1);
        }
    };

    let sink: Box<dyn PresentationSink> = match (config.sink.kind.as_str(), &config.sink.path) {
        ("log", _) => Box::new(LogSink),
        ("jsonl", Some(path)) => match File::create(path) {
            Ok(f) => Box::new(JsonLinesSink::new(BufWriter::new(f))),
            Err(e) => {
                error!(error = %e, path, "failed to create region output file");
                std::process::exit(1);
            }
        },
        ("jsonl", None) => Box::new(JsonLinesSink::new(std::io::stdout())),
        (other, _) => {
            error!(kind = other, "unknown sink kind, expected 'log' or 'jsonl'");
            std::process::exit(1);
        }
    };

    let differ = FrameDiffer::new(config.detector.tolerance, config.detector.parallel);
    let mut motion = MotionDriver::new(source, sink, differ, config.display.scale);

    let period = match config.driver.period() {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "invalid driver cadence");
            std::process::exit(1);
        }
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    if let Err(e) = driver::run(&mut motion, period, config.driver.max_ticks, shutdown).await {
        error!(error = %e, "frame loop aborted");
        std::process::exit(1);
    }
}
