use lyricscroll_core::{
    format_time, CoreError, DurationExt, LoadCoordinator, LoadStatus, LrcSource, LyricLine, LyricView,
    LyricViewConfig, MonospaceLayout,
};
use lyricscroll_http::HttpFetcher;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_TARGET: &str = "lyricscroll::demo";

/// Pixel size of one terminal cell handed to the layout engine
const CELL_WIDTH: f32 = 8.0;
const LINE_HEIGHT: f32 = 18.0;
const VIEWPORT_WIDTH: f32 = 640.0;
const VIEWPORT_HEIGHT: f32 = 480.0;

/// Simulated player tick
const FRAME_INTERVAL: Duration = Duration::from_millis(50);
/// Keep "playing" this long after the last line starts
const TAIL: Duration = Duration::from_secs(5);

const USAGE: &str = "usage: lyricscroll <file.lrc | http(s)://url> [translation.lrc]\n       lyricscroll --write-config";

fn main() {
    let config = match LyricViewConfig::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.logging.enabled);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--write-config") {
        let path = LyricViewConfig::config_path();
        match LyricViewConfig::write_template(&path) {
            Ok(()) => info!(target: LOG_TARGET, "Wrote config template to {}", path.display()),
            Err(e) => {
                error!(target: LOG_TARGET, "{e}");
                std::process::exit(1);
            }
        }
        return;
    }
    let Some(source) = args.first().cloned() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let secondary = args.get(1).map(PathBuf::from);

    // Create tokio runtime for loads and the playback clock
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(target: LOG_TARGET, "Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler to trigger graceful shutdown
    let cancel_token = CancellationToken::new();
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!(target: LOG_TARGET, "Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!(target: LOG_TARGET, "Failed to set Ctrl+C handler: {e}");
    }

    if let Err(e) = runtime.block_on(run(&config, &source, secondary, cancel_token)) {
        error!(target: LOG_TARGET, "{e}");
        std::process::exit(1);
    }
}

async fn run(
    config: &LyricViewConfig,
    source: &str,
    secondary: Option<PathBuf>,
    cancel_token: CancellationToken,
) -> Result<(), CoreError> {
    let fetcher = HttpFetcher::new(&config.network)?;
    let loader = LoadCoordinator::new(Handle::current(), Arc::new(LrcSource))
        .with_fetcher(Arc::new(fetcher))
        .with_default_charset(config.network.charset.clone());
    let mut view = LyricView::new(
        config,
        Box::new(MonospaceLayout::new(CELL_WIDTH, LINE_HEIGHT)),
        loader,
    )?;
    view.set_viewport(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);

    if source.starts_with("http://") || source.starts_with("https://") {
        view.load_url(source, None);
    } else {
        view.load_files(source, secondary);
    }

    let status = tokio::select! {
        () = cancel_token.cancelled() => None,
        status = view.wait_for_load() => status,
    };
    match status {
        Some(LoadStatus::Applied { lines }) if lines > 0 => {
            info!(target: LOG_TARGET, "Playing {lines} lines from {source}");
        }
        Some(_) => {
            warn!(target: LOG_TARGET, "Nothing to play");
            println!("{}", view.label());
            return Ok(());
        }
        None => return Ok(()),
    }

    let lines = view.track().lines();
    let first = lines.first().map_or(Duration::ZERO, LyricLine::start_time);
    let end = lines.last().map_or(Duration::ZERO, LyricLine::start_time) + TAIL;

    let started = Instant::now();
    let mut shown = None;
    let mut interval = tokio::time::interval(FRAME_INTERVAL);
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            _ = interval.tick() => {}
        }

        let now = Instant::now();
        let position = now.saturating_duration_since(started);
        view.update_position(position, now);
        view.tick(now);

        let current = view.current_line();
        if position >= first && shown != Some(current) {
            shown = Some(current);
            if let Some(line) = view.track().get(current) {
                println!("[{}] {}", format_time(line.start_ms), line.display_text());
            }
        }
        if view.take_redraw() {
            tracing::trace!(
                target: LOG_TARGET,
                "frame at {}ms offset {:.1} ({})",
                position.as_millis_u64(),
                view.offset(),
                view.mode().name()
            );
        }

        if position >= end {
            break;
        }
    }

    view.detach();
    info!(target: LOG_TARGET, "Playback finished");
    Ok(())
}

/// Initialize tracing with console output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = lyricscroll_core::paths::log_file_path();

        // Create cache directory if needed
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
