use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tile_hinter::autoplay::{Action, PointerActuator};
use tile_hinter::config::Settings;
use tile_hinter::engine::Frame;
use tile_hinter::geometry::Point;
use tile_hinter::session::Session;
use tile_hinter::utils::board_from_text;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Replay board files through autoplay without clicking",
    long_about = None
)]
struct Args {
    /// Board files, one per captured frame, in order
    #[clap(required = true)]
    board_files: Vec<PathBuf>,

    /// Settings JSON file; defaults are used when absent
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Commit to the best move over two frames
    #[clap(long)]
    prefer_best: bool,

    /// Simulated time between frames; defaults to the capture frequency
    #[clap(long)]
    interval_ms: Option<u64>,

    /// RNG seed for reproducible runs
    #[clap(short, long)]
    seed: Option<u64>,
}

/// Logs clicks instead of moving the pointer.
struct DryRunPointer {
    clicks: usize,
}

impl PointerActuator for DryRunPointer {
    fn click(&mut self, at: Point) {
        self.clicks += 1;
        info!(%at, "click");
    }
}

fn describe(action: Option<Action>) -> String {
    match action {
        None => "autoplay off".to_string(),
        Some(Action::Wait) => "wait".to_string(),
        Some(Action::Throttled) => "dismissal throttled".to_string(),
        Some(Action::Dismiss(at)) => format!("dismiss at {}", at),
        Some(Action::Explore(at)) => format!("random click at {}", at),
        Some(Action::FinishMove(at)) => format!("finish move at {}", at),
        Some(Action::StartMove(at)) => format!("start move at {}", at),
        Some(Action::Swap(from, to)) => format!("swap {} -> {}", from, to),
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.autoplay = true;
    settings.prefer_best_move |= args.prefer_best;
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.tick_interval());

    let mut frames = Vec::with_capacity(args.board_files.len());
    for path in &args.board_files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let board = board_from_text(&text)
            .with_context(|| format!("invalid board in {}", path.display()))?;
        frames.push((path, Frame::new(board, settings.capture_region.size())));
    }
    if let Some((_, first)) = frames.first() {
        settings.columns = first.board.width();
        settings.rows = first.board.height();
    }

    let mut session = Session::new(settings);
    let mut pointer = DryRunPointer { clicks: 0 };
    let start = Instant::now();
    for (i, (path, frame)) in frames.iter().enumerate() {
        let now = start + interval * i as u32;
        let report = session.process_frame(frame, now, &mut pointer);
        let hint_count = report.hints.as_ref().map_or(0, |h| h.len());
        println!(
            "Frame {} ({}): {:?}, {} hints, {}",
            i + 1,
            path.display(),
            report.validity,
            hint_count,
            describe(report.action)
        );
    }
    println!("\nTotal clicks: {}", pointer.clicks);
    Ok(())
}
