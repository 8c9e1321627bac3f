use anyhow::Context;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use tile_hinter::geometry::Size;
use tile_hinter::hinter::{HintConfig, HintEngine, HintKind};
use tile_hinter::utils::board_from_text;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Print the ranked hints for a board file", long_about = None)]
struct Args {
    /// Path to the board file (one row per line, `0-9a-z` tiles, `?` unknown)
    board_file: PathBuf,

    /// Width of the captured image the board came from
    #[clap(long, default_value_t = 240)]
    image_width: u32,

    /// Height of the captured image the board came from
    #[clap(long, default_value_t = 240)]
    image_height: u32,

    /// Only show the long matches when any exist
    #[clap(long)]
    highlight: bool,

    /// Seed for the exploration coin flip
    #[clap(short, long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.board_file)
        .with_context(|| format!("failed to read {}", args.board_file.display()))?;
    let board = board_from_text(&text)
        .with_context(|| format!("invalid board in {}", args.board_file.display()))?;
    println!(
        "Loaded {}x{} board from {}\n",
        board.width(),
        board.height(),
        args.board_file.display()
    );

    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let engine = HintEngine::new(HintConfig::default());
    let image = Size::new(args.image_width, args.image_height);
    let hints = engine.process(&board, image, args.highlight, &mut rng);

    // `*` marks where the best move starts.
    let best_from = hints.best().map(|hint| hint.from());
    println!("{}\n", board.to_string_with_highlight(best_from));
    println!(
        "Unknown cells: {} of {}\n",
        board.invalid_count(),
        board.total()
    );

    if hints.is_empty() {
        println!("No hints found.");
        return Ok(());
    }
    if hints.used_fallback() {
        println!("(exploring unknown cells)");
    }
    println!("Hints ({} of {}):", hints.displayed().len(), hints.len());
    for (i, hint) in hints.displayed().iter().enumerate() {
        let kind = match hint.kind {
            HintKind::Swap => "swap",
            HintKind::Explore => "explore",
        };
        println!(
            "  {:>3}. {:<7} ({}, {}) -> ({}, {})  count {:<3} pixels {} -> {}",
            i + 1,
            kind,
            hint.from_x,
            hint.from_y,
            hint.to_x,
            hint.to_y,
            hint.count,
            hint.point_from,
            hint.point_to
        );
    }
    Ok(())
}
