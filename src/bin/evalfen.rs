use anyhow::Result;
use clap::Parser;
use piebridge::{BridgeConfig, Session};
use std::path::PathBuf;
use std::time::Instant;

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Parser, Debug)]
#[command(author, version, about = "Evaluate a FEN through the bridge session", long_about = None)]
struct Args {
    /// Position to evaluate
    #[arg(long, default_value = STARTPOS)]
    fen: String,

    /// Search depth in plies
    #[arg(long, default_value_t = 8)]
    depth: i32,

    /// Number of principal variations; 1 prints the single-line score
    #[arg(long, default_value_t = 1)]
    lines: i32,

    /// Main network file
    #[arg(long)]
    nnue_main: Option<PathBuf>,

    /// Small network file
    #[arg(long)]
    nnue_small: Option<PathBuf>,

    /// Transposition table size in MB (overrides PIEBRIDGE_CONFIG / env)
    #[arg(long)]
    hash: Option<usize>,

    /// Print depth, nodes and elapsed time
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = BridgeConfig::from_env();
    if let Some(mb) = args.hash { config.hash_mb = mb; }
    let mut session = Session::new(config);
    session.init(args.nnue_main.as_deref(), args.nnue_small.as_deref());
    if args.verbose {
        eprintln!("networks loaded: {}, threads: {}", session.networks().loaded(), session.threads());
    }

    let start = Instant::now();
    if args.lines > 1 {
        println!("{}", session.evaluate_multipv(&args.fen, args.depth, args.lines));
    } else {
        println!("{}", session.evaluate(&args.fen, args.depth));
    }
    if args.verbose {
        // Re-run through the structured API for stats; the table makes it cheap.
        if let Ok(a) = session.analyse(&args.fen, args.depth, args.lines.max(1)) {
            eprintln!("depth {} nodes {} elapsed {:.2}s", a.depth, a.nodes, start.elapsed().as_secs_f32());
        }
    }
    session.cleanup();
    Ok(())
}
