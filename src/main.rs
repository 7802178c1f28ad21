use std::time::Duration;

use clap::Parser;
use stock_cutter::render;
use stock_cutter::solver::{Solver, SolverConfig};
use stock_cutter::types::PieceDemand;

#[derive(Parser)]
#[command(name = "stock_cutter", about = "1D cutting stock optimizer")]
struct Cli {
    /// Stock bar length in mm
    #[arg(long)]
    stock: u32,

    /// Required pieces as LENGTH:QTY (e.g. 722:4 210:4 140:4)
    #[arg(long = "pieces", num_args = 1..)]
    pieces: Vec<String>,

    /// Cap on the number of enumerated cutting patterns
    #[arg(long)]
    max_patterns: Option<usize>,

    /// Time limit for pattern enumeration, in seconds
    #[arg(long)]
    time_limit_secs: Option<u64>,
}

fn parse_piece(s: &str) -> Result<PieceDemand, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("invalid piece '{}', expected LENGTH:QTY", s));
    }
    let length = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let qty = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if length == 0 {
        return Err(format!("length must be non-zero in '{}'", s));
    }
    Ok(PieceDemand { length, qty })
}

fn main() {
    let cli = Cli::parse();

    let demands: Vec<PieceDemand> = cli
        .pieces
        .iter()
        .map(|p| parse_piece(p))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let config = SolverConfig {
        max_patterns: cli.max_patterns,
        time_limit: cli.time_limit_secs.map(Duration::from_secs),
        ..SolverConfig::default()
    };

    let solver = Solver::from_demands(cli.stock, &demands, config);
    let plan = solver.solve().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    print!("{}", render::render_plan(&plan));
    println!("{}", render::render_summary(&plan));
}
