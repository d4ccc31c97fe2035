use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use killer_qubo::{parse_cages, verify, Board, Compiler, EncoderConfig, Puzzle, Sampler, SatSampler};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const EASY_4: &str = include_str!("../../puzzles/easy_4.txt");
const EASY_9: &str = include_str!("../../puzzles/easy_9.txt");

#[derive(Parser, Debug)]
#[command(name = "killer")]
#[command(about = "Encode a Killer Sudoku as a quadratic model, solve it and check the result")]
struct Args {
    /// Puzzle file with one cage per line, or `4` / `9` for a bundled puzzle
    puzzle: String,

    /// Board side; inferred from the number of cells when omitted
    #[arg(long, short = 's')]
    size: Option<usize>,

    /// Skip malformed lines and cages that cannot be encoded instead of failing
    #[arg(long)]
    lenient: bool,

    /// Penalty strength of degree reduction products
    #[arg(long, allow_negative_numbers = true)]
    strength: Option<f64>,

    /// Reward on each variable of an assignment
    #[arg(long, allow_negative_numbers = true)]
    linear: Option<f64>,

    /// Coefficient of each complete assignment
    #[arg(long, allow_negative_numbers = true)]
    cage: Option<f64>,

    /// Coefficient of each pair of assignments of the same cage
    #[arg(long, allow_negative_numbers = true)]
    pair: Option<f64>,
}

impl Args {
    fn config(&self) -> EncoderConfig {
        let mut config = if self.lenient { EncoderConfig::lenient() } else { EncoderConfig::default() };
        if let Some(strength) = self.strength {
            config.reduction_strength = strength;
        }
        if let Some(linear) = self.linear {
            config.weights.linear = linear;
        }
        if let Some(cage) = self.cage {
            config.weights.cage = cage;
        }
        if let Some(pair) = self.pair {
            config.weights.pair = pair;
        }
        config
    }

    fn text(&self) -> anyhow::Result<String> {
        Ok(match self.puzzle.as_str() {
            "4" => EASY_4.to_string(),
            "9" => EASY_9.to_string(),
            path => fs::read_to_string(PathBuf::from(path)).with_context(|| format!("reading {path}"))?,
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.config();

    let parsed = parse_cages(&args.text()?);
    for err in &parsed.errors {
        warn!(%err, "skipping line");
    }
    if !parsed.errors.is_empty() && !args.lenient {
        bail!("{} malformed line(s)", parsed.errors.len());
    }

    let puzzle = match args.size {
        Some(size) => Puzzle::new(size, parsed.cages),
        None => Puzzle::infer(parsed.cages),
    }?;
    info!(size = puzzle.size(), cages = puzzle.cages().len(), "loaded puzzle");

    let compilation = Compiler::new(puzzle.size()).compile(&puzzle, &config)?;
    println!("cages:");
    for cage in &compilation.cages {
        let cells = cage.cells().iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
        println!("  {cells} = {} ({})", cage.target(), cage.layout());
    }
    for err in &compilation.rejected {
        println!("  skipped: {err}");
    }

    let model = compilation.encode(&config);
    println!(
        "polynomial: {} terms of degree up to {}",
        compilation.polynomial.len(),
        compilation.polynomial.degree()
    );
    println!(
        "model: {} variables ({} products), {} interactions, offset {}",
        model.bqm().num_variables(),
        model.products().len(),
        model.bqm().num_interactions(),
        model.bqm().offset()
    );

    let sample = SatSampler.sample(&model)?;
    let energy = model.bqm().energy(|label| sample.get(&label.to_string()) == Some(&1));
    let board = Board::from_sample(&sample, puzzle.size());
    let report = verify(&board, puzzle.cages());

    println!("energy: {energy}");
    println!("{board}");
    print!("{report}");

    if !report.is_solved() {
        bail!("sample breaks {} rule(s)", report.len());
    }

    Ok(())
}
