use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use ipd_adaptive::csv_export::BufferedCsvExporter;
use ipd_adaptive::{
    play_series, AdaptiveAgent, Match, MatchConfig, MatchSummary, OpponentKind, Scoreboard,
    StrategyKind,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Opponent type (cooperative, aggressive, random, tit_for_tat, forgiving,
    /// strategic, unpredictable, exploitative, mirror)
    #[arg(short = 'p', long, default_value = "cooperative")]
    opponent: String,

    /// Rounds per match
    #[arg(short = 'r', long, default_value_t = 25)]
    rounds: u32,

    /// Random seed; match i of a series uses seed + i
    #[arg(short = 's', long, default_value_t = 0)]
    seed: u64,

    /// Number of matches per opponent
    #[arg(short = 'n', long, default_value_t = 1)]
    matches: usize,

    /// Play every opponent type in rotation order
    #[arg(long)]
    gauntlet: bool,

    /// Strategy the adaptive agent starts each match with
    #[arg(long, default_value = "minimax")]
    initial_strategy: String,

    /// Output CSV file path for per-round records
    #[arg(short = 'o', long)]
    output_csv: Option<PathBuf>,

    /// Print match summaries as JSON
    #[arg(long)]
    json: bool,

    /// Print every round of the first match
    #[arg(long)]
    print_rounds: bool,

    /// Number of threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()?;
    }

    let base = MatchConfig::new(OpponentKind::from_name(&args.opponent), args.rounds, args.seed)
        .with_initial_strategy(StrategyKind::from_name(&args.initial_strategy));
    let opponents: Vec<OpponentKind> = if args.gauntlet {
        OpponentKind::ALL.to_vec()
    } else {
        vec![base.opponent]
    };
    let matches = args.matches.max(1);

    info!("Adaptive IPD - {} vs {} opponent type(s)", AdaptiveAgent::NAME, opponents.len());
    info!(
        "Rounds: {} | Matches per opponent: {} | Seed: {} | Initial strategy: {}",
        base.max_rounds, matches, base.seed, base.initial_strategy
    );

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new((opponents.len() * matches) as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let mut csv_exporter = args
        .output_csv
        .as_deref()
        .map(|path| BufferedCsvExporter::new(path, 256));

    let start = Instant::now();
    let mut summaries: Vec<MatchSummary> = Vec::with_capacity(opponents.len() * matches);

    for opponent in opponents {
        let config = MatchConfig {
            opponent,
            ..base.clone()
        };
        progress.set_message(opponent.display_name());

        let games = play_series(&config, matches);
        for game in &games {
            if let Some(exporter) = csv_exporter.as_mut() {
                for outcome in game.rounds() {
                    exporter.add_round(game.config().seed, opponent, *outcome)?;
                }
            }
            if args.print_rounds && summaries.is_empty() {
                print_rounds(game);
            }
            summaries.push(game.summary());
        }

        let board: Scoreboard = summaries.iter().filter(|s| s.opponent == opponent).collect();
        info!(
            "{} | Adaptive wins: {} | Opponent wins: {} | Ties: {}",
            opponent.display_name(),
            board.adaptive_wins,
            board.opponent_wins,
            board.ties
        );
        progress.inc(games.len() as u64);
    }

    progress.finish_with_message("Simulation complete!");

    if let Some(exporter) = csv_exporter {
        exporter.finish()?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_summary(&summaries);
    }

    info!("Finished {} matches in {:.2}s", summaries.len(), start.elapsed().as_secs_f64());

    Ok(())
}

fn print_rounds(game: &Match) {
    println!("round,adaptive,opponent,adaptive_score,opponent_score,strategy,switch");
    for r in game.rounds() {
        println!(
            "{},{},{},{},{},{},{}",
            r.round,
            r.adaptive_move,
            r.opponent_move,
            r.cumulative_adaptive,
            r.cumulative_opponent,
            r.strategy,
            r.strategy_change
                .map(|c| format!("{}->{} ({})", c.from, c.to, c.to.description()))
                .unwrap_or_default()
        );
    }
}

fn print_summary(summaries: &[MatchSummary]) {
    println!("\n=== Match Summary ===");
    for opponent in OpponentKind::ALL {
        let games: Vec<&MatchSummary> = summaries.iter().filter(|s| s.opponent == opponent).collect();
        if games.is_empty() {
            continue;
        }
        let n = games.len() as f64;
        let board: Scoreboard = games.iter().copied().collect();
        let avg_adaptive = games.iter().map(|s| s.adaptive_score as f64).sum::<f64>() / n;
        let avg_opponent = games.iter().map(|s| s.opponent_score as f64).sum::<f64>() / n;
        let avg_differential = games.iter().map(|s| s.score_differential() as f64).sum::<f64>() / n;
        let avg_changes = games.iter().map(|s| s.strategy_changes as f64).sum::<f64>() / n;
        let behavior = games[games.len() - 1].opponent_behavior;

        println!(
            "{:<22} (strength {:>3.0}%) | Score {:>6.1} - {:<6.1} ({:+.1}) | W/L/T {}/{}/{} | Switches {:.1} | {}",
            opponent.display_name(),
            opponent.strength() * 100.0,
            avg_adaptive,
            avg_opponent,
            avg_differential,
            board.adaptive_wins,
            board.opponent_wins,
            board.ties,
            avg_changes,
            behavior
        );
    }

    let overall: Scoreboard = summaries.iter().collect();
    println!(
        "Overall: {} matches | Adaptive win rate: {:.1}%",
        overall.total(),
        overall.adaptive_win_rate() * 100.0
    );
}
