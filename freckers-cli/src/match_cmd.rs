//! Match command - play engine-vs-engine games
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_base_config(), play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: config overrides and formatting

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use freckers_agent::{Engine, EngineConfig, StrategyKind};
use freckers_core::{Action, BoardState, Side};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Number of games to play
    #[arg(long, default_value = "2")]
    pub games: usize,

    /// Alpha-beta depth for both engines (overrides the config file)
    #[arg(long)]
    pub depth: Option<u32>,

    /// Red strategy: heuristic, search or rollout
    #[arg(long)]
    pub red: Option<StrategyKind>,

    /// Blue strategy: heuristic, search or rollout
    #[arg(long)]
    pub blue: Option<StrategyKind>,

    /// Plies after which a game is scored as a draw
    #[arg(long, default_value = "150")]
    pub max_turns: u32,

    /// Engine configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    /// None when the turn limit was reached
    winner: Option<Side>,
    turns: u32,
    red_strategy: StrategyKind,
    blue_strategy: StrategyKind,
    red_ms: u64,
    blue_ms: u64,
    /// Every action in play order, Red first
    moves: Vec<Action>,
}

/// Aggregated match results
#[derive(Clone, Debug, Serialize)]
struct MatchResults {
    total_games: usize,
    red_wins: usize,
    blue_wins: usize,
    draws: usize,
    avg_turns: f32,
    games: Vec<GameRecord>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Load the base engine configuration
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let base = load_base_config(&args)?;

    tracing::info!(
        "Starting match: {} vs {} ({} games, depth={})",
        args.red.unwrap_or(base.strategy),
        args.blue.unwrap_or(base.strategy),
        args.games,
        args.depth.unwrap_or(base.depth)
    );

    let results = play_match(&base, &args, seed)?;

    report_results(&results, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config file if given, reference defaults otherwise
fn load_base_config(args: &MatchArgs) -> Result<EngineConfig> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load engine config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(config)
}

/// Play all games in the match
fn play_match(base: &EngineConfig, args: &MatchArgs, seed: Option<u64>) -> Result<MatchResults> {
    let mut games = Vec::with_capacity(args.games);

    for game_index in 0..args.games {
        let red = side_config(base, args, Side::Red, seed, game_index);
        let blue = side_config(base, args, Side::Blue, seed, game_index);

        let record = play_single_game(red, blue, game_index + 1, args.max_turns)?;

        tracing::info!(
            "Game {}: {} ({} turns)",
            record.game_number,
            describe_winner(record.winner),
            record.turns
        );

        games.push(record);
    }

    Ok(compute_match_statistics(games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print_text_results(results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Host loop: the side to move decides, the host checks the action, both
/// engines are notified.
fn play_single_game(
    red: EngineConfig,
    blue: EngineConfig,
    game_number: usize,
    max_turns: u32,
) -> Result<GameRecord> {
    let red_strategy = red.strategy;
    let blue_strategy = blue.strategy;
    let mut red_engine = Engine::new(Side::Red, red);
    let mut blue_engine = Engine::new(Side::Blue, blue);

    let mut board = BoardState::new_game();
    let mut side = Side::Red;
    let mut moves = Vec::new();

    while board.winner().is_none() && (moves.len() as u32) < max_turns {
        let action = match side {
            Side::Red => red_engine.decide(),
            Side::Blue => blue_engine.decide(),
        };

        board = board.apply(side, &action).with_context(|| {
            format!("{} played an illegal action {} in game {}", side, action, game_number)
        })?;
        red_engine.notify(side, &action)?;
        blue_engine.notify(side, &action)?;

        tracing::debug!("{} {}", side, action);
        moves.push(action);
        side = side.opponent();
    }

    Ok(GameRecord {
        game_number,
        winner: board.winner(),
        turns: moves.len() as u32,
        red_strategy,
        blue_strategy,
        red_ms: red_engine.budget().consumed.as_millis() as u64,
        blue_ms: blue_engine.budget().consumed.as_millis() as u64,
        moves,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let red_wins = games.iter().filter(|g| g.winner == Some(Side::Red)).count();
    let blue_wins = games.iter().filter(|g| g.winner == Some(Side::Blue)).count();
    let draws = games.iter().filter(|g| g.winner.is_none()).count();

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    MatchResults {
        total_games: games.len(),
        red_wins,
        blue_wins,
        draws,
        avg_turns,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Engine config for one side of one game, with command-line overrides.
///
/// Each game gets its own seed so repeated games differ but stay reproducible.
fn side_config(
    base: &EngineConfig,
    args: &MatchArgs,
    side: Side,
    seed: Option<u64>,
    game_index: usize,
) -> EngineConfig {
    let mut config = base.clone();

    let strategy = match side {
        Side::Red => args.red,
        Side::Blue => args.blue,
    };
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    if let Some(depth) = args.depth {
        config.depth = depth;
    }

    let side_offset = match side {
        Side::Red => 0,
        Side::Blue => 1,
    };
    config.seed = seed
        .or(base.seed)
        .map(|s| s.wrapping_add(2 * game_index as u64 + side_offset));
    config
}

fn describe_winner(winner: Option<Side>) -> String {
    match winner {
        Some(side) => format!("{} wins", side),
        None => "draw".to_string(),
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.total_games;

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!("Red wins:    {} ({:.1}%)", results.red_wins, percent(results.red_wins, total));
    println!("Blue wins:   {} ({:.1}%)", results.blue_wins, percent(results.blue_wins, total));
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg turns:   {:.1}", results.avg_turns);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {} in {} turns ({} {}ms, {} {}ms)",
            game.game_number,
            describe_winner(game.winner),
            game.turns,
            game.red_strategy,
            game.red_ms,
            game.blue_strategy,
            game.blue_ms
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MatchArgs {
        MatchArgs {
            games: 1,
            depth: None,
            red: None,
            blue: None,
            max_turns: 150,
            config: None,
            json: false,
        }
    }

    fn record(game_number: usize, winner: Option<Side>, turns: u32) -> GameRecord {
        GameRecord {
            game_number,
            winner,
            turns,
            red_strategy: StrategyKind::Heuristic,
            blue_strategy: StrategyKind::Search,
            red_ms: 0,
            blue_ms: 0,
            moves: vec![],
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.total_games, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_turns, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(1, Some(Side::Red), 10),
            record(2, Some(Side::Blue), 20),
            record(3, None, 30),
        ];
        let results = compute_match_statistics(games);
        assert_eq!(results.red_wins, 1);
        assert_eq!(results.blue_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_turns, 20.0);
    }

    #[test]
    fn test_side_config_overrides() {
        let mut a = args();
        a.red = Some(StrategyKind::Heuristic);
        a.depth = Some(3);
        let base = EngineConfig::default();

        let red = side_config(&base, &a, Side::Red, Some(100), 2);
        let blue = side_config(&base, &a, Side::Blue, Some(100), 2);
        assert_eq!(red.strategy, StrategyKind::Heuristic);
        assert_eq!(blue.strategy, StrategyKind::SearchWithRollouts);
        assert_eq!(red.depth, 3);
        assert_eq!(red.seed, Some(104));
        assert_eq!(blue.seed, Some(105));
    }

    #[test]
    fn test_play_single_game_respects_turn_limit() {
        let record =
            play_single_game(EngineConfig::heuristic(), EngineConfig::heuristic(), 1, 6).unwrap();
        assert!(record.turns <= 6);
        assert_eq!(record.moves.len() as u32, record.turns);
        assert!(record.winner.is_some() || record.turns == 6);
    }

    #[test]
    fn test_json_output_shape() {
        let mut game = record(1, Some(Side::Red), 2);
        game.moves = vec![Action::Grow, Action::Grow];
        let results = compute_match_statistics(vec![game]);
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["red_wins"], 1);
        assert_eq!(json["games"][0]["winner"], "Red");
        assert_eq!(json["games"][0]["red_strategy"], "Heuristic");
        assert_eq!(json["games"][0]["moves"], serde_json::json!(["Grow", "Grow"]));
    }
}
