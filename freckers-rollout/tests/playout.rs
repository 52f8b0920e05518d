//! Playouts from positions one move away from the goal row

use freckers_core::{BoardState, Coord, JumpPolicy, MoveGenerator, Side, SquareSet};
use freckers_rollout::{playout, EpsilonGreedy, RolloutConfig, RolloutEvaluator, UniformPolicy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn set(coords: &[(i8, i8)]) -> SquareSet {
    coords.iter().map(|&(r, c)| Coord::new(r, c)).collect()
}

#[test]
fn test_one_step_from_goal_always_wins() {
    // Blue at (1,4) with a free tile at (0,4); Red is far from home
    let red = set(&[(2, 0), (3, 6)]);
    let blue = set(&[(1, 4), (5, 5)]);
    let board = BoardState::from_parts(red, blue, set(&[(0, 4), (3, 5), (4, 4)])).unwrap();

    for policy in [JumpPolicy::AllStops, JumpPolicy::MaximalOnly] {
        let movegen = MoveGenerator::new(policy);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let uniform =
                playout(&board, Side::Blue, Side::Red, 20, &movegen, &UniformPolicy, &mut rng);
            assert_eq!((uniform.winner, uniform.plies), (Side::Blue, 1));

            let greedy = playout(
                &board,
                Side::Blue,
                Side::Red,
                20,
                &movegen,
                &EpsilonGreedy::new(0.2),
                &mut rng,
            );
            assert_eq!((greedy.winner, greedy.plies), (Side::Blue, 1));
        }
    }
}

#[test]
fn test_one_jump_from_goal_always_wins() {
    // Red at (5,3) jumps over Blue at (6,3) onto the tile at (7,3)
    let board =
        BoardState::from_parts(set(&[(5, 3)]), set(&[(6, 3), (4, 0)]), set(&[(7, 3)])).unwrap();
    let movegen = MoveGenerator::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..20 {
        let result = playout(&board, Side::Red, Side::Blue, 20, &movegen, &UniformPolicy, &mut rng);
        assert_eq!((result.winner, result.plies, result.terminal), (Side::Red, 1, true));
    }
}

#[test]
fn test_opponent_win_rate_is_zero() {
    // whatever Red plays, Blue moves next and wins on the spot
    let board =
        BoardState::from_parts(set(&[(2, 2)]), set(&[(1, 6)]), set(&[(0, 6), (3, 2)])).unwrap();
    let movegen = MoveGenerator::default();
    let candidates = movegen.successors(&board, Side::Red);
    let evaluator = RolloutEvaluator::new(RolloutConfig::default(), movegen);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let selection = evaluator.select(candidates, Side::Red, &mut rng, || false);
    assert!(selection.estimates.iter().all(|e| e.wins == 0 && e.played == 20));
    assert_eq!(selection.best, Some(0));
}
