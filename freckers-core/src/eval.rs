//! Position evaluation

use crate::game::{Action, BoardState, Side};

/// Sum of rows each piece of `side` has already covered toward its goal
pub fn progress(board: &BoardState, side: Side) -> i32 {
    board.pieces(side).iter().map(|c| side.progress(c.r)).sum()
}

/// Progress difference from `perspective`'s point of view (higher is better)
pub fn evaluate(board: &BoardState, perspective: Side) -> i32 {
    progress(board, perspective) - progress(board, perspective.opponent())
}

/// One-ply action score used by the heuristic strategy.
///
/// Steps score 1 plus forward rows gained, jumps 2 per hop plus forward rows
/// gained, and `Grow` scores 0.
pub fn action_score(side: Side, action: &Action) -> i32 {
    match action {
        Action::Grow => 0,
        Action::Step { origin, direction } => {
            let gained = side.progress(origin.r + direction.row_delta()) - side.progress(origin.r);
            1 + gained
        }
        Action::Jump { origin, hops } => {
            let landing_row = origin.r + 2 * hops.iter().map(|d| d.row_delta()).sum::<i8>();
            let gained = side.progress(landing_row) - side.progress(origin.r);
            2 * hops.len() as i32 + gained
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Coord, Direction, SquareSet};

    #[test]
    fn test_evaluate_symmetric_start() {
        let board = BoardState::new_game();
        assert_eq!(progress(&board, Side::Red), 0);
        assert_eq!(progress(&board, Side::Blue), 0);
        assert_eq!(evaluate(&board, Side::Red), 0);
    }

    #[test]
    fn test_evaluate_perspective() {
        let red: SquareSet = [Coord::new(3, 0)].into_iter().collect();
        let blue: SquareSet = [Coord::new(6, 4)].into_iter().collect();
        let board = BoardState::from_parts(red, blue, SquareSet::EMPTY).unwrap();
        assert_eq!(evaluate(&board, Side::Red), 3 - 1);
        assert_eq!(evaluate(&board, Side::Blue), -2);
    }

    #[test]
    fn test_action_score() {
        let forward = Action::Step { origin: Coord::new(6, 3), direction: Direction::Up };
        assert_eq!(action_score(Side::Blue, &forward), 2);

        let sideways = Action::Step { origin: Coord::new(6, 3), direction: Direction::Left };
        assert_eq!(action_score(Side::Blue, &sideways), 1);

        let double = Action::Jump {
            origin: Coord::new(0, 3),
            hops: vec![Direction::Down, Direction::DownRight],
        };
        assert_eq!(action_score(Side::Red, &double), 4 + 4);
        assert_eq!(action_score(Side::Red, &Action::Grow), 0);
    }
}
