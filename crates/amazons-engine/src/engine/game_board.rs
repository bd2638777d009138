use std::{
    sync::OnceLock,
    time::{Duration, Instant},
};

use crate::{
    InvalidMoveError,
    core::{COLUMN_COUNT, Cell, CellBoard, ChamberMap, Color, Direction, Move, Points, ROW_COUNT},
};

/// Board state of a game in progress.
///
/// Chambers are computed on first use after each change and cached until the
/// next committed move. Cloning copies the cells and the side to move only:
/// the clone starts with an empty chamber cache and a fresh turn timer, so
/// search workers never share derived state.
#[derive(Debug)]
pub struct GameBoard {
    cells: CellBoard,
    turn: Color,
    turn_started: Instant,
    chambers: OnceLock<ChamberMap>,
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for GameBoard {
    fn clone(&self) -> Self {
        Self::from_cells(self.cells, self.turn)
    }
}

impl GameBoard {
    /// Initial position, white to move.
    #[must_use]
    pub fn new() -> Self {
        Self::from_cells(CellBoard::INITIAL, Color::White)
    }

    #[must_use]
    pub fn from_cells(cells: CellBoard, turn: Color) -> Self {
        Self {
            cells,
            turn,
            turn_started: Instant::now(),
            chambers: OnceLock::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns the cell at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is off the board.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells.get(crate::Position::new(row, col))
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        ROW_COUNT
    }

    #[must_use]
    pub const fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    #[must_use]
    pub fn cells(&self) -> &CellBoard {
        &self.cells
    }

    #[must_use]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[must_use]
    pub fn elapsed_turn(&self) -> Duration {
        self.turn_started.elapsed()
    }

    #[must_use]
    pub fn elapsed_turn_millis(&self) -> u64 {
        u64::try_from(self.elapsed_turn().as_millis()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn chambers(&self) -> &ChamberMap {
        self.chambers.get_or_init(|| ChamberMap::compute(&self.cells))
    }

    #[must_use]
    pub fn points(&self) -> Points {
        self.chambers().points()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.chambers().is_finished()
    }

    /// Every legal move of the side to move.
    ///
    /// Moves are ordered by queen (row-major), queen direction, queen
    /// distance, arrow direction and arrow distance. The order is part of the
    /// contract: a seeded search replays the same game only if it is stable.
    #[must_use]
    pub fn possible_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for from in self.cells.queens(self.turn) {
            for direction in Direction::ALL {
                for to in from.ray(direction) {
                    if !self.cells.get(to).is_empty() {
                        break;
                    }
                    for arrow_direction in Direction::ALL {
                        for arrow in to.ray(arrow_direction) {
                            if arrow != from && !self.cells.get(arrow).is_empty() {
                                break;
                            }
                            moves.push(Move::new(from, to, arrow));
                        }
                    }
                }
            }
        }
        moves
    }

    /// Checks `mv` against the current position without applying it.
    #[must_use]
    pub fn is_valid_move(&self, mv: Move) -> bool {
        let Move { from, to, arrow } = mv;
        if !(from.is_on_board() && to.is_on_board() && arrow.is_on_board()) {
            return false;
        }
        if self.cells.get(from) != self.turn.queen() || !self.cells.get(to).is_empty() {
            return false;
        }
        if !self.cells.is_path_clear(from, to, from) {
            return false;
        }
        if arrow != from && !self.cells.get(arrow).is_empty() {
            return false;
        }
        self.cells.is_path_clear(to, arrow, from)
    }

    /// Applies `mv` for the side to move and passes the turn.
    ///
    /// On error nothing is changed.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), InvalidMoveError> {
        if !self.is_valid_move(mv) {
            return Err(InvalidMoveError { mv });
        }
        self.cells.set(mv.from, Cell::Empty);
        self.cells.set(mv.to, self.turn.queen());
        self.cells.set(mv.arrow, self.turn.arrow());
        self.chambers = OnceLock::new();
        self.pass_turn();
        Ok(())
    }

    /// Hands the turn to the opponent without moving.
    pub fn pass_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.turn_started = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::Position;

    use super::*;

    const INITIAL_MOVE_COUNT: usize = 2176;

    fn small_board() -> GameBoard {
        let cells = CellBoard::from_ascii(
            r"
            B.b.......
            ..b..w....
            .wbb......
            ......W...
            ...b......
            ..........
            w...B.....
            ..........
            .......bb.
            W......bB.
            ",
        );
        GameBoard::from_cells(cells, Color::Black)
    }

    #[test]
    fn test_initial_moves() {
        let board = GameBoard::new();
        assert_eq!(board.turn(), Color::White);

        let moves = board.possible_moves();
        assert_eq!(moves.len(), INITIAL_MOVE_COUNT);
        assert_eq!(moves[0], Move::from_tuple([0, 3, 0, 2, 0, 1]));
        assert_eq!(moves[1], Move::from_tuple([0, 3, 0, 2, 0, 0]));
        // The vacated origin is a legal arrow target.
        assert_eq!(moves[2], Move::from_tuple([0, 3, 0, 2, 0, 3]));
        assert_eq!(
            moves.last(),
            Some(&Move::from_tuple([3, 9, 5, 9, 9, 5]))
        );
        assert_eq!(board.possible_moves(), moves);

        let black = GameBoard::from_cells(CellBoard::INITIAL, Color::Black);
        assert_eq!(black.possible_moves().len(), INITIAL_MOVE_COUNT);
    }

    #[test]
    fn test_possible_moves_match_validation() {
        for color in [Color::Black, Color::White] {
            let board = GameBoard::from_cells(*small_board().cells(), color);
            let moves = board.possible_moves();
            let generated = moves.iter().copied().collect::<HashSet<_>>();
            assert_eq!(generated.len(), moves.len());

            let mut accepted = 0;
            for from in Position::all() {
                for to in Position::all() {
                    for arrow in Position::all() {
                        let mv = Move::new(from, to, arrow);
                        let valid = board.is_valid_move(mv);
                        assert_eq!(valid, generated.contains(&mv), "{color}: {mv}");
                        accepted += usize::from(valid);
                    }
                }
            }
            assert_eq!(accepted, moves.len());
        }
    }

    #[test]
    fn test_invalid_moves_are_rejected() {
        let mut board = GameBoard::new();
        let before = *board.cells();
        let invalid = [
            // Not the mover's queen.
            Move::from_tuple([6, 0, 5, 0, 4, 0]),
            // Queen does not move.
            Move::from_tuple([0, 3, 0, 3, 1, 3]),
            // Not on a line.
            Move::from_tuple([0, 3, 2, 4, 3, 4]),
            // Destination occupied.
            Move::from_tuple([0, 3, 0, 6, 1, 6]),
            // Path blocked by the queen at (0, 6).
            Move::from_tuple([0, 3, 0, 7, 1, 7]),
            // Arrow on the queen itself.
            Move::from_tuple([0, 3, 1, 3, 1, 3]),
            // Off the board.
            Move::from_tuple([0, 3, 0, 2, 0, 10]),
        ];
        for mv in invalid {
            assert!(!board.is_valid_move(mv), "{mv}");
            assert_eq!(board.apply_move(mv), Err(InvalidMoveError { mv }));
            assert_eq!(board.cells(), &before);
            assert_eq!(board.turn(), Color::White);
        }
    }

    #[test]
    fn test_apply_move() {
        let mut board = GameBoard::new();
        let mv = Move::from_tuple([0, 3, 4, 3, 0, 3]);
        board.apply_move(mv).unwrap();

        assert_eq!(board.get(0, 3), Cell::WhiteArrow);
        assert_eq!(board.get(4, 3), Cell::WhiteQueen);
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.cells().queens(Color::White).len(), 4);
        assert!(!board.is_finished());
    }

    #[test]
    fn test_clone_is_independent() {
        let board = GameBoard::new();
        let _ = board.chambers();
        let mut clone = board.clone();
        let mv = clone.possible_moves()[0];
        clone.apply_move(mv).unwrap();

        assert_eq!(board.cells(), &CellBoard::INITIAL);
        assert_eq!(board.turn(), Color::White);
        assert_ne!(clone.cells(), board.cells());
        assert_eq!(clone.chambers().black_count(Position::new(5, 5)), 4);
    }

    #[test]
    fn test_chamber_cache_is_invalidated() {
        // White seals the top-right room with its arrow at (7, 9).
        let cells = CellBoard::from_ascii(
            r"
            ......b...
            ......b.W.
            ......b...
            ......b...
            ......b...
            ......b...
            ......b...
            ......bbb.
            B.........
            ..........
            ",
        );
        let mut board = GameBoard::from_cells(cells, Color::White);
        assert!(!board.is_finished());

        board
            .apply_move(Move::from_tuple([1, 8, 2, 9, 7, 9]))
            .unwrap();
        assert!(board.is_finished());

        let points = board.points();
        assert_eq!(points.white.exclusive, 21);
        assert_eq!(points.black.exclusive, 68);
    }

    #[test]
    fn test_partitioned_board_is_finished() {
        let cells = CellBoard::from_ascii(
            r"
            B...b.....
            ....b.....
            ....b..W..
            ....b.....
            bbbbb.....
            wwwwwwwwww
            ..........
            .B........
            .....bbbbb
            ..B..b...W
            ",
        );
        let board = GameBoard::from_cells(cells, Color::Black);
        assert!(board.is_finished());
        assert!(!board.possible_moves().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut board = small_board();
        board.reset();
        assert_eq!(board.cells(), &CellBoard::INITIAL);
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.row_count(), 10);
        assert_eq!(board.column_count(), 10);
    }
}
