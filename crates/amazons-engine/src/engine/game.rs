use std::sync::mpsc::{self, Receiver, Sender};

use crate::{
    InvalidMoveError, ProtocolViolationError,
    core::{Color, Move, Points},
};

use super::GameBoard;

/// Change published by a [`Game`] after it has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    MoveCommitted { mv: Move, mover: Color },
    TurnSkipped { color: Color },
    GameReset,
    GameFinished { points: Points },
}

/// A [`GameBoard`] with subscribers.
///
/// Every mutation goes through this type so that views (renderers, loggers,
/// network clients) observe the game through [`GameEvent`]s instead of
/// polling the board.
#[derive(Debug, Default)]
pub struct Game {
    board: GameBoard,
    subscribers: Vec<Sender<GameEvent>>,
}

impl Game {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_board(board: GameBoard) -> Self {
        Self {
            board,
            subscribers: vec![],
        }
    }

    #[must_use]
    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    /// Registers a new subscriber. Events committed from now on are delivered
    /// to the returned receiver; dropping it unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Commits a move for the side to move.
    pub fn apply(&mut self, mv: Move) -> Result<(), InvalidMoveError> {
        let mover = self.board.turn();
        self.board.apply_move(mv)?;
        self.publish(&GameEvent::MoveCommitted { mv, mover });
        if self.board.is_finished() {
            let points = self.board.points();
            self.publish(&GameEvent::GameFinished { points });
        }
        Ok(())
    }

    /// Commits a move received from a remote peer.
    pub fn apply_remote(&mut self, mv: Move) -> Result<(), ProtocolViolationError> {
        self.apply(mv)
            .map_err(|InvalidMoveError { mv }| ProtocolViolationError { mv })
    }

    /// Passes the turn of a side that has no legal move.
    pub fn skip_turn(&mut self) {
        let color = self.board.turn();
        self.board.pass_turn();
        self.publish(&GameEvent::TurnSkipped { color });
    }

    pub fn reset(&mut self) {
        self.board.reset();
        self.publish(&GameEvent::GameReset);
    }

    fn publish(&mut self, event: &GameEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use crate::CellBoard;

    use super::*;

    #[test]
    fn test_events_follow_commits() {
        let mut game = Game::new();
        let events = game.subscribe();
        let mv = game.board().possible_moves()[0];

        game.apply(mv).unwrap();
        game.skip_turn();
        game.reset();

        assert_eq!(
            events.try_iter().collect::<Vec<_>>(),
            vec![
                GameEvent::MoveCommitted {
                    mv,
                    mover: Color::White
                },
                GameEvent::TurnSkipped {
                    color: Color::Black
                },
                GameEvent::GameReset,
            ]
        );
    }

    #[test]
    fn test_rejected_move_publishes_nothing() {
        let mut game = Game::new();
        let events = game.subscribe();
        let mv = Move::from_tuple([6, 0, 5, 0, 4, 0]);

        assert_eq!(game.apply(mv), Err(InvalidMoveError { mv }));
        assert_eq!(game.apply_remote(mv), Err(ProtocolViolationError { mv }));
        assert!(events.try_recv().is_err());
        assert_eq!(game.board().cells(), &CellBoard::INITIAL);
    }

    #[test]
    fn test_finishing_move_publishes_points() {
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
        let mut game = Game::from_board(GameBoard::from_cells(cells, Color::White));
        let events = game.subscribe();
        game.apply(Move::from_tuple([1, 8, 2, 9, 7, 9])).unwrap();

        let events = events.try_iter().collect::<Vec<_>>();
        assert_eq!(events.len(), 2);
        let GameEvent::GameFinished { points } = &events[1] else {
            panic!("expected GameFinished, got {:?}", events[1]);
        };
        assert_eq!(points.white.exclusive, 21);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut game = Game::new();
        drop(game.subscribe());
        let kept = game.subscribe();
        game.skip_turn();

        assert_eq!(game.subscribers.len(), 1);
        assert_eq!(
            kept.try_recv(),
            Ok(GameEvent::TurnSkipped {
                color: Color::White
            })
        );
    }
}
