//! Playing against a remote opponent.
//!
//! The transport is abstracted behind [`RemotePeer`]: something that assigns
//! the local color, delivers the opponent's moves and accepts ours. Both
//! waits are polls with a short sleep; turns last seconds, so the latency
//! does not matter.

use std::{thread, time::Duration};

use amazons_engine::{Color, Game, InvalidMoveError, Move, Points, ProtocolViolationError};
use amazons_evaluator::turn_search::{SearchEngine, TurnOutcome};

/// Sleep between polls of a [`RemotePeer`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why a remote game was aborted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum RemoteGameError {
    /// The peer sent a move that failed validation.
    #[display("{_0}")]
    Protocol(ProtocolViolationError),
    /// The local engine produced a move that failed validation. Nothing was
    /// sent, so the peer still waits for a move on this turn.
    #[display("local engine produced {_0}")]
    LocalMoveRejected(InvalidMoveError),
}

/// Connection to the opponent.
pub trait RemotePeer {
    /// Color the local side plays, once the peer has assigned one.
    fn assigned_color(&mut self) -> Option<Color>;

    /// Next move received from the opponent, if any has arrived.
    fn poll_move(&mut self) -> Option<Move>;

    /// Sends a locally committed move.
    fn send_move(&mut self, mv: Move);
}

/// Plays `game` against `peer` until it is finished or neither side can
/// move, and returns the final points.
///
/// The local side is played by `engine`. An invalid move from either side
/// aborts the game. A rejected remote move leaves the board as it was before
/// that move.
pub fn play_remote_game<P>(
    game: &mut Game,
    engine: &mut SearchEngine<'_>,
    peer: &mut P,
    poll_interval: Duration,
) -> Result<Points, RemoteGameError>
where
    P: RemotePeer + ?Sized,
{
    let local = wait_for(poll_interval, || peer.assigned_color());

    let mut skips = 0;
    while !game.board().is_finished() && skips < 2 {
        if game.board().possible_moves().is_empty() {
            game.skip_turn();
            skips += 1;
            continue;
        }
        skips = 0;

        if game.board().turn() == local {
            forward_local_turn(engine.play_turn(game), peer)?;
        } else {
            let mv = wait_for(poll_interval, || peer.poll_move());
            game.apply_remote(mv)?;
        }
    }

    Ok(game.board().points())
}

/// Sends a committed local move to `peer`.
fn forward_local_turn<P>(outcome: TurnOutcome, peer: &mut P) -> Result<(), RemoteGameError>
where
    P: RemotePeer + ?Sized,
{
    match outcome {
        TurnOutcome::Played(choice) => peer.send_move(choice.mv),
        TurnOutcome::Rejected(e) => return Err(e.into()),
        TurnOutcome::NoMoves => {}
    }
    Ok(())
}

fn wait_for<T>(poll_interval: Duration, mut poll: impl FnMut() -> Option<T>) -> T {
    loop {
        if let Some(value) = poll() {
            return value;
        }
        thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use amazons_engine::{CellBoard, GameBoard, Position};
    use amazons_evaluator::{
        move_evaluator::{EvaluationRequest, MoveEvaluator},
        turn_search::SearchConfig,
    };

    use super::*;

    const POLL: Duration = Duration::from_millis(1);

    #[derive(Debug, Default)]
    struct MockPeer {
        color: Option<Color>,
        /// Color polls answered with `None` before the color is revealed.
        color_delay: usize,
        color_polls: usize,
        /// `None` entries are polls on which nothing has arrived yet. Polling
        /// past the end fails the test instead of waiting forever.
        incoming: VecDeque<Option<Move>>,
        sent: Vec<Move>,
    }

    impl RemotePeer for MockPeer {
        fn assigned_color(&mut self) -> Option<Color> {
            self.color_polls += 1;
            if self.color_polls > self.color_delay {
                self.color
            } else {
                None
            }
        }

        fn poll_move(&mut self) -> Option<Move> {
            self.incoming
                .pop_front()
                .expect("opponent move polled after the script ended")
        }

        fn send_move(&mut self, mv: Move) {
            self.sent.push(mv);
        }
    }

    /// Scores a move by black's exclusive territory once no chamber is
    /// contested, and zero before that.
    #[derive(Debug)]
    struct Decided;

    impl MoveEvaluator for Decided {
        #[expect(clippy::cast_precision_loss)]
        fn evaluate(&self, request: &EvaluationRequest) -> f32 {
            if !request.after.chambers.is_finished() {
                return 0.0;
            }
            let points = request.after.chambers.points();
            (points.black.exclusive as f32 - points.white.exclusive as f32) / 100.0
        }
    }

    fn engine(time_budget_ms: u64) -> SearchEngine<'static> {
        let config = SearchConfig {
            time_budget_ms,
            max_depth: Some(0),
            worker_count: Some(2),
            seed: Some(11),
            ..SearchConfig::default()
        };
        SearchEngine::new(Box::new(Decided), config)
    }

    fn sealing_cells() -> CellBoard {
        CellBoard::from_ascii(
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
        )
    }

    #[test]
    fn test_remote_move_finishes_game() {
        let mut game = Game::from_board(GameBoard::from_cells(sealing_cells(), Color::White));
        let mut peer = MockPeer {
            color: Some(Color::Black),
            color_delay: 2,
            incoming: VecDeque::from([None, None, Some(Move::from_tuple([1, 8, 2, 9, 7, 9]))]),
            ..MockPeer::default()
        };

        let points = play_remote_game(&mut game, &mut engine(10), &mut peer, POLL).unwrap();
        assert_eq!(peer.color_polls, 3);
        assert!(peer.incoming.is_empty());
        assert!(peer.sent.is_empty());
        assert!(game.board().is_finished());
        assert_eq!(points.black.exclusive, 68);
        assert_eq!(points.white.exclusive, 21);
    }

    #[test]
    fn test_invalid_remote_move_aborts() {
        let board = GameBoard::from_cells(sealing_cells(), Color::White);
        let mut game = Game::from_board(board.clone());
        let bad = Move::from_tuple([1, 8, 1, 5, 1, 8]);
        let mut peer = MockPeer {
            color: Some(Color::Black),
            incoming: VecDeque::from([Some(bad)]),
            ..MockPeer::default()
        };

        let result = play_remote_game(&mut game, &mut engine(10), &mut peer, POLL);
        assert_eq!(
            result,
            Err(RemoteGameError::Protocol(ProtocolViolationError { mv: bad }))
        );
        assert_eq!(game.board().cells(), board.cells());
        assert_eq!(game.board().turn(), Color::White);
    }

    #[test]
    fn test_local_move_is_sent() {
        let mut game = Game::from_board(GameBoard::from_cells(sealing_cells(), Color::Black));
        let mut peer = MockPeer {
            color: Some(Color::Black),
            ..MockPeer::default()
        };

        let points = play_remote_game(&mut game, &mut engine(1500), &mut peer, POLL).unwrap();
        assert_eq!(peer.sent.len(), 1);
        assert_eq!(peer.sent[0].arrow, Position::new(7, 9));
        assert!(game.board().is_finished());
        assert_eq!(points.black.exclusive, 68);
        assert_eq!(points.white.exclusive, 21);
    }

    #[test]
    fn test_rejected_local_move_aborts() {
        let mv = Move::from_tuple([1, 8, 1, 5, 1, 8]);
        let mut peer = MockPeer::default();

        let result = forward_local_turn(TurnOutcome::Rejected(InvalidMoveError { mv }), &mut peer);
        assert_eq!(
            result,
            Err(RemoteGameError::LocalMoveRejected(InvalidMoveError { mv }))
        );
        assert!(peer.sent.is_empty());

        assert_eq!(forward_local_turn(TurnOutcome::NoMoves, &mut peer), Ok(()));
        assert!(peer.sent.is_empty());
    }
}
