use std::path::PathBuf;

use amazons_engine::{CellBoard, Color, GameBoard};

use crate::util;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Turn {
    #[default]
    White,
    Black,
}

impl From<Turn> for Color {
    fn from(turn: Turn) -> Self {
        match turn {
            Turn::White => Color::White,
            Turn::Black => Color::Black,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct MovesArg {
    /// Board file in text form; the initial position when omitted
    #[arg(long)]
    board: Option<PathBuf>,
    /// Side to move
    #[arg(long, default_value = "white")]
    turn: Turn,
    /// Print every legal move, not just the count
    #[arg(long)]
    list: bool,
}

pub(crate) fn run(arg: &MovesArg) -> anyhow::Result<()> {
    let MovesArg { board, turn, list } = arg;

    let cells = match board {
        Some(path) => util::read_board_file(path)?,
        None => CellBoard::INITIAL,
    };
    let board = GameBoard::from_cells(cells, (*turn).into());
    let moves = board.possible_moves();

    eprint!("{}", board.cells());
    eprintln!();
    let points = board.points();
    for (color, territory) in [("Black", points.black), ("White", points.white)] {
        eprintln!(
            "  {color}: {} reachable, {} exclusive",
            territory.total, territory.exclusive
        );
    }
    eprintln!("  Finished: {}", board.is_finished());
    eprintln!("  Legal moves for {}:", board.turn());

    if *list {
        for mv in &moves {
            println!("{mv}");
        }
    }
    println!("{}", moves.len());

    Ok(())
}
