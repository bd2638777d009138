use clap::{Parser, Subcommand};

use self::{moves::MovesArg, self_play::SelfPlayArg, train::TrainArg};

mod moves;
mod self_play;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play games between the network and a random opponent
    SelfPlay(#[clap(flatten)] SelfPlayArg),
    /// Train the network by self-play
    Train(#[clap(flatten)] TrainArg),
    /// Count the legal moves of a position
    Moves(#[clap(flatten)] MovesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::SelfPlay(arg) => self_play::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Moves(arg) => moves::run(&arg)?,
    }
    Ok(())
}
