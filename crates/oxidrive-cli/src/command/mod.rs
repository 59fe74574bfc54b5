use clap::{Parser, Subcommand};

use self::{generate_track::GenerateTrackArg, run::RunArg, view::ViewArg};

mod generate_track;
mod run;
mod view;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run generations headlessly and report their fitness
    Run(#[clap(flatten)] RunArg),
    /// Watch generations drive around the track in the terminal
    View(#[clap(flatten)] ViewArg),
    /// Write the built-in oval track as a PNG image
    GenerateTrack(#[clap(flatten)] GenerateTrackArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Run(arg) => run::run(&arg)?,
        Mode::View(arg) => view::run(&arg)?,
        Mode::GenerateTrack(arg) => generate_track::run(&arg)?,
    }
    Ok(())
}
