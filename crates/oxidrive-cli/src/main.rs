mod command;
mod simulation;
mod track;
mod tui;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
