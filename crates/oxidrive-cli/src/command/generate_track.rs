use std::path::PathBuf;

use anyhow::Context;
use oxidrive_engine::OvalTrack;

use crate::track::{self, BorderColor};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateTrackArg {
    /// Output PNG path
    #[arg(long)]
    output: PathBuf,
    /// Pixel color of the border, as `r,g,b,a`
    #[arg(long, default_value_t = BorderColor::default())]
    border_color: BorderColor,
}

pub(crate) fn run(arg: &GenerateTrackArg) -> anyhow::Result<()> {
    let GenerateTrackArg {
        output,
        border_color,
    } = arg;

    let track = OvalTrack::default();
    let image = track::render_oval(&track, *border_color)?;
    image
        .save(output)
        .with_context(|| format!("Failed to save track image: {}", output.display()))?;

    eprintln!("Track saved successfully");
    eprintln!("  Path: {}", output.display());
    eprintln!("  Size: {}x{}", track.width, track.height);
    eprintln!("  Border color: {border_color}");

    Ok(())
}
