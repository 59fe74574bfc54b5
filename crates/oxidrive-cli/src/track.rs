//! Track images.
//!
//! A track is an RGBA image in which every pixel of the border color is impassable. The
//! built-in [`OvalTrack`] can be rendered into the same format, so a generated track can
//! be edited in an image editor and loaded back.

use std::{fmt, path::Path, str::FromStr};

use anyhow::Context;
use image::{Rgba, RgbaImage};
use oxidrive_engine::{Environment, OvalTrack};

const ASPHALT: Rgba<u8> = Rgba([48, 48, 48, 255]);

/// Pixel color marking impassable points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderColor(pub [u8; 4]);

impl Default for BorderColor {
    fn default() -> Self {
        Self([255, 255, 255, 255])
    }
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "{r},{g},{b},{a}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("expected four comma-separated channel values (0-255), got {input:?}")]
pub struct ParseBorderColorError {
    input: String,
}

impl FromStr for BorderColor {
    type Err = ParseBorderColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBorderColorError {
            input: s.to_owned(),
        };
        let mut channels = [0; 4];
        let mut parts = s.split(',');
        for channel in &mut channels {
            let part = parts.next().ok_or_else(err)?;
            *channel = part.trim().parse().map_err(|_| err())?;
        }
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self(channels))
    }
}

/// Where the environment of a run comes from.
#[derive(Debug, Clone)]
pub enum TrackSource<'a> {
    Image {
        path: &'a Path,
        border_color: BorderColor,
    },
    Oval(OvalTrack),
}

impl TrackSource<'_> {
    /// Name recorded in run reports.
    pub fn name(&self) -> String {
        match self {
            Self::Image { path, .. } => path.display().to_string(),
            Self::Oval(_) => "built-in oval".to_owned(),
        }
    }

    pub fn load(&self) -> anyhow::Result<Environment> {
        match self {
            Self::Image { path, border_color } => {
                let image = image::open(path)
                    .with_context(|| format!("Failed to open track image: {}", path.display()))?
                    .to_rgba8();
                environment_from_image(&image, *border_color)
                    .with_context(|| format!("Invalid track image: {}", path.display()))
            }
            Self::Oval(track) => track
                .to_environment()
                .context("Failed to build the built-in oval track"),
        }
    }
}

/// Classifies every pixel: exactly the border color is impassable.
#[expect(clippy::cast_possible_truncation)]
pub fn environment_from_image(
    image: &RgbaImage,
    border_color: BorderColor,
) -> anyhow::Result<Environment> {
    let (width, height) = image.dimensions();
    let environment = Environment::from_fn(width as usize, height as usize, |x, y| {
        image.get_pixel(x as u32, y as u32).0 == border_color.0
    })?;
    Ok(environment)
}

/// Renders an oval track: border pixels in `border_color`, the ring as dark asphalt.
pub fn render_oval(track: &OvalTrack, border_color: BorderColor) -> anyhow::Result<RgbaImage> {
    let width = u32::try_from(track.width).context("Track is too wide")?;
    let height = u32::try_from(track.height).context("Track is too tall")?;
    let border = Rgba(border_color.0);
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        if track.is_border(x as usize, y as usize) {
            border
        } else {
            ASPHALT
        }
    }))
}
